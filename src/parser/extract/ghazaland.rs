use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{first_text, many_text, resolve_url, selector};
use crate::raw::{FieldKey, RawBlock};

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("h1.article-title"));
static CITY: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"div.entry a[href*="/recipe-cuisine/"]"#));
static GROUP: LazyLock<Selector> = LazyLock::new(|| {
    selector(
        r#".single-category a[href*="/category/lunch/"], .single-category a[href*="/category/dinner/"]"#,
    )
});
static INGREDIENTS: LazyLock<Selector> = LazyLock::new(|| selector(".ingredients-box li"));
static STEPS: LazyLock<Selector> = LazyLock::new(|| selector(".cooking-steps-box li"));
static NOTES: LazyLock<Selector> = LazyLock::new(|| selector(".recipe-notes, .notes-box"));
static LEAD_PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector(".p-first-letter > p"));
static ENTRY_PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector(".entry-content > p"));
static CANONICAL: LazyLock<Selector> = LazyLock::new(|| selector(r#"link[rel="canonical"]"#));
static LISTING_CARD: LazyLock<Selector> =
    LazyLock::new(|| selector("ul.grid_list.js-masonry li.post div.grid-content"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// A recipe page holds exactly one recipe.
pub fn extract(html: &str) -> Vec<RawBlock> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();
    let mut raw = RawBlock::new();

    if let Some(name) = first_text(root, &TITLE) {
        raw.set_text(FieldKey::Name, name);
    }
    if let Some(city) = first_text(root, &CITY) {
        raw.set_text(FieldKey::City, city);
    }
    if let Some(group) = first_text(root, &GROUP) {
        raw.set_text(FieldKey::Group, group);
    }

    let ingredients = many_text(root, &INGREDIENTS);
    if !ingredients.is_empty() {
        raw.set_list(FieldKey::Ingredients, ingredients);
    }

    // Most pages put the whole method in a single <li>; that one is segmented
    // by sentence, real step lists are kept as they are.
    let mut steps = many_text(root, &STEPS);
    match steps.len() {
        0 => {}
        1 => raw.set_text(FieldKey::Instructions, steps.remove(0)),
        _ => raw.set_list(FieldKey::Instructions, steps),
    }

    if let Some(notes) = first_text(root, &NOTES) {
        raw.set_text(FieldKey::Notes, notes);
    }
    if let Some(desc) = first_text(root, &LEAD_PARAGRAPH).or_else(|| first_text(root, &ENTRY_PARAGRAPH)) {
        raw.set_text(FieldKey::Description, desc);
    }
    if let Some(href) = doc
        .select(&CANONICAL)
        .next()
        .and_then(|el| el.value().attr("href"))
    {
        raw.set_text(FieldKey::Source, href);
    }

    vec![raw]
}

/// Recipe URLs on a cuisine listing page: the second link of each card.
pub fn listing_links(html: &str, page_url: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    doc.select(&LISTING_CARD)
        .filter_map(|card| card.select(&ANCHOR).nth(1))
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_url(page_url, href))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_recipe;
    use crate::model::Ingredient;
    use crate::raw::{BuildContext, RawValue};

    fn page() -> String {
        std::fs::read_to_string("tests/fixtures/ghazaland_recipe.html").unwrap()
    }

    fn listing() -> String {
        std::fs::read_to_string("tests/fixtures/ghazaland_listing.html").unwrap()
    }

    #[test]
    fn recipe_fields() {
        let blocks = extract(&page());
        assert_eq!(blocks.len(), 1);
        let raw = &blocks[0];
        assert_eq!(raw.get(FieldKey::Name), Some(&RawValue::Text("کوکو سبزی گیلانی".into())));
        assert_eq!(raw.get(FieldKey::City), Some(&RawValue::Text("گیلان".into())));
        assert_eq!(raw.get(FieldKey::Group), Some(&RawValue::Text("شام".into())));
        assert!(matches!(raw.get(FieldKey::Ingredients), Some(RawValue::List(l)) if l.len() == 5));
        assert!(matches!(raw.get(FieldKey::Instructions), Some(RawValue::Text(_))));
        assert_eq!(
            raw.get(FieldKey::Source),
            Some(&RawValue::Text("https://ghazaland.com/recipe/kookoo-sabzi-gilani/".into()))
        );
    }

    #[test]
    fn single_step_item_is_segmented() {
        let ctx = BuildContext::new("گیلان", "https://ghazaland.com/recipe-cuisine/gilan/");
        let recipe = build_recipe(&extract(&page())[0], &ctx);
        assert_eq!(recipe.instructions.len(), 3);
        assert_eq!(recipe.ingredients[0], Ingredient::new("سبزی کوکو", Some(500.0), "گرم"));
        assert_eq!(recipe.ingredients[4], Ingredient::new("نمک و فلفل", None, "به میزان لازم"));
        assert_eq!(recipe.description, "کوکو سبزی گیلانی با سیر تازه و گردو پخته می‌شود.");
        assert_eq!(recipe.notes, "");
    }

    #[test]
    fn missing_selectors_leave_fields_absent() {
        let blocks = extract("<html><body><p>خالی</p></body></html>");
        assert!(blocks[0].is_empty());
    }

    #[test]
    fn step_lists_are_kept() {
        let html = r#"<div class="cooking-steps-box"><ol><li>یک. دو.</li><li>سه</li></ol></div>"#;
        let raw = &extract(html)[0];
        assert!(matches!(raw.get(FieldKey::Instructions), Some(RawValue::List(l)) if l.len() == 2));
    }

    #[test]
    fn listing_second_links() {
        let links = listing_links(&listing(), "https://ghazaland.com/recipe-cuisine/gilan/");
        assert_eq!(
            links,
            vec![
                "https://ghazaland.com/recipe/kookoo-sabzi-gilani/",
                "https://ghazaland.com/recipe/mirza-ghasemi/",
            ]
        );
    }
}
