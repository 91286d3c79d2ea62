use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{element_text, first_text, many_text, selector, text_lines};
use crate::raw::{FieldKey, RawBlock};

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("h1, h2"));
static CONTENT: LazyLock<Selector> = LazyLock::new(|| selector("div.mw-parser-output"));
static SECTION_HEADER: LazyLock<Selector> = LazyLock::new(|| selector("h2, h3, h4, p"));
static COLLAPSIBLE_STEPS: LazyLock<Selector> =
    LazyLock::new(|| selector("section#content-collapsible-block-1"));
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| selector("li"));

const INGREDIENTS_HEADING: &str = "مواد لازم";
const INSTRUCTIONS_HEADING: &str = "طرز تهیه";

/// A cookbook page is one recipe; provenance is the page itself.
pub fn extract(html: &str, page_url: &str) -> Vec<RawBlock> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();
    let content = doc.select(&CONTENT).next().unwrap_or(root);

    let mut raw = RawBlock::new().with_text(FieldKey::Source, page_url);
    if let Some(title) = first_text(root, &TITLE) {
        raw.set_text(FieldKey::Name, title);
    }

    let ingredients = find_heading(content, INGREDIENTS_HEADING)
        .and_then(next_element)
        .map(list_items)
        .unwrap_or_default();
    let ingredients = drop_headings(ingredients);
    if !ingredients.is_empty() {
        raw.set_list(FieldKey::Ingredients, ingredients);
    }

    let instructions = drop_headings(instruction_items(&doc, content));
    if !instructions.is_empty() {
        raw.set_list(FieldKey::Instructions, instructions);
    }

    vec![raw]
}

/// Mobile pages wrap the method in a collapsible section; desktop pages
/// follow the heading with paragraphs and lists up to the next heading.
fn instruction_items(doc: &Html, content: ElementRef) -> Vec<String> {
    if let Some(section) = doc.select(&COLLAPSIBLE_STEPS).next() {
        return many_text(section, &PARAGRAPH);
    }

    let mut items = Vec::new();
    let Some(heading) = find_heading(content, INSTRUCTIONS_HEADING) else {
        return items;
    };
    for sib in heading.next_siblings().filter_map(ElementRef::wrap) {
        let name = sib.value().name();
        if is_heading(name) {
            break;
        }
        if matches!(name, "ul" | "ol" | "p") {
            items.extend(list_items(sib));
        }
    }
    items
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn find_heading<'a>(content: ElementRef<'a>, label: &str) -> Option<ElementRef<'a>> {
    content
        .select(&SECTION_HEADER)
        .find(|el| element_text(*el).contains(label))
}

fn next_element(el: ElementRef) -> Option<ElementRef> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Items of the first direct `ul`/`ol` child that has any, otherwise the
/// element's text lines.
fn list_items(el: ElementRef) -> Vec<String> {
    for list in el
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "ul" | "ol"))
    {
        let items = many_text(list, &LIST_ITEM);
        if !items.is_empty() {
            return items;
        }
    }
    text_lines(el)
}

/// Section labels sometimes leak into the collected lines.
fn drop_headings(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .filter(|item| {
            let item = item.trim_start();
            !item.starts_with(INGREDIENTS_HEADING) && !item.starts_with(INSTRUCTIONS_HEADING)
        })
        .collect()
}
