use crate::model::{Ingredient, Recipe};
use crate::normalize::{
    normalize_list, normalize_scalar, normalize_text, parse_ingredient_line, segment_sentences,
};
use crate::raw::{BuildContext, FieldKey, RawBlock, RawValue};

/// Ingredient lines inside one text block: newlines first, then Persian
/// semicolon and comma for sources that run them together.
pub const INGREDIENT_SEPARATORS: &[&str] = &["\n", "\u{061B}", "\u{060C}"];

/// Assemble a schema-complete `Recipe`. Missing fields take their defaults;
/// nothing here fails.
pub fn build_recipe(raw: &RawBlock, ctx: &BuildContext) -> Recipe {
    let province = or_default(
        normalize_scalar(raw.get(FieldKey::Province)),
        &ctx.default_province,
    );
    let source = or_default(normalize_scalar(raw.get(FieldKey::Source)), &ctx.source_url);

    Recipe {
        name: normalize_scalar(raw.get(FieldKey::Name)),
        city: normalize_scalar(raw.get(FieldKey::City)),
        province,
        group: normalize_scalar(raw.get(FieldKey::Group)),
        ingredients: build_ingredients(raw.get(FieldKey::Ingredients)),
        instructions: build_instructions(raw.get(FieldKey::Instructions)),
        notes: normalize_scalar(raw.get(FieldKey::Notes)),
        description: normalize_scalar(raw.get(FieldKey::Description)),
        source,
    }
}

fn or_default(value: String, fallback: &str) -> String {
    if value.is_empty() {
        normalize_text(fallback)
    } else {
        value
    }
}

/// Every ingredient line is parsed; lines without a name are dropped.
pub fn build_ingredients(raw: Option<&RawValue>) -> Vec<Ingredient> {
    normalize_list(raw, INGREDIENT_SEPARATORS)
        .iter()
        .map(|line| parse_ingredient_line(line))
        .filter(|ing| !ing.name.is_empty())
        .collect()
}

/// A paragraph is segmented into sentences; a list is taken step for step.
pub fn build_instructions(raw: Option<&RawValue>) -> Vec<String> {
    match raw {
        None => Vec::new(),
        Some(RawValue::Text(text)) => segment_sentences(text),
        Some(list @ RawValue::List(_)) => normalize_list(Some(list), &[]),
    }
}
