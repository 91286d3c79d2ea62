use serde::{Deserialize, Serialize, Serializer};

/// Canonical recipe record. Field order is the JSON key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipe {
    pub name: String,
    pub city: String,
    pub province: String,
    pub group: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub notes: String,
    pub description: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingredient {
    pub name: String,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: Option<f64>,
    pub unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: Option<f64>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }
}

/// A record as it appears in an aggregated corpus file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberedRecipe {
    pub id: usize,
    #[serde(flatten)]
    pub recipe: Recipe,
}

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

fn as_exact_int(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INT {
        Some(value as i64)
    } else {
        None
    }
}

/// Integral amounts are written as JSON integers (`500`, not `500.0`).
fn serialize_amount<S: Serializer>(amount: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match amount {
        None => s.serialize_none(),
        Some(v) => match as_exact_int(*v) {
            Some(i) => s.serialize_i64(i),
            None => s.serialize_f64(*v),
        },
    }
}

/// Textual form of an amount: `500`, `1.5`, or empty when absent.
pub fn format_amount(amount: Option<f64>) -> String {
    match amount {
        None => String::new(),
        Some(v) => match as_exact_int(v) {
            Some(i) => i.to_string(),
            None => v.to_string(),
        },
    }
}
