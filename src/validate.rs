use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Recipe;

/// Structural quality flag. Never removes a record from the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "concern", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Concern {
    EmptyName,
    EmptyIngredients,
    EmptyInstructions,
    /// Index into `Recipe::ingredients`.
    NegativeOrMissingAmount { ingredient: usize },
    MissingSource,
}

impl Concern {
    pub fn tag(&self) -> &'static str {
        match self {
            Concern::EmptyName => "EMPTY_NAME",
            Concern::EmptyIngredients => "EMPTY_INGREDIENTS",
            Concern::EmptyInstructions => "EMPTY_INSTRUCTIONS",
            Concern::NegativeOrMissingAmount { .. } => "NEGATIVE_OR_MISSING_AMOUNT",
            Concern::MissingSource => "MISSING_SOURCE",
        }
    }
}

/// Inspect a recipe without touching it.
pub fn validate(recipe: &Recipe) -> Vec<Concern> {
    let mut concerns = Vec::new();
    if recipe.name.trim().is_empty() {
        concerns.push(Concern::EmptyName);
    }
    if recipe.ingredients.is_empty() {
        concerns.push(Concern::EmptyIngredients);
    }
    if recipe.instructions.is_empty() {
        concerns.push(Concern::EmptyInstructions);
    }
    for (idx, ing) in recipe.ingredients.iter().enumerate() {
        let valid = ing.amount.is_some_and(|a| a >= 0.0);
        if !valid {
            concerns.push(Concern::NegativeOrMissingAmount { ingredient: idx });
        }
    }
    if recipe.source.trim().is_empty() {
        concerns.push(Concern::MissingSource);
    }
    concerns
}

/// A recipe paired with the concerns found on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecipe {
    pub recipe: Recipe,
    pub concerns: Vec<Concern>,
}

impl ValidatedRecipe {
    pub fn new(recipe: Recipe) -> Self {
        let concerns = validate(&recipe);
        Self { recipe, concerns }
    }

    pub fn has(&self, tag: &str) -> bool {
        self.concerns.iter().any(|c| c.tag() == tag)
    }

    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = self.concerns.iter().map(Concern::tag).collect();
        tags.dedup();
        tags
    }
}

/// Concern counts for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub batch: String,
    pub records: usize,
    pub records_with_concerns: usize,
    pub concerns: BTreeMap<String, usize>,
}

impl QualityReport {
    pub fn new(batch: impl Into<String>) -> Self {
        Self {
            batch: batch.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, concerns: &[Concern]) {
        self.records += 1;
        if !concerns.is_empty() {
            self.records_with_concerns += 1;
        }
        for c in concerns {
            *self.concerns.entry(c.tag().to_string()).or_default() += 1;
        }
    }

    pub fn from_records(batch: impl Into<String>, records: &[ValidatedRecipe]) -> Self {
        let mut report = Self::new(batch);
        for r in records {
            report.add(&r.concerns);
        }
        report
    }

    /// `EMPTY_NAME=2, MISSING_SOURCE=1` style summary for log lines.
    pub fn summary(&self) -> String {
        if self.concerns.is_empty() {
            return "none".to_string();
        }
        self.concerns
            .iter()
            .map(|(tag, n)| format!("{}={}", tag, n))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ingredient;

    fn complete() -> Recipe {
        Recipe {
            name: "کشک بادمجان".into(),
            province: "زنجان".into(),
            ingredients: vec![Ingredient::new("بادمجان", Some(3.0), "عدد")],
            instructions: vec!["بادمجان را سرخ کنید.".into()],
            source: "https://example.org/k".into(),
            ..Default::default()
        }
    }

    #[test]
    fn complete_recipe_has_no_concerns() {
        assert!(validate(&complete()).is_empty());
    }

    #[test]
    fn empty_recipe_flags_structure() {
        let concerns = validate(&Recipe::default());
        assert_eq!(
            concerns,
            vec![
                Concern::EmptyName,
                Concern::EmptyIngredients,
                Concern::EmptyInstructions,
                Concern::MissingSource,
            ]
        );
    }

    #[test]
    fn amounts_are_flagged_per_ingredient() {
        let mut r = complete();
        r.ingredients.push(Ingredient::new("نمک", None, ""));
        r.ingredients.push(Ingredient::new("آب", Some(-1.0), "لیتر"));
        let concerns = validate(&r);
        assert_eq!(
            concerns,
            vec![
                Concern::NegativeOrMissingAmount { ingredient: 1 },
                Concern::NegativeOrMissingAmount { ingredient: 2 },
            ]
        );
    }

    #[test]
    fn validation_does_not_mutate() {
        let r = Recipe::default();
        let v = ValidatedRecipe::new(r.clone());
        assert_eq!(v.recipe, r);
        assert!(v.has("EMPTY_NAME"));
    }

    #[test]
    fn tags_are_deduplicated() {
        let mut r = complete();
        r.ingredients = vec![Ingredient::new("a", None, ""), Ingredient::new("b", None, "")];
        assert_eq!(ValidatedRecipe::new(r).tags(), vec!["NEGATIVE_OR_MISSING_AMOUNT"]);
    }

    #[test]
    fn concern_json_shape() {
        let json = serde_json::to_value(Concern::NegativeOrMissingAmount { ingredient: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "concern": "NEGATIVE_OR_MISSING_AMOUNT", "ingredient": 3 }));
        let json = serde_json::to_value(Concern::EmptyName).unwrap();
        assert_eq!(json, serde_json::json!({ "concern": "EMPTY_NAME" }));
    }

    #[test]
    fn quality_report_counts_by_tag() {
        let records = vec![
            ValidatedRecipe::new(complete()),
            ValidatedRecipe::new(Recipe::default()),
            ValidatedRecipe::new(Recipe { name: "x".into(), ..Default::default() }),
        ];
        let q = QualityReport::from_records("gilan", &records);
        assert_eq!(q.records, 3);
        assert_eq!(q.records_with_concerns, 2);
        assert_eq!(q.concerns["EMPTY_NAME"], 1);
        assert_eq!(q.concerns["EMPTY_INGREDIENTS"], 2);
        assert_eq!(q.concerns["MISSING_SOURCE"], 2);
        assert!(q.summary().starts_with("EMPTY_INGREDIENTS=2"));
    }
}
