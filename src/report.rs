use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::model::{format_amount, Recipe};
use crate::validate::QualityReport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldStats {
    pub samples: usize,
    pub chars: usize,
    pub words: usize,
}

impl FieldStats {
    fn add(&mut self, value: &str) -> usize {
        let words = count_words(value);
        self.samples += 1;
        self.chars += value.chars().count();
        self.words += words;
        words
    }

    pub fn avg_chars(&self) -> f64 {
        average(self.chars, self.samples)
    }

    pub fn avg_words(&self) -> f64 {
        average(self.words, self.samples)
    }
}

fn average(total: usize, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        total as f64 / n as f64
    }
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Descriptive statistics over a recipe corpus.
#[derive(Debug, Clone, Default)]
pub struct CorpusStats {
    pub records: usize,
    pub total_words: usize,
    pub fields: BTreeMap<&'static str, FieldStats>,
    pub quality: QualityReport,
}

impl CorpusStats {
    pub fn collect(recipes: &[Recipe]) -> Self {
        let mut stats = CorpusStats {
            quality: QualityReport::new("corpus"),
            ..Default::default()
        };
        for r in recipes {
            stats.add_recipe(r);
        }
        stats
    }

    fn sample(&mut self, field: &'static str, value: &str) {
        self.total_words += self.fields.entry(field).or_default().add(value);
    }

    fn add_recipe(&mut self, r: &Recipe) {
        self.records += 1;
        self.sample("name", &r.name);
        self.sample("city", &r.city);
        self.sample("province", &r.province);
        self.sample("group", &r.group);
        for ing in &r.ingredients {
            self.sample("ingredients.name", &ing.name);
            self.sample("ingredients.unit", &ing.unit);
            self.sample("ingredients.amount", &format_amount(ing.amount));
        }
        for step in &r.instructions {
            self.sample("instructions", step);
        }
        self.sample("notes", &r.notes);
        self.sample("description", &r.description);
        self.quality.add(&crate::validate::validate(r));
    }

    pub fn render(&self, generated_at: DateTime<Local>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out, "Total number of records: {}", self.records);
        let _ = writeln!(out, "Total word count (including numbers): {}", self.total_words);
        let _ = writeln!(out);
        let _ = writeln!(out, "Average lengths per field:");
        for (field, s) in &self.fields {
            let _ = writeln!(out, "- {}:", field);
            let _ = writeln!(out, "    • Average characters: {:.2}", s.avg_chars());
            let _ = writeln!(out, "    • Average words:      {:.2}", s.avg_words());
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Records with concerns: {} of {}",
            self.quality.records_with_concerns, self.quality.records
        );
        for (tag, n) in &self.quality.concerns {
            let _ = writeln!(out, "- {}: {}", tag, n);
        }
        out
    }
}
