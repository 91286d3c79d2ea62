use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::model::{NumberedRecipe, Recipe};
use crate::validate::{QualityReport, ValidatedRecipe};

const RECIPES_SUFFIX: &str = "_recipes.json";
const QUALITY_SUFFIX: &str = "_quality.json";

/// What a batch write produced.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub path: PathBuf,
    pub records: usize,
    pub quality: QualityReport,
}

/// Writes one JSON artifact per batch into a directory.
#[derive(Debug, Clone)]
pub struct CorpusWriter {
    dir: PathBuf,
}

impl CorpusWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn batch_path(&self, batch: &str) -> PathBuf {
        self.dir.join(format!("{}{}", file_stem(batch), RECIPES_SUFFIX))
    }

    fn quality_path(&self, batch: &str) -> PathBuf {
        self.dir.join(format!("{}{}", file_stem(batch), QUALITY_SUFFIX))
    }

    /// Write records in the order given, plus a `_quality.json` sidecar with
    /// concern counts.
    pub fn write_batch(&self, batch: &str, records: &[ValidatedRecipe]) -> Result<BatchSummary> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating output dir {}", self.dir.display()))?;

        for r in records.iter().filter(|r| !r.concerns.is_empty()) {
            debug!(batch, name = %r.recipe.name, concerns = ?r.tags(), "record has concerns");
        }

        let recipes: Vec<&Recipe> = records.iter().map(|r| &r.recipe).collect();
        let path = self.batch_path(batch);
        write_json(&path, &recipes)?;

        let quality = QualityReport::from_records(batch, records);
        write_json(&self.quality_path(batch), &quality)?;

        info!(
            batch,
            records = records.len(),
            concerns = %quality.summary(),
            "wrote batch"
        );

        Ok(BatchSummary {
            path,
            records: records.len(),
            quality,
        })
    }

    /// Concatenate every batch artifact in the directory, sorted by file
    /// name, numbering records from 1.
    pub fn aggregate(&self, out: &Path) -> Result<usize> {
        let recipes = load_corpus(&self.dir)?;
        let numbered: Vec<NumberedRecipe> = recipes
            .into_iter()
            .enumerate()
            .map(|(i, recipe)| NumberedRecipe { id: i + 1, recipe })
            .collect();
        write_json(out, &numbered)?;
        Ok(numbered.len())
    }
}

/// Batch names become file names; path separators and spaces are replaced.
fn file_stem(batch: &str) -> String {
    let stem: String = batch
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() {
        "batch".to_string()
    } else {
        stem
    }
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

/// Batch artifacts in a directory, sorted by file name.
pub fn batch_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(RECIPES_SUFFIX))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Load one artifact, or every batch artifact when `path` is a directory.
pub fn load_corpus(path: &Path) -> Result<Vec<Recipe>> {
    if !path.is_dir() {
        return load_file(path);
    }
    let mut all = Vec::new();
    for file in batch_files(path)? {
        all.extend(load_file(&file)?);
    }
    Ok(all)
}

fn load_file(path: &Path) -> Result<Vec<Recipe>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
