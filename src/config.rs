use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::parser::Site;

/// Crawl tables shipped with the binary.
pub const DEFAULT_SOURCES: &str = include_str!("sources.toml");

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub batches: Vec<BatchConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            concurrency: 8,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            batches: Vec::new(),
        }
    }
}

/// One output batch: a site, a name for the artifact, the province every
/// recipe in it belongs to, and where to start fetching.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BatchConfig {
    pub site: Site,
    pub name: String,
    pub province: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

impl BatchConfig {
    /// Artifact name, prefixed with the site so batches of the same city from
    /// different sites don't collide.
    pub fn artifact_name(&self) -> String {
        format!("{}_{}", self.site.as_str(), self.name)
    }
}

impl Settings {
    /// Built-in sources (or `path`, which replaces them), then `RECIPES_*`
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let builder = Config::builder();
        let builder = match path {
            Some(p) => builder.add_source(File::from(p).format(FileFormat::Toml)),
            None => builder.add_source(File::from_str(DEFAULT_SOURCES, FileFormat::Toml)),
        };
        let settings = builder
            .add_source(Environment::with_prefix("RECIPES").try_parsing(true))
            .build()
            .context("loading settings")?;
        let settings: Settings = settings
            .try_deserialize()
            .context("invalid settings")?;
        Ok(settings)
    }

    pub fn select(&self, site: Option<Site>, batch: Option<&str>) -> Vec<&BatchConfig> {
        self.batches
            .iter()
            .filter(|b| site.map_or(true, |s| b.site == s))
            .filter(|b| batch.map_or(true, |n| b.name == n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sources_parse() {
        let s = Settings::load(None).unwrap();
        assert_eq!(s.output_dir, PathBuf::from("output"));
        assert_eq!(s.select(Some(Site::Roostanet), None).len(), 6);
        assert_eq!(s.select(Some(Site::Ghazaland), None).len(), 6);

        let gilan = s.select(Some(Site::Ghazaland), Some("gilan"));
        assert_eq!(gilan.len(), 1);
        assert_eq!(gilan[0].province, "گیلان");
        assert_eq!(gilan[0].urls.len(), 5);
        assert_eq!(gilan[0].artifact_name(), "ghazaland_gilan");

        let wiki = s.select(Some(Site::Wikibooks), None);
        assert_eq!(wiki.len(), 1);
        assert_eq!(wiki[0].urls.len(), 17);
    }

    #[test]
    fn user_file_replaces_builtin_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.toml");
        std::fs::write(
            &path,
            r#"
concurrency = 2

[[batches]]
site = "wikibooks"
name = "test"
province = "اردبیل"
urls = ["https://example.org/a"]
"#,
        )
        .unwrap();

        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.concurrency, 2);
        assert_eq!(s.timeout_secs, 30);
        assert_eq!(s.batches.len(), 1);
        assert_eq!(s.batches[0].site, Site::Wikibooks);
    }

    #[test]
    fn unknown_site_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[[batches]]\nsite = \"nope\"\nname = \"x\"\nprovince = \"y\"\n").unwrap();
        assert!(Settings::load(Some(&path)).is_err());
    }
}
