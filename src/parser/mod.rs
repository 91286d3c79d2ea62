pub mod blocks;
pub mod extract;
pub mod sections;

use serde::Deserialize;

use crate::builder::build_recipe;
use crate::raw::{BuildContext, RawBlock};
use crate::validate::ValidatedRecipe;

/// Recipe sources with a dedicated extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    /// City pages listing many recipes as labelled plain text.
    Roostanet,
    /// One recipe per page, reached through paginated cuisine listings.
    Ghazaland,
    /// Wikibooks cookbook pages.
    Wikibooks,
}

impl Site {
    pub fn as_str(self) -> &'static str {
        match self {
            Site::Roostanet => "roostanet",
            Site::Ghazaland => "ghazaland",
            Site::Wikibooks => "wikibooks",
        }
    }

    /// Configured URLs are listing pages whose links must be followed first.
    pub fn has_listing_pages(self) -> bool {
        matches!(self, Site::Ghazaland)
    }
}

/// Site-specific extraction: HTML → raw blocks.
pub fn extract_page(site: Site, html: &str, page_url: &str) -> Vec<RawBlock> {
    match site {
        Site::Roostanet => extract::roostanet::extract(html),
        Site::Ghazaland => extract::ghazaland::extract(html),
        Site::Wikibooks => extract::wikibooks::extract(html, page_url),
    }
}

/// Recipe page URLs found on a listing page. Empty for sites without listings.
pub fn listing_links(site: Site, html: &str, page_url: &str) -> Vec<String> {
    match site {
        Site::Ghazaland => extract::ghazaland::listing_links(html, page_url),
        Site::Roostanet | Site::Wikibooks => Vec::new(),
    }
}

/// Three-step pipeline: HTML → raw blocks → recipes → validated recipes.
pub fn process_page(site: Site, html: &str, page_url: &str, province: &str) -> Vec<ValidatedRecipe> {
    let ctx = BuildContext::new(province, page_url);
    extract_page(site, html, page_url)
        .iter()
        .map(|raw| ValidatedRecipe::new(build_recipe(raw, &ctx)))
        .collect()
}
