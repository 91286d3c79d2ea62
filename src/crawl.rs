use std::collections::HashSet;
use std::time::Instant;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::BatchConfig;
use crate::corpus::{BatchSummary, CorpusWriter};
use crate::fetch::{FetchStats, FetchedPage, Fetcher};
use crate::parser::{self, Site};
use crate::validate::ValidatedRecipe;

/// Fetch, extract and write one batch.
///
/// Returns `None` when nothing was written: no recipe pages were found, or
/// every fetch failed. A previous artifact for the batch is left untouched in
/// both cases.
pub async fn crawl_batch(
    fetcher: &Fetcher,
    writer: &CorpusWriter,
    batch: &BatchConfig,
    limit: Option<usize>,
) -> Result<Option<BatchSummary>> {
    let t_batch = Instant::now();
    let name = batch.artifact_name();

    let mut urls = if batch.site.has_listing_pages() {
        info!(batch = %name, "scanning {} listing pages", batch.urls.len());
        let listings = fetcher.fetch_all(batch.urls.clone()).await;
        discover_links(batch.site, &listings)
    } else {
        batch.urls.clone()
    };
    if let Some(n) = limit {
        urls.truncate(n);
    }
    if urls.is_empty() {
        warn!(batch = %name, "no recipe pages found");
        return Ok(None);
    }

    info!(batch = %name, "fetching {} pages", urls.len());
    let pages = fetcher.fetch_all(urls).await;
    let stats = FetchStats::of(&pages);
    if stats.ok == 0 {
        warn!(batch = %name, failed = stats.errors, "every fetch failed, batch not written");
        return Ok(None);
    }

    let records = process_pages(batch.site, &batch.province, &pages);
    let summary = writer.write_batch(&name, &records)?;
    info!(
        batch = %name,
        pages = stats.total,
        failed = stats.errors,
        avg_latency_ms = stats.avg_latency_ms,
        "batch done in {:.1}s",
        t_batch.elapsed().as_secs_f64()
    );
    Ok(Some(summary))
}

/// Recipe links from listing pages, first occurrence wins.
pub fn discover_links(site: Site, listings: &[FetchedPage]) -> Vec<String> {
    let mut seen = HashSet::new();
    listings
        .iter()
        .filter_map(|p| p.html.as_deref().map(|html| parser::listing_links(site, html, &p.url)))
        .flatten()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Extract, build and validate fetched pages in parallel, keeping page order.
pub fn process_pages(site: Site, province: &str, pages: &[FetchedPage]) -> Vec<ValidatedRecipe> {
    let pb = ProgressBar::new(pages.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    let mut records = Vec::new();
    for chunk in pages.chunks(500) {
        let results: Vec<Vec<ValidatedRecipe>> = chunk
            .par_iter()
            .map(|page| match &page.html {
                Some(html) => parser::process_page(site, html, &page.url, province),
                None => Vec::new(),
            })
            .collect();
        records.extend(results.into_iter().flatten());
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    records
}
