use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::Settings;

/// Outcome of fetching one URL. Exactly one of `html` / `error` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub url: String,
    pub html: Option<String>,
    pub status: Option<u16>,
    pub error: Option<String>,
    pub latency_ms: Option<u64>,
}

impl FetchedPage {
    fn failed(url: &str, status: Option<u16>, error: String, latency_ms: Option<u64>) -> Self {
        Self {
            url: url.to_string(),
            html: None,
            status,
            error: Some(error),
            latency_ms,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.html.is_some()
    }
}

/// Fetch stats for one `fetch_all` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
    /// Mean over pages that got any response.
    pub avg_latency_ms: u64,
}

impl FetchStats {
    pub fn of(pages: &[FetchedPage]) -> Self {
        let ok = pages.iter().filter(|p| p.is_ok()).count();
        let latencies: Vec<u64> = pages.iter().filter_map(|p| p.latency_ms).collect();
        let avg_latency_ms = match latencies.len() {
            0 => 0,
            n => latencies.iter().sum::<u64>() / n as u64,
        };
        Self {
            total: pages.len(),
            ok,
            errors: pages.len() - ok,
            avg_latency_ms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    concurrency: usize,
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout: Duration, concurrency: usize) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("fa-IR,fa;q=0.9,en;q=0.8"));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            concurrency: concurrency.max(1),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.user_agent,
            Duration::from_secs(settings.timeout_secs),
            settings.concurrency,
        )
    }

    /// Fetch pages concurrently. Results come back in the order of `urls`.
    pub async fn fetch_all(&self, urls: Vec<String>) -> Vec<FetchedPage> {
        let total = urls.len();
        if total == 0 {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
        {
            pb.set_style(style.progress_chars("=> "));
        }

        let (tx, mut rx) = tokio::sync::mpsc::channel::<(usize, FetchedPage)>(self.concurrency * 2);

        for (i, url) in urls.into_iter().enumerate() {
            let client = self.client.clone();
            let sem = Arc::clone(&semaphore);
            let tx = tx.clone();

            tokio::spawn(async move {
                let Ok(_permit) = sem.acquire().await else { return };
                let page = fetch_page(&client, &url).await;
                let _ = tx.send((i, page)).await;
            });
        }

        // rx closes once every task has sent
        drop(tx);

        let mut slots: Vec<Option<FetchedPage>> = vec![None; total];
        while let Some((i, page)) = rx.recv().await {
            if let Some(err) = &page.error {
                warn!(url = %page.url, "fetch failed: {}", err);
            }
            slots[i] = Some(page);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let pages: Vec<FetchedPage> = slots.into_iter().flatten().collect();
        let stats = FetchStats::of(&pages);
        info!(
            "Fetched {} pages ({} ok, {} errors, avg {}ms)",
            stats.total, stats.ok, stats.errors, stats.avg_latency_ms
        );
        pages
    }
}

async fn fetch_page(client: &Client, url: &str) -> FetchedPage {
    let start = Instant::now();
    let response = client.get(url).send().await;
    let elapsed = || Some(start.elapsed().as_millis() as u64);

    let response = match response {
        Ok(r) => r,
        Err(e) => return FetchedPage::failed(url, None, e.to_string(), elapsed()),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchedPage::failed(url, Some(status.as_u16()), format!("HTTP {}", status), elapsed());
    }

    match response.text().await {
        Ok(html) => FetchedPage {
            url: url.to_string(),
            html: Some(html),
            status: Some(status.as_u16()),
            error: None,
            latency_ms: elapsed(),
        },
        Err(e) => FetchedPage::failed(url, Some(status.as_u16()), e.to_string(), elapsed()),
    }
}
