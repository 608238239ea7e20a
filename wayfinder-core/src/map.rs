use crate::ProgressCallback;
use crate::site::SiteKey;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};
use wayfinder_scanner::reduce::DEFAULT_MAX_LABEL_CHARS;
use wayfinder_scanner::{
    BrowserContext, DefaultRules, DomReducer, HttpBrowser, HttpPage, NavigationIndexer, Page,
    WaitUntil, navigation_map,
};

/// Options for a navigation-map run
pub struct MapOptions {
    pub urls: Vec<String>,
    pub timeout_secs: u64,
    pub max_label_chars: usize,
    pub show_progress_bars: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            timeout_secs: 10,
            max_label_chars: DEFAULT_MAX_LABEL_CHARS,
            show_progress_bars: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    /// Label path joined with `.`, e.g. `Products.Phones`
    pub path: String,
    pub url: String,
}

/// Navigation map of one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteMap {
    /// URL as requested
    pub url: String,
    /// Host without `www.`, empty when the URL has none
    pub site: String,
    pub entries: Vec<MapEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SiteMap {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            site: SiteKey::parse(url).map(|key| key.host()).unwrap_or_default(),
            entries: Vec::new(),
            error: None,
        }
    }

    fn failed(url: &str, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(url)
        }
    }
}

pub(crate) fn spinner(show: bool, message: &str) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Some(pb)
}

/// Reduce `html` and flatten its navigation into `(path, url)` entries.
pub fn map_document(html: &str, base_url: &str, max_label_chars: usize) -> Vec<MapEntry> {
    let reducer =
        DomReducer::with_rules(DefaultRules::new().with_max_label_chars(max_label_chars));
    let Some(hierarchy) = reducer.reduce_html(html) else {
        return Vec::new();
    };

    let trie = NavigationIndexer::new().build(&hierarchy);
    navigation_map(&trie, base_url)
        .into_iter()
        .map(|(path, url)| MapEntry { path, url })
        .collect()
}

async fn read_page(page: &HttpPage) -> wayfinder_scanner::error::Result<(String, String)> {
    Ok((page.url().await?, page.content().await?))
}

/// Fetch every URL and build its navigation map.
///
/// A URL that fails to load yields a `SiteMap` carrying the error; only a
/// client that cannot be built fails the whole run.
pub async fn execute_map(
    options: MapOptions,
    progress_callback: Option<ProgressCallback>,
) -> Result<Vec<SiteMap>, String> {
    let MapOptions {
        urls,
        timeout_secs,
        max_label_chars,
        show_progress_bars,
    } = options;

    let browser = HttpBrowser::with_timeout(timeout_secs)
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
    let page = browser
        .new_page()
        .await
        .map_err(|e| format!("Failed to open page: {}", e))?;
    let timeout = Duration::from_secs(timeout_secs);

    let progress_bar = spinner(show_progress_bars, "Starting map...");
    let mut maps = Vec::with_capacity(urls.len());

    for (idx, url) in urls.iter().enumerate() {
        if let Some(ref pb) = progress_bar {
            pb.set_message(format!("Mapping {}/{}: {}", idx + 1, urls.len(), url));
        }

        if let Err(e) = page.goto(url, timeout, WaitUntil::NetworkIdle).await {
            warn!("Failed to load {}: {}", url, e);
            if let Some(ref callback) = progress_callback {
                callback(format!("[!]  Failed to map {}: {}", url, e));
            }
            maps.push(SiteMap::failed(url, e.to_string()));
            continue;
        }

        let (base_url, html) = match read_page(&page).await {
            Ok(loaded) => loaded,
            Err(e) => {
                maps.push(SiteMap::failed(url, e.to_string()));
                continue;
            }
        };

        let mut site_map = SiteMap::new(url);
        site_map.entries = map_document(&html, &base_url, max_label_chars);
        info!("Mapped {} navigation entries on {}", site_map.entries.len(), url);
        maps.push(site_map);
    }

    if let Err(e) = page.close().await {
        warn!("Failed to close page: {}", e);
    }

    if let Some(ref pb) = progress_bar {
        let mapped = maps.iter().filter(|m| m.error.is_none()).count();
        pb.finish_with_message(format!("Map complete! {}/{} pages mapped", mapped, urls.len()));
    }

    Ok(maps)
}
