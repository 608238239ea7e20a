use crate::ProgressCallback;
use crate::map::spinner;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use wayfinder_scanner::{HttpBrowser, PaginationProber, PaginationResult, ProbeConfig};

/// Options for a pagination-probe run
pub struct ProbeOptions {
    pub urls: Vec<String>,
    /// Candidate "next" selectors, tried in order
    pub selectors: Vec<String>,
    pub config: ProbeConfig,
    /// Probes in flight at once
    pub concurrency: usize,
    pub show_progress_bars: bool,
}

/// Probe every URL for pagination.
///
/// Each probe gets its own browser context, so a tab opened by one probe is
/// never mistaken for a tab opened by another. Results keep the order of
/// `urls`. Unreachable URLs come back as `unknown`; the run only fails when
/// the selector list is unusable or no client can be built.
pub async fn execute_probe(
    options: ProbeOptions,
    progress_callback: Option<ProgressCallback>,
) -> Result<Vec<(String, PaginationResult)>, String> {
    let ProbeOptions {
        urls,
        selectors,
        config,
        concurrency,
        show_progress_bars,
    } = options;

    let timeout_secs = config.load_timeout.as_secs().max(1);
    let browser = HttpBrowser::with_timeout(timeout_secs)
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
    let prober = PaginationProber::with_config(config);

    let progress_bar = spinner(show_progress_bars, "Starting probe...");
    let done = AtomicUsize::new(0);
    let total = urls.len();

    let outcomes: Vec<_> = stream::iter(&urls)
        .map(|url| {
            let context = browser.fork();
            let (prober, selectors, done) = (&prober, &selectors, &done);
            let (progress_bar, progress_callback) = (&progress_bar, &progress_callback);
            async move {
                let outcome = prober.probe(&context, url, selectors).await;

                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(pb) = progress_bar {
                    pb.set_message(format!("Probed {}/{}: {}", finished, total, url));
                }
                if let (Ok(result), Some(callback)) = (&outcome, progress_callback)
                    && !result.has_pagination
                {
                    callback(format!("[!]  No pagination detected on {}", url));
                }
                outcome.map(|result| (url.clone(), result))
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let results = outcomes
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Invalid selectors: {}", e))?;

    if let Some(ref pb) = progress_bar {
        let paginated = results.iter().filter(|(_, r)| r.has_pagination).count();
        pb.finish_with_message(format!(
            "Probe complete! {}/{} pages paginated",
            paginated, total
        ));
    }

    Ok(results)
}
