//! Empirical pagination detection.
//!
//! The prober loads a listing page, clicks the first matching "next" control
//! a bounded number of times and classifies the paging mechanism from the
//! URLs it saw along the way.

use crate::driver::{BrowserContext, Page, WaitUntil};
use crate::error::{ProbeError, Result, ScanError};
use crate::result::PaginationResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_TRANSITIONS: usize = 2;

const NEXT_TAGS: [&str; 2] = ["a", "button"];
const NEXT_ATTRIBUTES: [&str; 6] = [
    "[rel='next']",
    "[class*='next']",
    "[class*='page']",
    "[class*='pagination']",
    "[id*='next']",
    "[id*='page']",
];

/// CSS selectors for common "next page" controls, most specific first.
pub fn default_next_selectors() -> Vec<String> {
    NEXT_TAGS
        .iter()
        .flat_map(|tag| NEXT_ATTRIBUTES.iter().map(move |attr| format!("{tag}{attr}")))
        .collect()
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Budget for the initial load.
    pub load_timeout: Duration,
    /// Pause after a click before looking for new tabs.
    pub settle_delay: Duration,
    /// Budget for each post-click load and each driver call.
    pub transition_timeout: Duration,
    /// Gap between the two content reads of the same-URL check.
    pub stability_delay: Duration,
    /// Page transitions attempted beyond the initial load.
    pub max_transitions: usize,
    /// Hard bound on the whole probing loop.
    pub deadline: Duration,
    pub wait_until: WaitUntil,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(10),
            settle_delay: Duration::from_secs(1),
            transition_timeout: Duration::from_secs(5),
            stability_delay: Duration::from_secs(1),
            max_transitions: DEFAULT_MAX_TRANSITIONS,
            deadline: Duration::from_secs(30),
            wait_until: WaitUntil::NetworkIdle,
        }
    }
}

impl ProbeConfig {
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_transition_timeout(mut self, timeout: Duration) -> Self {
        self.transition_timeout = timeout;
        self
    }

    pub fn with_stability_delay(mut self, delay: Duration) -> Self {
        self.stability_delay = delay;
        self
    }

    pub fn with_max_transitions(mut self, max_transitions: usize) -> Self {
        self.max_transitions = max_transitions;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = wait_until;
        self
    }
}

/// The page clicks are currently issued against.
enum ActiveTab<P> {
    Origin,
    Opened(P),
}

impl<P> ActiveTab<P> {
    fn page<'a>(&'a self, origin: &'a P) -> &'a P {
        match self {
            ActiveTab::Origin => origin,
            ActiveTab::Opened(page) => page,
        }
    }
}

struct Advance<P> {
    url: String,
    new_tab: Option<P>,
}

enum Stop {
    NoControl,
    Failed(ScanError),
}

#[derive(Debug, Clone, Default)]
pub struct PaginationProber {
    config: ProbeConfig,
}

impl PaginationProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe `url` in a fresh page of `context`.
    ///
    /// Every page the probe opens, the starting one included, is closed
    /// before returning. Driver failures never surface as errors: an
    /// unreachable URL classifies as `unknown`. `Err` is reserved for an
    /// unusable selector list.
    pub async fn probe<C: BrowserContext>(
        &self,
        context: &C,
        url: &str,
        selectors: &[String],
    ) -> std::result::Result<PaginationResult, ProbeError> {
        validate_selectors(selectors)?;

        let opened = bounded(self.config.transition_timeout, "new page", context.new_page()).await;
        let page = match opened {
            Ok(page) => page,
            Err(e) => {
                warn!("Could not open a page for {}: {}", url, e);
                return Ok(PaginationResult::unreachable(url.to_string()));
            }
        };

        let result = self.run(context, &page, url, selectors).await;
        self.close_quietly(&page).await;
        Ok(result)
    }

    /// Probe `url` on a page the caller owns. The page is left open; tabs
    /// opened while probing are closed.
    pub async fn probe_page<C: BrowserContext>(
        &self,
        context: &C,
        page: &C::Page,
        url: &str,
        selectors: &[String],
    ) -> std::result::Result<PaginationResult, ProbeError> {
        validate_selectors(selectors)?;
        Ok(self.run(context, page, url, selectors).await)
    }

    async fn run<C: BrowserContext>(
        &self,
        context: &C,
        origin: &C::Page,
        url: &str,
        selectors: &[String],
    ) -> PaginationResult {
        let config = &self.config;

        let loaded = bounded(
            config.load_timeout,
            "initial load",
            origin.goto(url, config.load_timeout, config.wait_until),
        )
        .await;
        if let Err(e) = loaded {
            warn!("Failed to load {}: {}", url, e);
            return PaginationResult::unreachable(url.to_string());
        }

        let first = match bounded(config.transition_timeout, "url", origin.url()).await {
            Ok(first) => first,
            Err(e) => {
                warn!("Could not read URL after loading {}: {}", url, e);
                return PaginationResult::unreachable(url.to_string());
            }
        };

        let mut urls = vec![first];
        let mut opened: Vec<C::Page> = Vec::new();
        let mut active = ActiveTab::Origin;
        let deadline = Instant::now() + config.deadline;

        for attempt in 1..=config.max_transitions {
            if Instant::now() >= deadline {
                warn!("Probe deadline reached for {} after {} clicks", url, attempt - 1);
                break;
            }

            let current = active.page(origin);
            let advance = match self.advance(context, current, selectors, &mut opened).await {
                Ok(advance) => advance,
                Err(Stop::NoControl) => {
                    debug!("No next control on {}", url);
                    break;
                }
                Err(Stop::Failed(e)) => {
                    debug!("Click {} on {} did not advance: {}", attempt, url, e);
                    break;
                }
            };

            debug!("Click {} on {} landed on {}", attempt, url, advance.url);
            urls.push(advance.url);
            if let Some(tab) = advance.new_tab {
                active = ActiveTab::Opened(tab);
            }

            if urls.last() == urls.first() && !self.content_changing(active.page(origin)).await {
                debug!("Content on {} stopped changing", url);
                break;
            }
        }

        for tab in &opened {
            self.close_quietly(tab).await;
        }

        let result = PaginationResult::classify(urls);
        info!(
            "Pagination on {}: {} ({} urls)",
            url,
            result.mechanism,
            result.urls.len()
        );
        result
    }

    /// Click the first matching control and report where it led.
    ///
    /// Every page that was not open before the click is pushed to `opened`,
    /// on the failure paths too, so the caller can close it.
    async fn advance<C: BrowserContext>(
        &self,
        context: &C,
        current: &C::Page,
        selectors: &[String],
        opened: &mut Vec<C::Page>,
    ) -> std::result::Result<Advance<C::Page>, Stop> {
        let config = &self.config;
        let selector = self.find_control(current, selectors).await.ok_or(Stop::NoControl)?;

        let known: Vec<usize> = bounded(config.transition_timeout, "page list", context.pages())
            .await
            .map_err(Stop::Failed)?
            .iter()
            .map(|page| page.id())
            .collect();

        let clicked = current.click_first(selector);
        if let Err(e) = bounded(config.transition_timeout, "click", clicked).await {
            self.adopt_new_pages(context, &known, opened).await;
            return Err(Stop::Failed(e));
        }
        tokio::time::sleep(config.settle_delay).await;

        let pages = match bounded(config.transition_timeout, "page list", context.pages()).await {
            Ok(pages) => pages,
            Err(e) => {
                self.adopt_new_pages(context, &known, opened).await;
                return Err(Stop::Failed(e));
            }
        };

        let mut new_pages: Vec<C::Page> = pages
            .into_iter()
            .filter(|page| !known.contains(&page.id()))
            .collect();
        opened.extend(new_pages.iter().cloned());

        let (target, new_tab) = match new_pages.pop() {
            Some(tab) => {
                info!("Click opened page {}", tab.id());
                (tab.clone(), Some(tab))
            }
            None => (current.clone(), None),
        };

        bounded(
            config.transition_timeout,
            "post-click load",
            target.wait_for_load(config.wait_until, config.transition_timeout),
        )
        .await
        .map_err(Stop::Failed)?;

        let url = bounded(config.transition_timeout, "url", target.url())
            .await
            .map_err(Stop::Failed)?;

        Ok(Advance { url, new_tab })
    }

    /// Track pages that appeared after a click that then failed.
    async fn adopt_new_pages<C: BrowserContext>(
        &self,
        context: &C,
        known: &[usize],
        opened: &mut Vec<C::Page>,
    ) {
        match bounded(self.config.transition_timeout, "page list", context.pages()).await {
            Ok(pages) => {
                for page in pages.into_iter().filter(|page| !known.contains(&page.id())) {
                    debug!("Tracking page {} left by a failed click", page.id());
                    opened.push(page);
                }
            }
            Err(e) => warn!("Could not list pages after a failed click: {}", e),
        }
    }

    async fn find_control<'s, P: Page>(&self, page: &P, selectors: &'s [String]) -> Option<&'s str> {
        for selector in selectors {
            match bounded(
                self.config.transition_timeout,
                "locator count",
                page.locator_count(selector),
            )
            .await
            {
                Ok(count) if count > 0 => return Some(selector.as_str()),
                Ok(_) => {}
                Err(e) => debug!("Skipping selector {}: {}", selector, e),
            }
        }
        None
    }

    /// Same-URL check: read the document twice, `stability_delay` apart.
    /// Unreadable content counts as not changing.
    async fn content_changing<P: Page>(&self, page: &P) -> bool {
        let timeout = self.config.transition_timeout;
        let Ok(before) = bounded(timeout, "content", page.content()).await else {
            return false;
        };
        tokio::time::sleep(self.config.stability_delay).await;
        let Ok(after) = bounded(timeout, "content", page.content()).await else {
            return false;
        };
        before != after
    }

    async fn close_quietly<P: Page>(&self, page: &P) {
        if page.is_closed().await {
            return;
        }
        if let Err(e) = bounded(self.config.transition_timeout, "close", page.close()).await {
            warn!("Failed to close page {}: {}", page.id(), e);
        }
    }
}

fn validate_selectors(selectors: &[String]) -> std::result::Result<(), ProbeError> {
    if selectors.is_empty() {
        return Err(ProbeError::NoSelectors);
    }
    if let Some(idx) = selectors.iter().position(|s| s.trim().is_empty()) {
        return Err(ProbeError::BlankSelector(idx));
    }
    Ok(())
}

/// Run a driver call under `limit`; running out of time is an ordinary error.
async fn bounded<T>(
    limit: Duration,
    what: &'static str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| ScanError::Timeout(limit, what))?
}
