//! Page-control capability consumed by the pagination prober.
//!
//! A real browser (CDP, WebDriver, ...) or the bundled [`crate::http::HttpBrowser`]
//! implements these traits; the prober never talks to a browser directly.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Load state a navigation waits for before it counts as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitUntil {
    Load,
    DomContentLoaded,
    #[default]
    NetworkIdle,
}

#[async_trait]
pub trait Page: Send + Sync {
    /// Identifier that stays stable for the lifetime of the page.
    fn id(&self) -> usize;

    async fn goto(&self, url: &str, timeout: Duration, wait_until: WaitUntil) -> Result<()>;

    /// Wait until any navigation in flight has reached `wait_until`.
    async fn wait_for_load(&self, wait_until: WaitUntil, timeout: Duration) -> Result<()>;

    async fn url(&self) -> Result<String>;

    /// Serialized DOM of the current document.
    async fn content(&self) -> Result<String>;

    async fn locator_count(&self, selector: &str) -> Result<usize>;

    /// Click the first element matching `selector`.
    async fn click_first(&self, selector: &str) -> Result<()>;

    async fn close(&self) -> Result<()>;

    async fn is_closed(&self) -> bool;
}

#[async_trait]
pub trait BrowserContext: Send + Sync {
    type Page: Page + Clone + 'static;

    async fn new_page(&self) -> Result<Self::Page>;

    /// Open pages in the order they were created.
    async fn pages(&self) -> Result<Vec<Self::Page>>;
}
