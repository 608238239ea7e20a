//! A scriptless [`BrowserContext`] over plain HTTP.
//!
//! Navigation is a GET, the "DOM" is the response body, and clicking follows
//! the matched element's `href`. That covers link-based pagination and
//! `target="_blank"` tabs; anything that needs JavaScript reports
//! [`ScanError::Unsupported`].

use crate::driver::{BrowserContext, Page, WaitUntil};
use crate::error::{Result, ScanError};
use crate::navigation::filter_url;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

const BLANK_URL: &str = "about:blank";

struct BrowserInner {
    client: Client,
    timeout: Duration,
    next_id: AtomicUsize,
    pages: Mutex<Vec<HttpPage>>,
}

#[derive(Clone)]
pub struct HttpBrowser {
    inner: Arc<BrowserInner>,
}

impl HttpBrowser {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("Wayfinder/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .pool_idle_timeout(Duration::from_secs(90))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self::with_client(client, Duration::from_secs(timeout_secs)))
    }

    /// Use a preconfigured client. `timeout` bounds navigations started by clicks.
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(BrowserInner {
                client,
                timeout,
                next_id: AtomicUsize::new(0),
                pages: Mutex::new(Vec::new()),
            }),
        }
    }

    /// A separate context with no pages that shares this one's client,
    /// connection pool and cookie jar.
    pub fn fork(&self) -> Self {
        Self::with_client(self.inner.client.clone(), self.inner.timeout)
    }

    pub async fn page_count(&self) -> usize {
        self.inner.pages.lock().await.len()
    }
}

#[async_trait]
impl BrowserContext for HttpBrowser {
    type Page = HttpPage;

    async fn new_page(&self) -> Result<HttpPage> {
        Ok(open_page(&self.inner).await)
    }

    async fn pages(&self) -> Result<Vec<HttpPage>> {
        Ok(self.inner.pages.lock().await.clone())
    }
}

async fn open_page(inner: &Arc<BrowserInner>) -> HttpPage {
    let page = HttpPage {
        id: inner.next_id.fetch_add(1, Ordering::Relaxed),
        state: Arc::new(Mutex::new(PageState {
            url: BLANK_URL.to_string(),
            body: String::new(),
            closed: false,
        })),
        browser: Arc::downgrade(inner),
    };
    inner.pages.lock().await.push(page.clone());
    debug!("Opened page {}", page.id);
    page
}

struct PageState {
    url: String,
    body: String,
    closed: bool,
}

#[derive(Clone)]
pub struct HttpPage {
    id: usize,
    state: Arc<Mutex<PageState>>,
    browser: Weak<BrowserInner>,
}

impl HttpPage {
    fn browser(&self) -> Result<Arc<BrowserInner>> {
        self.browser
            .upgrade()
            .ok_or_else(|| ScanError::Other("browser context was dropped".to_string()))
    }

    /// Current URL and body, failing if the page was closed.
    async fn snapshot(&self) -> Result<(String, String)> {
        let state = self.state.lock().await;
        if state.closed {
            return Err(ScanError::PageClosed(self.id));
        }
        Ok((state.url.clone(), state.body.clone()))
    }
}

#[async_trait]
impl Page for HttpPage {
    fn id(&self) -> usize {
        self.id
    }

    async fn goto(&self, url: &str, timeout: Duration, _wait_until: WaitUntil) -> Result<()> {
        self.snapshot().await?;
        let browser = self.browser()?;

        let fetch = async {
            let response = browser.client.get(url).send().await?;
            let final_url = response.url().to_string();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((final_url, body))
        };

        let (final_url, body) = tokio::time::timeout(timeout, fetch)
            .await
            .map_err(|_| ScanError::Timeout(timeout, "navigation"))?
            .map_err(|e| ScanError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Page {} loaded {} ({} bytes)", self.id, final_url, body.len());
        let mut state = self.state.lock().await;
        state.url = final_url;
        state.body = body;
        Ok(())
    }

    async fn wait_for_load(&self, _wait_until: WaitUntil, _timeout: Duration) -> Result<()> {
        // Navigations complete inside `goto`; nothing is ever in flight here.
        self.snapshot().await.map(|_| ())
    }

    async fn url(&self) -> Result<String> {
        self.snapshot().await.map(|(url, _)| url)
    }

    async fn content(&self) -> Result<String> {
        self.snapshot().await.map(|(_, body)| body)
    }

    async fn locator_count(&self, selector: &str) -> Result<usize> {
        let (_, body) = self.snapshot().await?;
        count_matches(&body, selector)
    }

    async fn click_first(&self, selector: &str) -> Result<()> {
        let (base_url, body) = self.snapshot().await?;
        let target = click_target(&body, &base_url, selector)?;
        let browser = self.browser()?;

        if target.new_tab {
            let tab = open_page(&browser).await;
            info!("Following {} in new page {}", target.url, tab.id);
            tab.goto(&target.url, browser.timeout, WaitUntil::Load).await
        } else {
            debug!("Page {} following {}", self.id, target.url);
            self.goto(&target.url, browser.timeout, WaitUntil::Load).await
        }
    }

    async fn close(&self) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            state.closed = true;
        }
        if let Some(browser) = self.browser.upgrade() {
            browser.pages.lock().await.retain(|page| page.id != self.id);
        }
        debug!("Closed page {}", self.id);
        Ok(())
    }

    async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }
}

struct ClickTarget {
    url: String,
    new_tab: bool,
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScanError::Selector(format!("{selector}: {e}")))
}

fn count_matches(body: &str, selector: &str) -> Result<usize> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(body);
    Ok(document.select(&selector).count())
}

fn click_target(body: &str, base_url: &str, selector: &str) -> Result<ClickTarget> {
    let parsed = parse_selector(selector)?;
    let document = Html::parse_document(body);
    let element = document
        .select(&parsed)
        .next()
        .ok_or_else(|| ScanError::Selector(format!("no element matches {selector}")))?;

    let href = element.value().attr("href").ok_or_else(|| {
        ScanError::Unsupported(format!(
            "<{}> has no href; following it needs a scripting browser",
            element.value().name()
        ))
    })?;
    let url = filter_url(href, base_url)
        .ok_or_else(|| ScanError::Unsupported(format!("href {href:?} is not navigable")))?;
    let new_tab = element
        .value()
        .attr("target")
        .is_some_and(|target| target.eq_ignore_ascii_case("_blank"));

    Ok(ClickTarget { url, new_tab })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn serve(server: &MockServer, route: &str, html: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(html),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_goto_loads_url_and_content() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/list",
            "<html><body><a class=\"next\" href=\"/list?p=2\">Next</a></body></html>".into(),
        )
        .await;

        let browser = HttpBrowser::new().unwrap();
        let page = browser.new_page().await.unwrap();
        assert_eq!(page.url().await.unwrap(), BLANK_URL);

        let url = format!("{}/list", server.uri());
        page.goto(&url, TIMEOUT, WaitUntil::NetworkIdle).await.unwrap();

        assert_eq!(page.url().await.unwrap(), url);
        assert!(page.content().await.unwrap().contains("Next"));
        assert_eq!(page.locator_count("a.next").await.unwrap(), 1);
        assert_eq!(page.locator_count("button").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_click_follows_relative_href() {
        let server = MockServer::start().await;
        serve(&server, "/a", "<a id=\"go\" href=\"b\">B</a>".into()).await;
        serve(&server, "/b", "<p>landed</p>".into()).await;

        let browser = HttpBrowser::new().unwrap();
        let page = browser.new_page().await.unwrap();
        page.goto(&format!("{}/a", server.uri()), TIMEOUT, WaitUntil::Load)
            .await
            .unwrap();
        page.click_first("#go").await.unwrap();

        assert_eq!(page.url().await.unwrap(), format!("{}/b", server.uri()));
        assert!(page.content().await.unwrap().contains("landed"));
        assert_eq!(browser.page_count().await, 1);
    }

    #[tokio::test]
    async fn test_blank_target_opens_new_page() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/a",
            "<a id=\"go\" target=\"_blank\" href=\"/b\">B</a>".into(),
        )
        .await;
        serve(&server, "/b", "<p>tab</p>".into()).await;

        let browser = HttpBrowser::new().unwrap();
        let page = browser.new_page().await.unwrap();
        let start = format!("{}/a", server.uri());
        page.goto(&start, TIMEOUT, WaitUntil::Load).await.unwrap();
        page.click_first("#go").await.unwrap();

        let pages = browser.pages().await.unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(page.url().await.unwrap(), start);
        assert_eq!(
            pages[1].url().await.unwrap(),
            format!("{}/b", server.uri())
        );

        pages[1].close().await.unwrap();
        assert!(pages[1].is_closed().await);
        assert_eq!(browser.page_count().await, 1);
        assert!(matches!(
            pages[1].url().await,
            Err(ScanError::PageClosed(_))
        ));
    }

    #[tokio::test]
    async fn test_fork_has_its_own_pages() {
        let browser = HttpBrowser::new().unwrap();
        browser.new_page().await.unwrap();

        let forked = browser.fork();
        assert_eq!(forked.page_count().await, 0);
        forked.new_page().await.unwrap();
        assert_eq!(browser.page_count().await, 1);
        assert_eq!(forked.page_count().await, 1);
    }

    #[tokio::test]
    async fn test_click_without_href_is_unsupported() {
        let server = MockServer::start().await;
        serve(&server, "/a", "<button class=\"next\">Next</button>".into()).await;

        let browser = HttpBrowser::new().unwrap();
        let page = browser.new_page().await.unwrap();
        page.goto(&format!("{}/a", server.uri()), TIMEOUT, WaitUntil::Load)
            .await
            .unwrap();

        assert!(matches!(
            page.click_first("button.next").await,
            Err(ScanError::Unsupported(_))
        ));
        assert!(matches!(
            page.click_first("a.next").await,
            Err(ScanError::Selector(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_selector_is_reported() {
        let browser = HttpBrowser::new().unwrap();
        let page = browser.new_page().await.unwrap();
        assert!(matches!(
            page.locator_count("a:text('Next')").await,
            Err(ScanError::Selector(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_navigation_error() {
        let browser = HttpBrowser::with_timeout(2).unwrap();
        let page = browser.new_page().await.unwrap();
        let result = page
            .goto("http://127.0.0.1:1/", TIMEOUT, WaitUntil::NetworkIdle)
            .await;
        assert!(matches!(result, Err(ScanError::Navigation { .. })));
    }
}
