// Pagination probing against a live HTTP server

use std::time::Duration;
use wayfinder_scanner::{
    BrowserContext, HttpBrowser, Mechanism, PaginationProber, ProbeConfig, default_next_selectors,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn fast_config() -> ProbeConfig {
    ProbeConfig::default()
        .with_settle_delay(Duration::from_millis(10))
        .with_stability_delay(Duration::from_millis(10))
        .with_load_timeout(Duration::from_secs(5))
}

async fn serve(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body.to_string()),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_link_pagination_is_get() {
    let server = MockServer::start().await;
    serve(&server, "/list/1", r#"<ul><li>a</li></ul><a rel="next" href="/list/2">Next</a>"#).await;
    serve(&server, "/list/2", r#"<ul><li>b</li></ul><a rel="next" href="/list/3">Next</a>"#).await;
    serve(&server, "/list/3", r#"<ul><li>c</li></ul><a rel="next" href="/list/4">Next</a>"#).await;

    let browser = HttpBrowser::new().unwrap();
    let start = format!("{}/list/1", server.uri());
    let result = PaginationProber::with_config(fast_config())
        .probe(&browser, &start, &default_next_selectors())
        .await
        .unwrap();

    assert!(result.has_pagination);
    assert_eq!(result.mechanism, Mechanism::Get);
    assert_eq!(
        result.urls,
        vec![
            start.clone(),
            format!("{}/list/2", server.uri()),
            format!("{}/list/3", server.uri()),
        ]
    );
    assert_eq!(browser.page_count().await, 0);
}

#[tokio::test]
async fn test_page_without_controls_is_unknown() {
    let server = MockServer::start().await;
    serve(&server, "/only", "<p>nothing to page through</p>").await;

    let browser = HttpBrowser::new().unwrap();
    let url = format!("{}/only", server.uri());
    let result = PaginationProber::with_config(fast_config())
        .probe(&browser, &url, &default_next_selectors())
        .await
        .unwrap();

    assert!(!result.has_pagination);
    assert_eq!(result.mechanism, Mechanism::Unknown);
    assert_eq!(result.urls, vec![url]);
}

#[tokio::test]
async fn test_new_tab_pagination_closes_opened_tabs() {
    let server = MockServer::start().await;
    serve(&server, "/p1", r#"<a class="next" target="_blank" href="/p2">More</a>"#).await;
    serve(&server, "/p2", r#"<a class="next" target="_blank" href="/p3">More</a>"#).await;
    serve(&server, "/p3", "<p>end</p>").await;

    let browser = HttpBrowser::new().unwrap();
    let page = browser.new_page().await.unwrap();
    let start = format!("{}/p1", server.uri());
    let result = PaginationProber::with_config(fast_config())
        .probe_page(&browser, &page, &start, &[".next".to_string()])
        .await
        .unwrap();

    assert_eq!(result.mechanism, Mechanism::Get);
    assert_eq!(result.urls.len(), 3);
    assert_eq!(result.urls[2], format!("{}/p3", server.uri()));
    // The caller's page stays open, the two tabs are gone.
    assert_eq!(browser.page_count().await, 1);
}

#[tokio::test]
async fn test_unreachable_start_url() {
    let browser = HttpBrowser::with_timeout(2).unwrap();
    let result = PaginationProber::with_config(fast_config())
        .probe(&browser, "http://127.0.0.1:1/list", &default_next_selectors())
        .await
        .unwrap();

    assert!(!result.has_pagination);
    assert_eq!(result.mechanism, Mechanism::Unknown);
    assert_eq!(result.urls, vec!["http://127.0.0.1:1/list".to_string()]);
    assert_eq!(browser.page_count().await, 0);
}

#[tokio::test]
async fn test_blank_target_to_unreachable_host_leaves_no_tab() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/p1",
        r#"<a class="next" target="_blank" href="http://127.0.0.1:1/p2">More</a>"#,
    )
    .await;

    let browser = HttpBrowser::with_timeout(2).unwrap();
    let page = browser.new_page().await.unwrap();
    let start = format!("{}/p1", server.uri());
    let result = PaginationProber::with_config(fast_config())
        .probe_page(&browser, &page, &start, &[".next".to_string()])
        .await
        .unwrap();

    assert_eq!(result.mechanism, Mechanism::Unknown);
    assert_eq!(result.urls, vec![start]);
    assert_eq!(browser.page_count().await, 1);
}
