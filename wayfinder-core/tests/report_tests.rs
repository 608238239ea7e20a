// Tests for report generation

use wayfinder_core::map::{MapEntry, SiteMap};
use wayfinder_core::report::{
    ReportFormat, extract_url_path, generate_map_report, generate_probe_report,
    render_map_report, render_probe_report,
};
use wayfinder_scanner::PaginationResult;

fn site_map(url: &str, site: &str, entries: &[(&str, &str)]) -> SiteMap {
    SiteMap {
        url: url.to_string(),
        site: site.to_string(),
        entries: entries
            .iter()
            .map(|(path, url)| MapEntry {
                path: path.to_string(),
                url: url.to_string(),
            })
            .collect(),
        error: None,
    }
}

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("csv"), None);
}

#[test]
fn test_extract_url_path() {
    assert_eq!(extract_url_path("http://example.com"), "/");
    assert_eq!(extract_url_path("http://example.com/a/b?x=1#top"), "/a/b");
    assert_eq!(extract_url_path("not a url"), "not a url");
}

#[test]
fn test_map_report_summary_and_entries() {
    let mut failed = site_map("http://example.com/down", "example.com", &[]);
    failed.error = Some("connection refused".to_string());
    let maps = vec![
        site_map(
            "http://example.com/",
            "example.com",
            &[("Products.Phones", "http://example.com/phones")],
        ),
        failed,
    ];

    let report = generate_map_report(&maps);
    assert!(report.contains("# Summary:"));
    assert!(report.contains("Pages mapped: 1"));
    assert!(report.contains("Pages failed: 1"));
    assert!(report.contains("Navigation entries: 1"));
    assert!(report.contains("## example.com"));
    assert!(report.contains("Products.Phones → http://example.com/phones"));
    assert!(report.contains("connection refused"));
}

#[test]
fn test_map_report_groups_ports_of_one_site() {
    let maps = vec![
        site_map("http://a.com/", "a.com", &[]),
        site_map("http://b.org/", "b.org", &[]),
        site_map("http://www.a.com:8080/", "a.com", &[]),
    ];
    let report = generate_map_report(&maps);

    let a = report.find("## a.com\n").unwrap();
    let a_alt = report.find("## a.com:8080").unwrap();
    let b = report.find("## b.org").unwrap();
    assert!(a < a_alt && a_alt < b);
}

#[test]
fn test_map_report_json() {
    let maps = vec![site_map(
        "http://example.com/",
        "example.com",
        &[("About", "http://example.com/about")],
    )];
    let json = render_map_report(&maps, ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert!(value["generated_at"].is_string());
    assert_eq!(value["sites"][0]["site"], "example.com");
    assert_eq!(value["sites"][0]["entries"][0]["path"], "About");
    assert!(value["sites"][0].get("error").is_none());
}

#[test]
fn test_probe_report() {
    let results = vec![
        (
            "http://example.com/list".to_string(),
            PaginationResult::classify(vec![
                "http://example.com/list".to_string(),
                "http://example.com/list?page=2".to_string(),
            ]),
        ),
        (
            "http://example.com/about".to_string(),
            PaginationResult::unreachable("http://example.com/about".to_string()),
        ),
    ];

    let report = generate_probe_report(&results);
    assert!(report.contains("Pages probed: 2"));
    assert!(report.contains("Paginated: 1"));
    assert!(report.contains("## http://example.com/list"));
    assert!(report.contains("2. http://example.com/list?page=2"));

    let json = render_probe_report(&results, ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["results"][0]["url"], "http://example.com/list");
    assert_eq!(value["results"][0]["mechanism"], "GET");
    assert_eq!(value["results"][1]["has_pagination"], false);
}
