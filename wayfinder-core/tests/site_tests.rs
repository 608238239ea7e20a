// Tests for the reversed-domain site index

use wayfinder_core::site::{SiteIndex, SiteKey};

#[test]
fn test_site_key_reverses_labels_and_drops_www() {
    let key = SiteKey::parse("https://www.shop.example.com/deals").unwrap();
    assert_eq!(key.labels, vec!["com", "example", "shop"]);
    assert_eq!(key.port, 443);
    assert_eq!(key.host(), "shop.example.com");
}

#[test]
fn test_site_key_default_ports() {
    assert_eq!(SiteKey::parse("http://example.com").unwrap().port, 80);
    assert_eq!(SiteKey::parse("https://example.com").unwrap().port, 443);
    assert_eq!(SiteKey::parse("http://example.com:8080/").unwrap().port, 8080);
}

#[test]
fn test_site_key_only_strips_leading_www() {
    let key = SiteKey::parse("http://wwwx.example.com").unwrap();
    assert_eq!(key.labels, vec!["com", "example", "wwwx"]);
}

#[test]
fn test_site_key_rejects_hostless_urls() {
    assert!(SiteKey::parse("not a url").is_err());
    assert!(SiteKey::parse("mailto:someone@example.com").is_err());
}

#[test]
fn test_add_and_get() {
    let mut index = SiteIndex::new();
    index.add("https://www.example.com/a").unwrap();

    let record = index.get("https://example.com/other").unwrap();
    assert_eq!(record.url, "https://www.example.com/a");
    assert_eq!(record.scheme, "https");
    assert_eq!(record.port, 443);
    assert!(index.get("http://example.com/").is_none());
}

#[test]
fn test_ports_are_tracked_separately() {
    let mut index = SiteIndex::new();
    index.add("http://example.com/").unwrap();
    index.add("https://example.com/").unwrap();
    index.add("http://example.com:8080/").unwrap();

    assert_eq!(index.len(), 3);
    let ports: Vec<u16> = index.list().iter().map(|r| r.port).collect();
    assert_eq!(ports, vec![80, 443, 8080]);
}

#[test]
fn test_same_site_replaces_record() {
    let mut index = SiteIndex::new();
    index.add("http://example.com/first").unwrap();
    index.add("http://example.com/second").unwrap();

    assert_eq!(index.len(), 1);
    assert_eq!(
        index.get("http://example.com/").unwrap().url,
        "http://example.com/second"
    );
}

#[test]
fn test_remove_drops_empty_sites() {
    let mut index = SiteIndex::new();
    index.add("http://example.com/").unwrap();
    index.add("https://example.com/").unwrap();

    let removed = index.remove("http://example.com/x").unwrap();
    assert_eq!(removed.port, 80);
    assert_eq!(index.len(), 1);
    assert!(!index.is_empty());

    index.remove("https://example.com/").unwrap();
    assert!(index.is_empty());
    assert!(index.remove("https://example.com/").is_none());
}
