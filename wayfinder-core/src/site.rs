// Site bookkeeping keyed by reversed domain

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;
use wayfinder_scanner::Trie;

/// Reversed host labels plus the effective port.
///
/// `https://www.shop.example.com/a` becomes `["com", "example", "shop"]`
/// on port 443, so sites under one registrable domain share a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteKey {
    pub labels: Vec<String>,
    pub port: u16,
}

impl SiteKey {
    pub fn parse(url: &str) -> Result<Self, String> {
        let parsed = Url::parse(url).map_err(|e| format!("Invalid URL {}: {}", url, e))?;
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| format!("URL has no host: {}", url))?;

        let host = host.strip_prefix("www.").unwrap_or(host);
        let labels = host.split('.').rev().map(str::to_string).collect();
        let port = parsed
            .port()
            .unwrap_or(if parsed.scheme() == "https" { 443 } else { 80 });

        Ok(Self { labels, port })
    }

    /// Host name rebuilt from the labels, without any `www.` prefix.
    pub fn host(&self) -> String {
        self.labels
            .iter()
            .rev()
            .cloned()
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub url: String,
    pub scheme: String,
    pub port: u16,
}

/// Every site seen during a run, one record per host and port.
#[derive(Debug, Default)]
pub struct SiteIndex {
    sites: Trie<String, BTreeMap<u16, SiteRecord>>,
}

impl SiteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url`, replacing any earlier record for the same host and port.
    pub fn add(&mut self, url: &str) -> Result<SiteKey, String> {
        let key = SiteKey::parse(url)?;
        let scheme = Url::parse(url)
            .map(|u| u.scheme().to_string())
            .map_err(|e| e.to_string())?;
        let record = SiteRecord {
            url: url.to_string(),
            scheme,
            port: key.port,
        };

        match self.sites.get_mut(&key.labels) {
            Some(ports) => {
                ports.insert(key.port, record);
            }
            None => {
                self.sites
                    .insert(&key.labels, BTreeMap::from([(key.port, record)]));
            }
        }
        Ok(key)
    }

    pub fn get(&self, url: &str) -> Option<&SiteRecord> {
        let key = SiteKey::parse(url).ok()?;
        self.sites.get(&key.labels)?.get(&key.port)
    }

    pub fn remove(&mut self, url: &str) -> Option<SiteRecord> {
        let key = SiteKey::parse(url).ok()?;
        let ports = self.sites.get_mut(&key.labels)?;
        let removed = ports.remove(&key.port);
        if ports.is_empty() {
            self.sites.remove(&key.labels);
        }
        removed
    }

    /// All records, grouped by reversed domain then ordered by port.
    pub fn list(&self) -> Vec<&SiteRecord> {
        self.sites
            .list_all()
            .into_iter()
            .flat_map(|(_, ports)| ports.values())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sites.list_all().iter().map(|(_, ports)| ports.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
