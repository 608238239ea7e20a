// Text and JSON reports for map and probe runs

use crate::map::SiteMap;
use crate::site::{SiteIndex, SiteKey};
use colored::Colorize;
use serde::Serialize;
use url::Url;
use wayfinder_scanner::{Mechanism, PaginationResult};

const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

fn generated_at() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Group maps by site, ordered by reversed domain then port.
fn maps_by_site(maps: &[SiteMap]) -> Vec<(String, Vec<&SiteMap>)> {
    let mut index = SiteIndex::new();
    for map in maps {
        // Unparseable URLs are collected separately below.
        let _ = index.add(&map.url);
    }

    let mut groups = Vec::new();
    for record in index.list() {
        let Ok(key) = SiteKey::parse(&record.url) else {
            continue;
        };
        let members: Vec<&SiteMap> = maps
            .iter()
            .filter(|m| SiteKey::parse(&m.url).is_ok_and(|k| k == key))
            .collect();
        let label = match key.port {
            80 | 443 => key.host(),
            port => format!("{}:{}", key.host(), port),
        };
        groups.push((label, members));
    }

    let invalid: Vec<&SiteMap> = maps
        .iter()
        .filter(|m| SiteKey::parse(&m.url).is_err())
        .collect();
    if !invalid.is_empty() {
        groups.push(("(invalid)".to_string(), invalid));
    }
    groups
}

/// Generate a text report for a map run
pub fn generate_map_report(maps: &[SiteMap]) -> String {
    let failed = maps.iter().filter(|m| m.error.is_some()).count();
    let total_entries: usize = maps.iter().map(|m| m.entries.len()).sum();

    let mut report = String::new();
    report.push_str(DIVIDER);
    report.push_str("\n\n# Summary:\n");
    report.push_str(&format!("  Pages mapped: {}\n", maps.len() - failed));
    report.push_str(&format!("  Pages failed: {}\n", failed));
    report.push_str(&format!("  Navigation entries: {}\n", total_entries));
    report.push('\n');
    report.push_str(DIVIDER);
    report.push_str("\n\n");

    for (site, site_maps) in maps_by_site(maps) {
        report.push_str(&format!("## {}\n", site));

        for map in site_maps {
            let path = extract_url_path(&map.url);
            match &map.error {
                Some(error) => {
                    report.push_str(&format!("  {} {} {}\n", "✗".red(), path, error.dimmed()));
                }
                None => {
                    report.push_str(&format!(
                        "  {} {} ({} entries)\n",
                        "✓".green(),
                        path,
                        map.entries.len()
                    ));
                    for entry in &map.entries {
                        report.push_str(&format!("    {} → {}\n", entry.path, entry.url));
                    }
                }
            }
        }
        report.push('\n');
    }

    report
}

fn mechanism_label(mechanism: Mechanism) -> String {
    match mechanism {
        Mechanism::Get => mechanism.as_str().green().to_string(),
        Mechanism::Post => mechanism.as_str().cyan().to_string(),
        Mechanism::Ajax => mechanism.as_str().yellow().to_string(),
        Mechanism::Unknown => mechanism.as_str().dimmed().to_string(),
    }
}

/// Generate a text report for a probe run
pub fn generate_probe_report(results: &[(String, PaginationResult)]) -> String {
    let count = |mechanism: Mechanism| {
        results
            .iter()
            .filter(|(_, r)| r.mechanism == mechanism)
            .count()
    };

    let mut report = String::new();
    report.push_str(DIVIDER);
    report.push_str("\n\n# Summary:\n");
    report.push_str(&format!("  Pages probed: {}\n", results.len()));
    report.push_str(&format!(
        "  Paginated: {}\n",
        results.iter().filter(|(_, r)| r.has_pagination).count()
    ));
    report.push_str(&format!(
        "  GET: {}  POST: {}  AJAX: {}  unknown: {}\n",
        count(Mechanism::Get),
        count(Mechanism::Post),
        count(Mechanism::Ajax),
        count(Mechanism::Unknown)
    ));
    report.push('\n');
    report.push_str(DIVIDER);
    report.push_str("\n\n");

    for (url, result) in results {
        report.push_str(&format!("## {}\n", url));
        report.push_str(&format!("  Mechanism: {}\n", mechanism_label(result.mechanism)));
        for (idx, seen) in result.urls.iter().enumerate() {
            report.push_str(&format!("  {}. {}\n", idx + 1, seen));
        }
        report.push('\n');
    }

    report
}

#[derive(Serialize)]
struct MapReport<'a> {
    generated_at: String,
    sites: &'a [SiteMap],
}

#[derive(Serialize)]
struct ProbeEntry<'a> {
    url: &'a str,
    #[serde(flatten)]
    result: &'a PaginationResult,
}

#[derive(Serialize)]
struct ProbeReport<'a> {
    generated_at: String,
    results: Vec<ProbeEntry<'a>>,
}

pub fn render_map_report(maps: &[SiteMap], format: ReportFormat) -> Result<String, String> {
    match format {
        ReportFormat::Text => Ok(generate_map_report(maps)),
        ReportFormat::Json => serde_json::to_string_pretty(&MapReport {
            generated_at: generated_at(),
            sites: maps,
        })
        .map_err(|e| format!("Failed to serialize report: {}", e)),
    }
}

pub fn render_probe_report(
    results: &[(String, PaginationResult)],
    format: ReportFormat,
) -> Result<String, String> {
    match format {
        ReportFormat::Text => Ok(generate_probe_report(results)),
        ReportFormat::Json => serde_json::to_string_pretty(&ProbeReport {
            generated_at: generated_at(),
            results: results
                .iter()
                .map(|(url, result)| ProbeEntry { url, result })
                .collect(),
        })
        .map_err(|e| format!("Failed to serialize report: {}", e)),
    }
}
