use serde::{Deserialize, Serialize};
use std::fmt;

/// How a listing page advances to its next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mechanism {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
    #[serde(rename = "AJAX")]
    Ajax,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Mechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mechanism::Get => "GET",
            Mechanism::Post => "POST",
            Mechanism::Ajax => "AJAX",
            Mechanism::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResult {
    pub has_pagination: bool,
    pub mechanism: Mechanism,
    pub urls: Vec<String>,
}

impl PaginationResult {
    /// Derive the verdict from the URLs observed while probing.
    ///
    /// `urls[0]` is the page as loaded; every later entry is the URL seen
    /// after one successful click on a "next" control.
    pub fn classify(urls: Vec<String>) -> Self {
        let mechanism = match urls.as_slice() {
            [] | [_] => Mechanism::Unknown,
            [first, .., last] if first != last => Mechanism::Get,
            [_, _] => Mechanism::Post,
            _ => Mechanism::Ajax,
        };

        Self {
            has_pagination: mechanism != Mechanism::Unknown,
            mechanism,
            urls,
        }
    }

    /// Result for a page that could not even be loaded.
    pub fn unreachable(url: String) -> Self {
        Self {
            has_pagination: false,
            mechanism: Mechanism::Unknown,
            urls: vec![url],
        }
    }
}

/// Value stored in a navigation trie for every label path that ends in a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    pub tag: String,
    pub url: String,
    pub depth: usize,
}
