//! Label-path navigation maps built from reduced hierarchies.

use crate::reduce::SemanticNode;
use crate::result::NavEntry;
use crate::trie::Trie;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;
use url::Url;

pub type NodeFilter = Arc<dyn Fn(&SemanticNode) -> bool + Send + Sync>;

pub type NavigationTrie = Trie<String, NavEntry>;

static NAVIGABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://|/).*|^[^:]+$").expect("navigable URL pattern is valid")
});

/// Flattens a semantic hierarchy into label paths.
///
/// A labeled node extends the path of everything below it; it only becomes
/// an entry when it also carries a URL, so label-only nodes act as group
/// headers.
#[derive(Clone, Default)]
pub struct NavigationIndexer {
    filter: Option<NodeFilter>,
}

impl NavigationIndexer {
    pub fn new() -> Self {
        Self { filter: None }
    }

    /// Nodes rejected by `filter` add no segment and no entry. Their
    /// children are still visited.
    pub fn with_filter(mut self, filter: NodeFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn build(&self, hierarchy: &SemanticNode) -> NavigationTrie {
        self.build_forest(std::slice::from_ref(hierarchy))
    }

    /// Index several top-level nodes as siblings.
    pub fn build_forest(&self, roots: &[SemanticNode]) -> NavigationTrie {
        let mut trie = Trie::new();
        // Each stack entry owns its path so sibling branches never see each
        // other's segments.
        let mut stack: Vec<(&SemanticNode, Vec<String>)> =
            roots.iter().rev().map(|node| (node, Vec::new())).collect();

        while let Some((node, mut path)) = stack.pop() {
            let passes = self.filter.as_ref().is_none_or(|filter| filter(node));

            if passes
                && let SemanticNode::Labeled(labeled) = node
                && let Some(text) = labeled.text.as_deref().filter(|t| !t.is_empty())
            {
                path.push(text.to_string());

                if let Some(url) = labeled.url.as_deref().filter(|u| !u.is_empty()) {
                    trie.insert(
                        &path,
                        NavEntry {
                            tag: labeled.tag.clone(),
                            url: url.to_string(),
                            depth: labeled.depth,
                        },
                    );
                }
            }

            for item in node.items().iter().rev() {
                stack.push((item, path.clone()));
            }
        }

        debug!("Indexed {} navigation entries", trie.len());
        trie
    }
}

/// Normalize a candidate link against `base_url`.
///
/// Empty values, bare fragments, `javascript:;` and anything with a scheme
/// other than http(s) are rejected. Absolute http(s) URLs pass through;
/// everything else is resolved against the base.
pub fn filter_url(url: &str, base_url: &str) -> Option<String> {
    let trimmed = url.trim();
    if matches!(trimmed.to_lowercase().as_str(), "" | "#" | "javascript:;") {
        return None;
    }
    if !NAVIGABLE.is_match(trimmed) {
        return None;
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(trimmed.to_string());
    }

    let base = Url::parse(base_url).ok()?;
    base.join(trimmed).ok().map(String::from)
}

/// Flatten a navigation trie into `("Group.Item", absolute url)` pairs.
///
/// Entries whose URL is not navigable are dropped.
pub fn navigation_map(trie: &NavigationTrie, base_url: &str) -> Vec<(String, String)> {
    trie.list_all()
        .into_iter()
        .filter_map(|(path, entry)| {
            filter_url(&entry.url, base_url).map(|url| (path.join("."), url))
        })
        .collect()
}
