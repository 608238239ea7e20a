pub mod driver;
pub mod error;
pub mod http;
pub mod navigation;
pub mod pagination;
pub mod reduce;
pub mod result;
pub mod trie;

pub use driver::{BrowserContext, Page, WaitUntil};
pub use error::{ProbeError, ScanError};
pub use http::{HttpBrowser, HttpPage};
pub use navigation::{NavigationIndexer, NavigationTrie, filter_url, navigation_map};
pub use pagination::{PaginationProber, ProbeConfig, default_next_selectors};
pub use reduce::{DefaultRules, DomReducer, LabeledNode, ReductionRules, SemanticNode};
pub use result::{Mechanism, NavEntry, PaginationResult};
pub use trie::Trie;
