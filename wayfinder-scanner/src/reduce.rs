//! Collapse a parsed HTML tree into the nodes that matter for navigation.
//!
//! Every element becomes a candidate [`LabeledNode`] built from its own text
//! and attributes. Children are reduced first; the candidate is then kept,
//! replaced by a [`SemanticNode::Container`] carrying several surviving
//! branches, replaced by its only surviving child, or dropped.

use scraper::{ElementRef, Html, Node};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::debug;

/// Tag written for container nodes in serialized output.
pub const CONTAINER_TAG: &str = "__container__";

/// Labels at or above this many characters are treated as content, not navigation.
pub const DEFAULT_MAX_LABEL_CHARS: usize = 20;

const STRIPPED_TAGS: [&str; 2] = ["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledNode {
    pub tag: String,
    pub text: Option<String>,
    pub url: Option<String>,
    pub items: Vec<SemanticNode>,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticNode {
    Labeled(LabeledNode),
    /// Several branches whose common ancestor was not worth keeping.
    Container {
        items: Vec<SemanticNode>,
        depth: usize,
    },
}

impl SemanticNode {
    pub fn tag(&self) -> &str {
        match self {
            SemanticNode::Labeled(node) => &node.tag,
            SemanticNode::Container { .. } => CONTAINER_TAG,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            SemanticNode::Labeled(node) => node.text.as_deref(),
            SemanticNode::Container { .. } => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            SemanticNode::Labeled(node) => node.url.as_deref(),
            SemanticNode::Container { .. } => None,
        }
    }

    pub fn items(&self) -> &[SemanticNode] {
        match self {
            SemanticNode::Labeled(node) => &node.items,
            SemanticNode::Container { items, .. } => items,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            SemanticNode::Labeled(node) => node.depth,
            SemanticNode::Container { depth, .. } => *depth,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, SemanticNode::Container { .. })
    }
}

// Containers serialize with the sentinel tag so JSON consumers see one flat
// node shape.
impl Serialize for SemanticNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SemanticNode", 5)?;
        state.serialize_field("tag", self.tag())?;
        state.serialize_field("text", &self.text())?;
        state.serialize_field("url", &self.url())?;
        state.serialize_field("items", self.items())?;
        state.serialize_field("depth", &self.depth())?;
        state.end()
    }
}

/// Decides what an element contributes and whether a candidate is kept.
///
/// Every method has the stock behavior as its default, so an implementation
/// only overrides the part it cares about.
pub trait ReductionRules {
    fn extract_text(&self, element: ElementRef<'_>) -> Option<String> {
        leading_text(element).or_else(|| attr(element, "title"))
    }

    fn extract_url(&self, element: ElementRef<'_>) -> Option<String> {
        attr(element, "href").or_else(|| attr(element, "data-url"))
    }

    fn is_kept(&self, node: &LabeledNode) -> bool {
        has_short_label(node, DEFAULT_MAX_LABEL_CHARS)
            && (node.url.is_some() || !node.items.is_empty())
    }
}

/// Stock rules with a configurable label length limit.
#[derive(Debug, Clone)]
pub struct DefaultRules {
    max_label_chars: usize,
}

impl DefaultRules {
    pub fn new() -> Self {
        Self {
            max_label_chars: DEFAULT_MAX_LABEL_CHARS,
        }
    }

    pub fn with_max_label_chars(mut self, max_label_chars: usize) -> Self {
        self.max_label_chars = max_label_chars;
        self
    }
}

impl Default for DefaultRules {
    fn default() -> Self {
        Self::new()
    }
}

impl ReductionRules for DefaultRules {
    fn is_kept(&self, node: &LabeledNode) -> bool {
        has_short_label(node, self.max_label_chars)
            && (node.url.is_some() || !node.items.is_empty())
    }
}

/// True when the node has a non-blank label shorter than `max_chars`.
pub fn has_short_label(node: &LabeledNode, max_chars: usize) -> bool {
    node.text
        .as_deref()
        .map(str::trim)
        .is_some_and(|text| !text.is_empty() && text.chars().count() < max_chars)
}

/// Trimmed attribute value, `None` when missing or blank.
pub fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Text that appears directly inside `element` before its first child element.
pub fn leading_text(element: ElementRef<'_>) -> Option<String> {
    let mut out = String::new();
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(_) => break,
            _ => {}
        }
    }

    let trimmed = out.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn is_stripped(element: ElementRef<'_>) -> bool {
    STRIPPED_TAGS.contains(&element.value().name())
}

struct Frame<'a> {
    node: LabeledNode,
    pending: std::vec::IntoIter<ElementRef<'a>>,
}

pub struct DomReducer<R = DefaultRules> {
    rules: R,
}

impl DomReducer<DefaultRules> {
    pub fn new() -> Self {
        Self {
            rules: DefaultRules::new(),
        }
    }
}

impl Default for DomReducer<DefaultRules> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ReductionRules> DomReducer<R> {
    pub fn with_rules(rules: R) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Parse `html` as a full document and reduce from its root element.
    pub fn reduce_html(&self, html: &str) -> Option<SemanticNode> {
        let document = Html::parse_document(html);
        let reduced = self.reduce(document.root_element());
        debug!(
            "Reduced {} bytes of HTML to {}",
            html.len(),
            if reduced.is_some() { "a hierarchy" } else { "nothing" }
        );
        reduced
    }

    /// Reduce the tree under `root`. `None` means nothing worth keeping.
    ///
    /// The walk is post-order over an explicit stack, so deeply nested
    /// markup cannot exhaust the call stack.
    pub fn reduce(&self, root: ElementRef<'_>) -> Option<SemanticNode> {
        if is_stripped(root) {
            return None;
        }

        let mut stack = vec![self.open(root, 0)];
        loop {
            let frame = stack.last_mut()?;
            if let Some(child) = frame.pending.next() {
                if !is_stripped(child) {
                    let depth = frame.node.depth + 1;
                    stack.push(self.open(child, depth));
                }
                continue;
            }

            let finished = stack.pop()?;
            let reduced = self.close(finished.node);
            match stack.last_mut() {
                Some(parent) => parent.node.items.extend(reduced),
                None => return reduced,
            }
        }
    }

    fn open<'a>(&self, element: ElementRef<'a>, depth: usize) -> Frame<'a> {
        let pending: Vec<ElementRef<'a>> = element.children().filter_map(ElementRef::wrap).collect();

        Frame {
            node: LabeledNode {
                tag: element.value().name().to_string(),
                text: self.rules.extract_text(element),
                url: self.rules.extract_url(element),
                items: Vec::new(),
                depth,
            },
            pending: pending.into_iter(),
        }
    }

    fn close(&self, mut node: LabeledNode) -> Option<SemanticNode> {
        merge_container_pair(&mut node.items);

        if self.rules.is_kept(&node) {
            return Some(SemanticNode::Labeled(node));
        }

        match node.items.len() {
            0 => None,
            1 => node.items.pop(),
            _ => Some(SemanticNode::Container {
                items: node.items,
                depth: node.depth,
            }),
        }
    }
}

/// Fold a container into its labeled sibling when they are the only two items.
///
/// Wrapper elements with no label of their own otherwise leave a grouping
/// layer between a menu header and its entries. Three or more items are
/// left alone.
fn merge_container_pair(items: &mut Vec<SemanticNode>) {
    if items.len() != 2 {
        return;
    }

    let container_idx = match (&items[0], &items[1]) {
        (SemanticNode::Container { .. }, SemanticNode::Labeled(_)) => 0,
        (SemanticNode::Labeled(_), SemanticNode::Container { .. }) => 1,
        _ => return,
    };

    let container = items.remove(container_idx);
    if let (SemanticNode::Container { items: extra, .. }, Some(SemanticNode::Labeled(kept))) =
        (container, items.first_mut())
    {
        kept.items.extend(extra);
    }
}
