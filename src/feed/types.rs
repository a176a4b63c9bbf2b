use serde::{Deserialize, Serialize};

use super::tree::Node;

/// Format-agnostic feed record produced by [`FeedParser::parse`](super::FeedParser::parse).
///
/// Every text field is decoded and trimmed; fields missing from the source
/// document are empty strings, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub title: String,
    /// Canonical URL of the feed's site, already purified.
    pub link: String,
    pub description: String,
    pub generator: String,
    pub language: String,
    /// Last build/update time as `YYYY-MM-DDTHH:MM:SS.mmmZ`, or empty.
    pub published: String,
    /// Items in document order.
    pub entries: Vec<Entry>,
}

/// A single feed item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub title: String,
    pub link: String,
    /// Summary with markup removed, bounded to the configured limit.
    pub description: String,
    pub published: String,
}

/// Feed dialect recognised by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    Rss,
    Atom,
}

impl std::fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedFormat::Rss => f.write_str("rss"),
            FeedFormat::Atom => f.write_str("atom"),
        }
    }
}

/// An item container as found in the tree: one element, or several siblings.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Items<'a> {
    Single(&'a Node),
    Many(&'a [Node]),
}

impl<'a> Items<'a> {
    /// Classifies `item`/`entry` children; `None` when the container is absent.
    pub(crate) fn from_node(node: Option<&'a Node>) -> Option<Self> {
        match node? {
            Node::List(items) => Some(Items::Many(items)),
            single => Some(Items::Single(single)),
        }
    }

    pub(crate) fn as_slice(&self) -> &'a [Node] {
        match *self {
            Items::Single(node) => std::slice::from_ref(node),
            Items::Many(items) => items,
        }
    }
}
