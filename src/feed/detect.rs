use super::tree::Node;
use super::types::FeedFormat;

/// `<rss>` root wrapping a `<channel>`.
pub fn is_rss(doc: &Node) -> bool {
    doc.get("rss")
        .and_then(Node::as_map)
        .is_some_and(|rss| rss.contains_key("channel"))
}

/// `<feed>` root shaped as an Atom feed.
///
/// A `feed` element with attributes or children is accepted even when it has
/// no `<entry>`, so an empty Atom feed still normalizes (to zero entries).
pub fn is_atom(doc: &Node) -> bool {
    doc.get("feed").and_then(Node::as_map).is_some()
}

/// Runs the detectors in priority order: RSS first, then Atom.
pub fn detect(doc: &Node) -> Option<FeedFormat> {
    if is_rss(doc) {
        Some(FeedFormat::Rss)
    } else if is_atom(doc) {
        Some(FeedFormat::Atom)
    } else {
        None
    }
}
