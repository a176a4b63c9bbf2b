//! Mapping from RSS/Atom tree shapes to the canonical [`Feed`] and [`Entry`].
//!
//! Each field read supplies its own default: an absent element becomes an
//! empty string and an absent item container becomes an empty entry list.

use super::coerce::Coercer;
use super::tree::{Node, ATTRIBUTE_PREFIX};
use super::types::{Entry, Feed, Items};

/// Normalizes one RSS `<item>`.
pub fn normalize_rss_item(c: &Coercer, item: &Node) -> Entry {
    Entry {
        title: c.to_text(item.get("title")),
        link: c.purify(&c.to_link(item.get("link"))),
        description: c.to_desc(item.get("description")),
        published: c.to_date(&c.to_text(item.get("pubDate"))),
    }
}

/// Normalizes one Atom `<entry>`.
pub fn normalize_atom_item(c: &Coercer, entry: &Node) -> Entry {
    Entry {
        title: c.to_text(entry.get("title")),
        link: c.purify(&c.to_link(entry.get("link"))),
        description: c.to_desc(first_present(entry, &["summary", "description", "content"])),
        published: c.to_date(&c.to_text(first_present(entry, &["updated", "published"]))),
    }
}

/// Normalizes `rss.channel` into a [`Feed`].
pub fn parse_rss(c: &Coercer, doc: &Node) -> Feed {
    let channel = doc.get("rss").and_then(|rss| rss.get("channel"));
    let field = |name: &str| channel.and_then(|ch| ch.get(name));

    Feed {
        title: c.to_text(field("title")),
        link: c.purify(&c.to_link(field("link"))),
        description: c.to_text(field("description")),
        generator: c.to_text(field("generator")),
        language: c.to_text(field("language")),
        published: c.to_date(&c.to_text(field("lastBuildDate"))),
        entries: normalize_items(c, field("item"), normalize_rss_item),
    }
}

/// Normalizes the `feed` root into a [`Feed`].
///
/// The feed description is the subtitle as text; only entry descriptions are
/// stripped and truncated.
pub fn parse_atom(c: &Coercer, doc: &Node) -> Feed {
    let feed = doc.get("feed");
    let field = |name: &str| feed.and_then(|f| f.get(name));

    let language = match c.to_text(field("language")) {
        lang if lang.is_empty() => c.to_text(field(&format!("{ATTRIBUTE_PREFIX}xml:lang"))),
        lang => lang,
    };

    Feed {
        title: c.to_text(field("title")),
        link: c.purify(&c.to_link(field("link"))),
        description: c.to_text(field("subtitle")),
        generator: c.to_text(field("generator")),
        language,
        published: c.to_date(&c.to_text(field("updated"))),
        entries: normalize_items(c, field("entry"), normalize_atom_item),
    }
}

fn normalize_items(
    c: &Coercer,
    container: Option<&Node>,
    normalize: fn(&Coercer, &Node) -> Entry,
) -> Vec<Entry> {
    match Items::from_node(container) {
        Some(items) => items.as_slice().iter().map(|item| normalize(c, item)).collect(),
        None => Vec::new(),
    }
}

/// First child among `keys` that holds something other than empty text.
fn first_present<'a>(node: &'a Node, keys: &[&str]) -> Option<&'a Node> {
    keys.iter()
        .filter_map(|key| node.get(key))
        .find(|child| !matches!(child, Node::Text(s) if s.trim().is_empty()))
}
