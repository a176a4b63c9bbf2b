//! Value coercers: turn raw tree nodes into canonical scalar strings.
//!
//! All coercers are total. Absent or oddly shaped input yields an empty
//! string, never an error.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::tree::Node;
use crate::util::{
    EntityDecoder, HtmlEntities, MarkupStripper, TagStripper, TrackingParamPurifier, Truncator,
    UrlPurifier, WordTruncator, DEFAULT_DESCRIPTION_LIMIT,
};

/// Keys that carry an element's text under the various XML-to-object conventions,
/// in priority order.
const TEXT_KEYS: &[&str] = &["_text", "#text", "_cdata", "$t"];

/// Keys that carry a link target, in priority order.
const HREF_KEYS: &[&str] = &["href", "@_href"];

/// Keys that carry a link relation.
const REL_KEYS: &[&str] = &["rel", "@_rel"];

/// Container of nested attributes used by some converters (`{_attributes: {href: ..}}`).
const ATTRIBUTES_KEY: &str = "_attributes";

const ALTERNATE: &str = "alternate";

/// Output format for normalized timestamps (millisecond precision, UTC designator).
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Offset-less date-time layouts, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Date-time layouts with a numeric offset that RFC 3339 rejects (`+0000`).
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%z",
];

/// Applies the text, date, description and link coercions using the
/// injected decoding/stripping/truncation/purification collaborators.
pub struct Coercer {
    decoder: Box<dyn EntityDecoder>,
    stripper: Box<dyn TagStripper>,
    truncator: Box<dyn Truncator>,
    purifier: Box<dyn UrlPurifier>,
    description_limit: usize,
}

impl Default for Coercer {
    fn default() -> Self {
        Self {
            decoder: Box::new(HtmlEntities),
            stripper: Box::new(MarkupStripper),
            truncator: Box::new(WordTruncator::default()),
            purifier: Box::new(TrackingParamPurifier::new()),
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
        }
    }
}

impl std::fmt::Debug for Coercer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coercer")
            .field("description_limit", &self.description_limit)
            .finish_non_exhaustive()
    }
}

impl Coercer {
    pub(crate) fn set_decoder(&mut self, decoder: Box<dyn EntityDecoder>) {
        self.decoder = decoder;
    }

    pub(crate) fn set_stripper(&mut self, stripper: Box<dyn TagStripper>) {
        self.stripper = stripper;
    }

    pub(crate) fn set_truncator(&mut self, truncator: Box<dyn Truncator>) {
        self.truncator = truncator;
    }

    pub(crate) fn set_purifier(&mut self, purifier: Box<dyn UrlPurifier>) {
        self.purifier = purifier;
    }

    pub(crate) fn set_description_limit(&mut self, limit: usize) {
        self.description_limit = limit;
    }

    pub fn description_limit(&self) -> usize {
        self.description_limit
    }

    /// Extracts trimmed, entity-decoded text from a node.
    ///
    /// Mappings are searched for the known text keys; a list yields the text
    /// of its first element.
    pub fn to_text(&self, raw: Option<&Node>) -> String {
        let text = match raw {
            Some(Node::Text(s)) => s.as_str(),
            Some(Node::Map(map)) => TEXT_KEYS
                .iter()
                .filter_map(|key| map.get(key).and_then(Node::as_str))
                .find(|s| !s.is_empty())
                .unwrap_or(""),
            Some(Node::List(items)) => return self.to_text(items.first()),
            None => "",
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return String::new();
        }
        self.decoder.decode(trimmed).trim().to_string()
    }

    /// Normalizes a date string to `YYYY-MM-DDTHH:MM:SS.mmmZ`, or `""` if it cannot be parsed.
    pub fn to_date(&self, raw: &str) -> String {
        parse_date(raw)
            .map(|dt| dt.format(ISO_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// Text with markup removed, bounded to the description limit.
    pub fn to_desc(&self, raw: Option<&Node>) -> String {
        let text = self.to_text(raw);
        let stripped = self.stripper.strip(&text);
        self.truncator
            .truncate(&stripped, self.description_limit)
            .into_owned()
    }

    /// Resolves a link target from a plain string, an href-bearing mapping,
    /// or a list of Atom `<link>` elements (preferring `rel="alternate"`).
    ///
    /// The result is not purified; see [`Coercer::purify`].
    pub fn to_link(&self, raw: Option<&Node>) -> String {
        match raw {
            None => String::new(),
            Some(Node::Text(_)) => self.to_text(raw),
            Some(Node::Map(map)) => {
                if let Some(href) = HREF_KEYS.iter().find_map(|key| map.get(key)) {
                    return self.to_text(Some(href));
                }
                if let Some(attrs) = map.get(ATTRIBUTES_KEY) {
                    return self.to_text(attrs.get("href"));
                }
                self.to_text(raw)
            }
            Some(Node::List(links)) => self.to_link(pick_link(links)),
        }
    }

    pub fn purify(&self, url: &str) -> String {
        self.purifier.purify(url)
    }
}

/// Picks the `rel="alternate"` link, falling back to the first link without a
/// `rel` (Atom's implicit alternate), then to the first link.
fn pick_link(links: &[Node]) -> Option<&Node> {
    links
        .iter()
        .find(|l| rel_of(l).is_some_and(|rel| rel.trim() == ALTERNATE))
        .or_else(|| links.iter().find(|l| rel_of(l).is_none()))
        .or_else(|| links.first())
}

fn rel_of(link: &Node) -> Option<&str> {
    REL_KEYS
        .iter()
        .find_map(|key| link.get(key))
        .or_else(|| link.get(ATTRIBUTES_KEY).and_then(|attrs| attrs.get("rel")))
        .and_then(Node::as_str)
}

/// Tries the date layouts found in feeds: RFC 2822 (RSS), RFC 3339 (Atom),
/// and a few ISO-8601 variants. Years outside `0..=9999` have no plain
/// ISO-8601 rendering and are rejected.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    parse_any_date(raw).filter(|dt| (0..=9999).contains(&dt.year()))
}

fn parse_any_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(dt) = parse_rfc2822(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// RFC 2822 with the usual feed sloppiness: a `UTC`/`Z` zone, a `+hh:mm`
/// offset, a single-digit hour, or a weekday that does not match the date.
fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    let repaired = repair_rfc2822(s);
    if let Ok(dt) = DateTime::parse_from_rfc2822(&repaired) {
        return Some(dt.with_timezone(&Utc));
    }
    let (_, without_weekday) = repaired.split_once(',')?;
    DateTime::parse_from_rfc2822(without_weekday.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn repair_rfc2822(s: &str) -> String {
    s.split_whitespace()
        .map(|token| match token {
            "UTC" | "Z" => "+0000".to_string(),
            _ if is_colon_offset(token) => token.replacen(':', "", 1),
            _ if is_short_hour(token) => format!("0{token}"),
            _ => token.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `+hh:mm` / `-hh:mm`
fn is_colon_offset(token: &str) -> bool {
    let b = token.as_bytes();
    b.len() == 6
        && matches!(b[0], b'+' | b'-')
        && b[3] == b':'
        && [1, 2, 4, 5].iter().all(|&i| b[i].is_ascii_digit())
}

/// `h:mm` or `h:mm:ss`
fn is_short_hour(token: &str) -> bool {
    let mut parts = token.split(':');
    let hour_ok = parts
        .next()
        .is_some_and(|h| h.len() == 1 && h.as_bytes()[0].is_ascii_digit());
    let rest: Vec<&str> = parts.collect();
    hour_ok
        && (1..=2).contains(&rest.len())
        && rest
            .iter()
            .all(|p| p.len() == 2 && p.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tree::Map;

    fn map(pairs: &[(&str, Node)]) -> Node {
        Node::Map(pairs.iter().map(|(k, v)| (*k, v.clone())).collect())
    }

    #[test]
    fn test_to_text_plain_string() {
        let c = Coercer::default();
        assert_eq!(c.to_text(Some(&Node::text("  A &amp; B  "))), "A & B");
    }

    #[test]
    fn test_to_text_absent_and_empty() {
        let c = Coercer::default();
        assert_eq!(c.to_text(None), "");
        assert_eq!(c.to_text(Some(&Node::text("   "))), "");
        assert_eq!(c.to_text(Some(&Node::Map(Map::new()))), "");
    }

    #[test]
    fn test_to_text_text_key_variants() {
        let c = Coercer::default();
        for key in ["_text", "#text", "_cdata", "$t"] {
            let node = map(&[("@_type", Node::text("html")), (key, Node::text("Hi"))]);
            assert_eq!(c.to_text(Some(&node)), "Hi", "key {key}");
        }
    }

    #[test]
    fn test_to_text_key_priority() {
        let c = Coercer::default();
        let node = map(&[("$t", Node::text("last")), ("#text", Node::text("first"))]);
        assert_eq!(c.to_text(Some(&node)), "first");
        // An empty higher-priority key falls through, like a falsy value.
        let node = map(&[("_text", Node::text("")), ("_cdata", Node::text("cdata"))]);
        assert_eq!(c.to_text(Some(&node)), "cdata");
    }

    #[test]
    fn test_to_text_list_uses_first() {
        let c = Coercer::default();
        let node = Node::List(vec![Node::text("one"), Node::text("two")]);
        assert_eq!(c.to_text(Some(&node)), "one");
    }

    #[test]
    fn test_to_date_rfc2822() {
        let c = Coercer::default();
        assert_eq!(
            c.to_date("Mon, 01 Jan 2024 00:00:00 GMT"),
            "2024-01-01T00:00:00.000Z"
        );
        assert_eq!(
            c.to_date("Tue, 02 Jan 2024 10:30:00 +0200"),
            "2024-01-02T08:30:00.000Z"
        );
        assert_eq!(
            c.to_date("Wed, 03 Jan 2024 12:00:00 EST"),
            "2024-01-03T17:00:00.000Z"
        );
    }

    #[test]
    fn test_to_date_rfc2822_sloppy() {
        let c = Coercer::default();
        // Wrong weekday (2024-01-01 was a Monday)
        assert_eq!(
            c.to_date("Fri, 01 Jan 2024 00:00:00 GMT"),
            "2024-01-01T00:00:00.000Z"
        );
        assert_eq!(
            c.to_date("Mon, 01 Jan 2024 00:00:00 UTC"),
            "2024-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn test_to_date_rfc2822_colon_offset_and_short_hour() {
        let c = Coercer::default();
        assert_eq!(
            c.to_date("Mon, 01 Jan 2024 00:00:00 +00:00"),
            "2024-01-01T00:00:00.000Z"
        );
        assert_eq!(
            c.to_date("Mon, 01 Jan 2024 12:30:00 -05:30"),
            "2024-01-01T18:00:00.000Z"
        );
        assert_eq!(
            c.to_date("Mon, 1 Jan 2024 0:00:00 GMT"),
            "2024-01-01T00:00:00.000Z"
        );
        assert_eq!(c.to_date("Mon, 1 Jan 2024 9:05 GMT"), "2024-01-01T09:05:00.000Z");
    }

    #[test]
    fn test_to_date_rejects_years_without_iso_form() {
        let c = Coercer::default();
        assert_eq!(c.to_date("-0001-01-01"), "");
        assert_eq!(c.to_date("+10000-01-01T00:00:00Z"), "");
        assert_eq!(c.to_date("0001-01-01"), "0001-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_to_date_iso_variants() {
        let c = Coercer::default();
        assert_eq!(c.to_date("2024-03-05T07:08:09Z"), "2024-03-05T07:08:09.000Z");
        assert_eq!(
            c.to_date("2024-03-05T07:08:09.123456+01:00"),
            "2024-03-05T06:08:09.123Z"
        );
        assert_eq!(c.to_date("2024-03-05T07:08:09+0000"), "2024-03-05T07:08:09.000Z");
        assert_eq!(c.to_date("2024-03-05T07:08:09"), "2024-03-05T07:08:09.000Z");
        assert_eq!(c.to_date("2024-03-05"), "2024-03-05T00:00:00.000Z");
    }

    #[test]
    fn test_to_date_total() {
        let c = Coercer::default();
        assert_eq!(c.to_date(""), "");
        assert_eq!(c.to_date("   "), "");
        assert_eq!(c.to_date("yesterday-ish"), "");
        assert_eq!(c.to_date("2024-13-45"), "");
        assert_eq!(c.to_date(","), "");
    }

    #[test]
    fn test_to_desc_strips_and_truncates() {
        let c = Coercer::default();
        let long = format!("<p>{}</p>", "word ".repeat(100));
        let desc = c.to_desc(Some(&Node::text(long)));
        assert!(desc.chars().count() <= DEFAULT_DESCRIPTION_LIMIT);
        assert!(desc.ends_with("..."));
        assert!(!desc.contains('<'));
    }

    #[test]
    fn test_to_desc_decodes_before_stripping() {
        let c = Coercer::default();
        let node = Node::text("&lt;b&gt;Bold&lt;/b&gt; &amp; plain");
        assert_eq!(c.to_desc(Some(&node)), "Bold & plain");
    }

    #[test]
    fn test_to_link_shapes_agree() {
        let c = Coercer::default();
        let url = "https://x.test/p";
        let shapes = [
            Node::text(url),
            map(&[("href", Node::text(url))]),
            map(&[("@_href", Node::text(url))]),
            map(&[("_attributes", map(&[("href", Node::text(url))]))]),
            Node::List(vec![map(&[("@_href", Node::text(url))])]),
            Node::List(vec![
                map(&[("@_rel", Node::text("self")), ("@_href", Node::text("https://x.test/feed"))]),
                map(&[("@_rel", Node::text("alternate")), ("@_href", Node::text(url))]),
            ]),
        ];
        for shape in &shapes {
            assert_eq!(c.purify(&c.to_link(Some(shape))), url, "shape {shape:?}");
        }
    }

    #[test]
    fn test_to_link_implicit_alternate() {
        let c = Coercer::default();
        let links = Node::List(vec![
            map(&[("@_rel", Node::text("self")), ("@_href", Node::text("https://x.test/feed"))]),
            map(&[("@_href", Node::text("https://x.test/"))]),
        ]);
        assert_eq!(c.to_link(Some(&links)), "https://x.test/");
    }

    #[test]
    fn test_to_link_absent() {
        let c = Coercer::default();
        assert_eq!(c.to_link(None), "");
        assert_eq!(c.to_link(Some(&Node::List(vec![]))), "");
    }
}
