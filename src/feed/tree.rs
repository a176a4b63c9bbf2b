//! Generic tree produced from raw XML before any feed-specific normalization.
//!
//! The tree mirrors the loose "XML as nested objects" convention: attributes
//! become `@_`-prefixed keys, text content either becomes the node itself or
//! lives under `#text`, and repeated siblings collapse into a list.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use thiserror::Error;

/// Key prefix applied to attribute names.
pub const ATTRIBUTE_PREFIX: &str = "@_";
/// Key holding the text content of an element that also has attributes or children.
pub const TEXT_KEY: &str = "#text";

/// Errors raised while converting XML into a [`Node`] tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// quick-xml rejected the document (mismatched tags, bad attribute syntax, ...).
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document ended while an element was still open.
    #[error("Unexpected end of document: element <{0}> is not closed")]
    UnclosedElement(String),
}

/// A node of the generic tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Map(Map),
    List(Vec<Node>),
}

/// Ordered mapping from element/attribute names to child nodes.
///
/// Insertion order is kept so that serialized trees read like the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Map {
    entries: Vec<(String, Node)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Inserts a child, turning a repeated key into a [`Node::List`].
    pub fn append(&mut self, key: impl Into<String>, value: Node) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, Node::List(items))) => items.push(value),
            Some((_, existing)) => {
                let first = std::mem::replace(existing, Node::List(Vec::new()));
                *existing = Node::List(vec![first, value]);
            }
            None => self.entries.push((key, value)),
        }
    }
}

impl Serialize for Map {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.append(k, v);
        }
        map
    }
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up `key` when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|m| m.get(key))
    }
}

/// Converts raw XML text into a generic [`Node`] tree.
pub trait XmlConverter: Send + Sync {
    fn convert(&self, xml: &str) -> Result<Node, ParseError>;
}

/// Default converter built on quick-xml's pull parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuickXmlConverter;

/// An element that has been opened but not yet closed.
struct Frame {
    name: String,
    children: Map,
    text: String,
}

impl Frame {
    fn open(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Self, ParseError> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut children = Map::new();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref());
            let value = match attr.decode_and_unescape_value(reader.decoder()) {
                Ok(v) => v.into_owned(),
                Err(err) => {
                    tracing::debug!(attribute = %key, error = %err, "Keeping raw attribute value");
                    String::from_utf8_lossy(&attr.value).into_owned()
                }
            };
            children.append(format!("{ATTRIBUTE_PREFIX}{key}"), Node::Text(value));
        }
        Ok(Self {
            name,
            children,
            text: String::new(),
        })
    }

    /// Text runs are joined untrimmed while the element is open; only the
    /// outer whitespace of the joined text is dropped here.
    fn close(self) -> (String, Node) {
        let text = self.text.trim();
        if self.children.is_empty() {
            return (self.name, Node::text(text));
        }
        let mut children = self.children;
        if !text.is_empty() {
            children.append(TEXT_KEY, Node::text(text));
        }
        (self.name, Node::Map(children))
    }
}

impl XmlConverter for QuickXmlConverter {
    fn convert(&self, xml: &str) -> Result<Node, ParseError> {
        // SEC-002: quick-xml (0.37) never expands <!ENTITY> declarations; only the five
        // XML builtins and numeric references are resolved here.
        let mut reader = Reader::from_str(xml);

        let mut root = Map::new();
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let frame = Frame::open(&e, &reader)?;
                    stack.push(frame);
                }
                Event::Empty(e) => {
                    let (name, node) = Frame::open(&e, &reader)?.close();
                    attach(&mut stack, &mut root, name, node);
                }
                Event::End(_) => {
                    // quick-xml checks end names, so the top frame is the one being closed.
                    if let Some(frame) = stack.pop() {
                        let (name, node) = frame.close();
                        attach(&mut stack, &mut root, name, node);
                    }
                }
                Event::Text(e) => {
                    if let Some(frame) = stack.last_mut() {
                        let text: Cow<'_, str> = match e.unescape() {
                            Ok(t) => t,
                            Err(err) => {
                                tracing::debug!(element = %frame.name, error = %err, "Keeping raw text");
                                String::from_utf8_lossy(&e).into_owned().into()
                            }
                        };
                        frame.text.push_str(&text);
                    }
                }
                Event::CData(e) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(frame) = stack.pop() {
            return Err(ParseError::UnclosedElement(frame.name));
        }

        Ok(Node::Map(root))
    }
}

fn attach(stack: &mut [Frame], root: &mut Map, name: String, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.append(name, node),
        None => root.append(name, node),
    }
}
