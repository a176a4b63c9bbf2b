//! Feed normalization: RSS 2.0 and Atom documents into one canonical record.
//!
//! The pipeline runs leaf-first through the submodules:
//!
//! - [`tree`] - XML to generic [`Node`] tree (quick-xml)
//! - [`detect`] - RSS/Atom shape predicates
//! - [`coerce`] - text, date, description and link coercion
//! - [`normalize`] - per-item and per-feed mapping to [`Feed`] / [`Entry`]
//! - [`parser`] - the [`FeedParser`] dispatcher tying them together
//!
//! # Example
//!
//! ```
//! use feednorm::feed::{parse, FeedFormat, FeedParser};
//!
//! let atom = r#"<feed xmlns="http://www.w3.org/2005/Atom">
//!   <title>Atom</title>
//!   <entry>
//!     <title>Post</title>
//!     <link rel="self" href="https://x.test/self"/>
//!     <link rel="alternate" href="https://x.test/p?utm_source=atom"/>
//!   </entry>
//! </feed>"#;
//!
//! let feed = parse(atom)?.expect("atom feed");
//! assert_eq!(feed.entries[0].link, "https://x.test/p");
//!
//! let parser = FeedParser::default();
//! let tree = parser.tree(atom)?;
//! assert_eq!(parser.detect(&tree), Some(FeedFormat::Atom));
//! # Ok::<(), feednorm::feed::ParseError>(())
//! ```

pub mod coerce;
pub mod detect;
pub mod normalize;
mod parser;
pub mod tree;
mod types;

pub use coerce::Coercer;
pub use detect::{is_atom, is_rss};
pub use normalize::{normalize_atom_item, normalize_rss_item, parse_atom, parse_rss};
pub use parser::{parse, FeedParser};
pub use tree::{Map, Node, ParseError, QuickXmlConverter, XmlConverter};
pub use types::{Entry, Feed, FeedFormat};
