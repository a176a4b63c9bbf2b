//! Normalizes RSS 2.0 and Atom syndication documents into a single
//! canonical [`Feed`] record, so consumers never branch on feed format.
//!
//! ```
//! let xml = "<rss><channel><title>Example</title></channel></rss>";
//! let feed = feednorm::parse(xml).unwrap().unwrap();
//! assert_eq!(feed.title, "Example");
//! assert!(feed.entries.is_empty());
//!
//! // Well-formed XML that is neither RSS nor Atom
//! assert_eq!(feednorm::parse("<html/>").unwrap(), None);
//! ```

pub mod config;
pub mod feed;
pub mod util;

pub use config::{Config, ConfigError};
pub use feed::{parse, Entry, Feed, FeedFormat, FeedParser, Node, ParseError};
