//! Pure text and URL helpers consumed by the normalizers.
//!
//! Each concern is a single-method trait with a default implementation, so
//! callers can substitute their own behavior:
//!
//! - **Entity decoding**: [`EntityDecoder`] / [`HtmlEntities`]
//! - **Tag stripping**: [`TagStripper`] / [`MarkupStripper`]
//! - **Truncation**: [`Truncator`] / [`WordTruncator`]
//! - **URL purification**: [`UrlPurifier`] / [`TrackingParamPurifier`]
//!
//! # Examples
//!
//! ```
//! use feednorm::util::{strip_tags, truncate_words, TrackingParamPurifier, UrlPurifier};
//!
//! assert_eq!(strip_tags("<b>bold</b> move"), "bold move");
//! assert_eq!(truncate_words("one two three", 9, "..."), "one...");
//!
//! let purifier = TrackingParamPurifier::new();
//! assert_eq!(purifier.purify("https://x.test/?utm_source=rss"), "https://x.test/");
//! ```

mod entities;
mod text;
mod url_purifier;

pub use entities::{EntityDecoder, HtmlEntities};
pub use text::{strip_tags, truncate_words, MarkupStripper, TagStripper, Truncator, WordTruncator, ELLIPSIS};
pub use url_purifier::{TrackingParamPurifier, UrlPurifier};

/// Maximum length of an entry description, in characters
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 240;
