use super::coerce::Coercer;
use super::detect::detect;
use super::normalize::{parse_atom, parse_rss};
use super::tree::{Node, ParseError, QuickXmlConverter, XmlConverter};
use super::types::{Feed, FeedFormat};
use crate::config::Config;
use crate::util::{EntityDecoder, TagStripper, TrackingParamPurifier, Truncator, UrlPurifier, WordTruncator};

/// Entry point: converts a document, detects its dialect and normalizes it.
///
/// A parser holds no per-call state and is `Send + Sync`, so one instance
/// can serve any number of threads.
///
/// # Examples
///
/// ```
/// use feednorm::FeedParser;
///
/// let xml = r#"<rss version="2.0"><channel><title>Example</title>
///     <item><title>A &amp; B</title><pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate></item>
///     </channel></rss>"#;
/// let feed = FeedParser::default().parse(xml).unwrap().unwrap();
/// assert_eq!(feed.title, "Example");
/// assert_eq!(feed.entries[0].title, "A & B");
/// assert_eq!(feed.entries[0].published, "2024-01-01T00:00:00.000Z");
/// ```
pub struct FeedParser {
    converter: Box<dyn XmlConverter>,
    coercer: Coercer,
}

impl Default for FeedParser {
    fn default() -> Self {
        Self {
            converter: Box::new(QuickXmlConverter),
            coercer: Coercer::default(),
        }
    }
}

impl std::fmt::Debug for FeedParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedParser")
            .field("coercer", &self.coercer)
            .finish_non_exhaustive()
    }
}

impl FeedParser {
    /// Builds a parser with the limits and purification rules from `config`.
    pub fn from_config(config: &Config) -> Self {
        let purifier = TrackingParamPurifier::new()
            .with_extra_params(config.extra_tracking_params.iter().cloned())
            .strip_fragment(config.strip_fragments);

        Self::default()
            .with_purifier(purifier)
            .with_truncator(WordTruncator::new(config.ellipsis.clone()))
            .with_description_limit(config.description_limit)
    }

    pub fn with_converter(mut self, converter: impl XmlConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn with_decoder(mut self, decoder: impl EntityDecoder + 'static) -> Self {
        self.coercer.set_decoder(Box::new(decoder));
        self
    }

    pub fn with_stripper(mut self, stripper: impl TagStripper + 'static) -> Self {
        self.coercer.set_stripper(Box::new(stripper));
        self
    }

    pub fn with_truncator(mut self, truncator: impl Truncator + 'static) -> Self {
        self.coercer.set_truncator(Box::new(truncator));
        self
    }

    pub fn with_purifier(mut self, purifier: impl UrlPurifier + 'static) -> Self {
        self.coercer.set_purifier(Box::new(purifier));
        self
    }

    /// Maximum entry description length, in characters.
    pub fn with_description_limit(mut self, limit: usize) -> Self {
        self.coercer.set_description_limit(limit);
        self
    }

    pub fn coercer(&self) -> &Coercer {
        &self.coercer
    }

    /// Converts raw XML into the generic tree without normalizing it.
    pub fn tree(&self, xml: &str) -> Result<Node, ParseError> {
        self.converter.convert(xml)
    }

    /// Parses and normalizes a feed document.
    ///
    /// Returns `Ok(None)` when the XML is well formed but neither RSS nor Atom.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] only when the XML itself cannot be converted.
    pub fn parse(&self, xml: &str) -> Result<Option<Feed>, ParseError> {
        let doc = self.tree(xml)?;
        Ok(self.parse_tree(&doc))
    }

    /// Normalizes an already converted tree.
    pub fn parse_tree(&self, doc: &Node) -> Option<Feed> {
        let format = detect(doc)?;
        let feed = match format {
            FeedFormat::Rss => parse_rss(&self.coercer, doc),
            FeedFormat::Atom => parse_atom(&self.coercer, doc),
        };
        tracing::debug!(%format, entries = feed.entries.len(), "Normalized feed");
        Some(feed)
    }

    /// Reports which dialect a tree would be normalized as.
    pub fn detect(&self, doc: &Node) -> Option<FeedFormat> {
        detect(doc)
    }
}

/// Parses `xml` with a default [`FeedParser`].
pub fn parse(xml: &str) -> Result<Option<Feed>, ParseError> {
    FeedParser::default().parse(xml)
}
