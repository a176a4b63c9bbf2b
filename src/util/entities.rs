use std::borrow::Cow;

/// Decodes HTML/XML character references into literal characters.
pub trait EntityDecoder: Send + Sync {
    fn decode<'a>(&self, s: &'a str) -> Cow<'a, str>;
}

/// Default [`EntityDecoder`] backed by the `html-escape` tables
/// (named references plus decimal and hex numeric references).
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlEntities;

impl EntityDecoder for HtmlEntities {
    fn decode<'a>(&self, s: &'a str) -> Cow<'a, str> {
        if !s.contains('&') {
            return Cow::Borrowed(s);
        }
        html_escape::decode_html_entities(s)
    }
}
