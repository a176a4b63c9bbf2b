use url::Url;

/// Query parameters that only carry click/campaign tracking data.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "dclid", "msclkid", "mc_cid", "mc_eid", "igshid", "yclid", "_hsenc",
    "_hsmi", "ref_src",
];

/// Prefix shared by the Google Analytics campaign parameters (`utm_source`, ...).
const TRACKING_PREFIX: &str = "utm_";

/// Cleans up a link before it is placed in a canonical record.
///
/// Implementations must be idempotent: purifying an already purified URL
/// returns it unchanged.
pub trait UrlPurifier: Send + Sync {
    fn purify(&self, url: &str) -> String;
}

/// Default [`UrlPurifier`]: strips tracking query parameters and normalizes
/// the URL's serialized form.
///
/// Input that is not an absolute URL (relative paths, garbage) is only
/// trimmed, never rejected.
#[derive(Debug, Clone, Default)]
pub struct TrackingParamPurifier {
    extra_params: Vec<String>,
    strip_fragment: bool,
}

impl TrackingParamPurifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds parameter names to remove on top of the built-in list.
    pub fn with_extra_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_params.extend(params.into_iter().map(Into::into));
        self
    }

    /// Also drops the `#fragment` part of URLs.
    pub fn strip_fragment(mut self, strip: bool) -> Self {
        self.strip_fragment = strip;
        self
    }

    fn is_tracking(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        lower.starts_with(TRACKING_PREFIX)
            || TRACKING_PARAMS.contains(&lower.as_str())
            || self
                .extra_params
                .iter()
                .any(|p| p.eq_ignore_ascii_case(name))
    }
}

impl UrlPurifier for TrackingParamPurifier {
    fn purify(&self, url_str: &str) -> String {
        let trimmed = url_str.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let mut url = match Url::parse(trimmed) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(url = %trimmed, error = %e, "Leaving unparseable link as-is");
                return trimmed.to_string();
            }
        };

        if url.query().is_some() {
            let total = url.query_pairs().count();
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| !self.is_tracking(k))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            // Untouched queries keep their original encoding.
            if kept.is_empty() {
                url.set_query(None);
            } else if kept.len() < total {
                url.query_pairs_mut().clear().extend_pairs(kept);
            }
        }

        if self.strip_fragment {
            url.set_fragment(None);
        }

        url.into()
    }
}
