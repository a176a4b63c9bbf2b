use std::borrow::Cow;

/// Ellipsis string appended by the default truncator
pub const ELLIPSIS: &str = "...";

/// Removes markup tags from a string, keeping the text between them.
pub trait TagStripper: Send + Sync {
    fn strip<'a>(&self, s: &'a str) -> Cow<'a, str>;
}

/// Bounds a string to at most `max` characters.
pub trait Truncator: Send + Sync {
    fn truncate<'a>(&self, s: &'a str, max: usize) -> Cow<'a, str>;
}

/// Default [`TagStripper`]: drops everything between `<` and `>` and
/// collapses the remaining whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupStripper;

impl TagStripper for MarkupStripper {
    fn strip<'a>(&self, s: &'a str) -> Cow<'a, str> {
        strip_tags(s)
    }
}

/// Default [`Truncator`]: cuts on a word boundary and appends an ellipsis.
#[derive(Debug, Clone)]
pub struct WordTruncator {
    ellipsis: String,
}

impl WordTruncator {
    pub fn new(ellipsis: impl Into<String>) -> Self {
        Self {
            ellipsis: ellipsis.into(),
        }
    }
}

impl Default for WordTruncator {
    fn default() -> Self {
        Self::new(ELLIPSIS)
    }
}

impl Truncator for WordTruncator {
    fn truncate<'a>(&self, s: &'a str, max: usize) -> Cow<'a, str> {
        truncate_words(s, max, &self.ellipsis)
    }
}

/// Strips markup tags and normalizes whitespace.
///
/// A `<` only opens a tag when it is followed by a letter, `/`, `!` or `?`,
/// so stray comparisons like `a < b` survive. An unterminated tag at the end
/// of the input is dropped.
///
/// Returns `Cow::Borrowed` when the input has no tags and no whitespace to
/// collapse.
///
/// # Examples
///
/// ```
/// use feednorm::util::strip_tags;
///
/// assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
/// assert_eq!(strip_tags("1 < 2"), "1 < 2");
/// ```
pub fn strip_tags(s: &str) -> Cow<'_, str> {
    let has_tag = s
        .char_indices()
        .any(|(i, c)| c == '<' && opens_tag(&s[i + 1..]));
    if !has_tag && is_collapsed(s) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for (i, c) in s.char_indices() {
        if in_tag {
            if c == '>' {
                in_tag = false;
                // Block-level boundaries should not glue words together.
                out.push(' ');
            }
        } else if c == '<' && opens_tag(&s[i + 1..]) {
            in_tag = true;
        } else {
            out.push(c);
        }
    }

    Cow::Owned(out.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// True when `s` has no leading/trailing whitespace and only single spaces between words.
fn is_collapsed(s: &str) -> bool {
    if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
        return false;
    }
    let mut prev_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if c != ' ' || prev_space {
                return false;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
    }
    true
}

fn opens_tag(rest: &str) -> bool {
    rest.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

/// Truncates a string to at most `max` characters, counting Unicode scalar values.
///
/// If truncation is necessary, the kept prefix is cut back to the last word
/// boundary (when there is one) and `ellipsis` is appended; the result including
/// the ellipsis never exceeds `max` characters.
///
/// # Edge Case Behavior
///
/// - `max == 0` returns `""`
/// - `max <= ellipsis length` returns the first `max` characters without ellipsis
/// - a single word longer than the limit is cut mid-word
///
/// # Examples
///
/// ```
/// use feednorm::util::truncate_words;
///
/// assert_eq!(truncate_words("Short", 10, "..."), "Short");
/// assert_eq!(truncate_words("Hello brave new world", 15, "..."), "Hello brave...");
/// assert_eq!(truncate_words("Supercalifragilistic", 8, "..."), "Super...");
/// ```
pub fn truncate_words<'a>(s: &'a str, max: usize, ellipsis: &str) -> Cow<'a, str> {
    if s.chars().count() <= max {
        return Cow::Borrowed(s);
    }
    if max == 0 {
        return Cow::Borrowed("");
    }

    let ellipsis_len = ellipsis.chars().count();
    if max <= ellipsis_len {
        return Cow::Borrowed(prefix_chars(s, max));
    }

    let kept = prefix_chars(s, max - ellipsis_len);
    // Only back off to a word boundary if the cut landed inside a word.
    let next_is_boundary = s[kept.len()..]
        .chars()
        .next()
        .is_some_and(char::is_whitespace);
    let kept = match kept.rfind(char::is_whitespace) {
        Some(idx) if !next_is_boundary && !kept[..idx].trim().is_empty() => &kept[..idx],
        _ => kept,
    };

    Cow::Owned(format!("{}{}", kept.trim_end(), ellipsis))
}

fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
