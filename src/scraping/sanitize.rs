//! HTML-fragment to plain-text sanitization for book descriptions.
//!
//! Description sources range from clean markup to meta tags carrying
//! escaped (sometimes doubly escaped) HTML, so entities are decoded twice
//! before tags are handled. Line-breaking tags become newlines, all other
//! tags become spaces, and whitespace is normalized so at most one blank
//! line survives between paragraphs.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#x?[0-9a-fA-F]+|[a-zA-Z]+);").unwrap());
static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<\s*br\s*/?\s*>").unwrap());
static BLOCK_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*/\s*(?:p|div|li|h[1-6])\s*>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static HORIZONTAL_WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t\r ]+").unwrap());
static AROUND_NEWLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]*\n[ \t]*").unwrap());
static EXCESS_NEWLINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            if let Some(numeric) = entity.strip_prefix('#') {
                let (digits, radix) = if numeric.starts_with('x') || numeric.starts_with('X') {
                    (&numeric[1..], 16)
                } else {
                    (numeric, 10)
                };
                return u32::from_str_radix(digits, radix)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| " ".to_string());
            }

            match entity.to_ascii_lowercase().as_str() {
                "nbsp" => " ",
                "amp" => "&",
                "lt" => "<",
                "gt" => ">",
                "quot" => "\"",
                "apos" => "'",
                // Unrecognized named entities degrade to a space.
                _ => " ",
            }
            .to_string()
        })
        .into_owned()
}

/// Convert a raw (possibly escaped) HTML fragment into clean multi-line
/// text. Returns `None` for absent input and for input that reduces to
/// nothing, so callers treat "no description" uniformly.
pub fn sanitize_description(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }

    // Twice: meta fields escape their markup, and doubly-escaped payloads
    // occasionally appear in feeds.
    let decoded = decode_entities(&decode_entities(raw));

    let with_line_breaks = BR_RE.replace_all(&decoded, "\n");
    let with_line_breaks = BLOCK_CLOSE_RE.replace_all(&with_line_breaks, "\n");
    let without_tags = TAG_RE.replace_all(&with_line_breaks, " ");

    let normalized = HORIZONTAL_WS_RE.replace_all(&without_tags, " ");
    let normalized = AROUND_NEWLINE_RE.replace_all(&normalized, "\n");
    let normalized = EXCESS_NEWLINES_RE.replace_all(&normalized, "\n\n");
    let trimmed = normalized.trim();

    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
