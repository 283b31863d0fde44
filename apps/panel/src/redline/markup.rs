//! Redline micro-format: the exact markup the backend emits for proposed edits.
//!
//! This is a wire contract with the backend diff module. Do not loosen the
//! colour codes or attribute spelling: the backend never emits variants.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// Opening wrapper of a deletion span.
pub const DELETION_OPEN: &str = r#"<span style="color:#c00000"><del>"#;
/// Closing wrapper of a deletion span.
pub const DELETION_CLOSE: &str = "</del></span>";
/// Opening wrapper of an addition span.
pub const ADDITION_OPEN: &str = r#"<span style="color:#008000">"#;
/// Closing wrapper of an addition span.
pub const ADDITION_CLOSE: &str = "</span>";
/// Optional inner wrapper of an addition span.
pub const ADD_TAG_OPEN: &str = "<add>";
pub const ADD_TAG_CLOSE: &str = "</add>";

/// `.` never matches `\n`, so a span cannot cross a line break. Unterminated
/// spans simply fail to match and stay literal.
pub(crate) static DELETION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<span style="color:#c00000"><del>(.*?)</del></span>"#)
        .expect("deletion pattern is valid")
});

pub(crate) static ADDITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<span style="color:#008000">(.*?)</span>"#).expect("addition pattern is valid")
});

pub(crate) static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));

/// Wraps text in deletion markup.
pub fn deletion(text: &str) -> String {
    format!("{DELETION_OPEN}{text}{DELETION_CLOSE}")
}

/// Wraps text in addition markup with the explicit `<add>` inner tag, the
/// shape the backend diff produces.
pub fn addition(text: &str) -> String {
    format!("{ADDITION_OPEN}{ADD_TAG_OPEN}{text}{ADD_TAG_CLOSE}{ADDITION_CLOSE}")
}

/// Strips an optional `<add>...</add>` wrapper from an addition's inner text.
pub(crate) fn unwrap_add_tag(inner: &str) -> &str {
    inner
        .strip_prefix(ADD_TAG_OPEN)
        .and_then(|s| s.strip_suffix(ADD_TAG_CLOSE))
        .unwrap_or(inner)
}

/// Escapes text for HTML text nodes and double-quoted attribute values.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}
