//! Markup tokenizer. Splits a document into plain text and change tokens and
//! builds the change registry in the same pass.
//!
//! Ids come from one counter shared by both passes: every deletion is numbered
//! first (document order), then additions continue the sequence. They are
//! positional and only meaningful for the document version that produced them.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::redline::markup::{unwrap_add_tag, ADDITION_RE, DELETION_RE};
use crate::redline::registry::{Change, ChangeKind, ChangeRegistry};

/// A change as it appears in the token stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeToken {
    pub id: String,
    pub kind: ChangeKind,
    pub display_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text { text: String },
    Change(ChangeToken),
}

/// Output of one tokenization pass.
#[derive(Debug, Clone, Default)]
pub struct TokenizedDocument {
    pub segments: Vec<Segment>,
    pub registry: ChangeRegistry,
}

impl TokenizedDocument {
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.registry.iter()
    }

    pub fn has_changes(&self) -> bool {
        !self.registry.is_empty()
    }
}

struct Found {
    span: Range<usize>,
    kind: ChangeKind,
    text: String,
    /// Empty spans are elided from the stream but get no id.
    keep: bool,
}

/// Tokenizes `document`. Never fails: anything that does not match the redline
/// patterns is plain text.
pub fn tokenize(document: &str) -> TokenizedDocument {
    let mut found: Vec<Found> = DELETION_RE
        .captures_iter(document)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let text = caps.get(1)?.as_str().to_string();
            Some(Found {
                span: whole.range(),
                kind: ChangeKind::Deletion,
                keep: !text.trim().is_empty(),
                text,
            })
        })
        .collect();

    let additions: Vec<Found> = ADDITION_RE
        .captures_iter(document)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let text = unwrap_add_tag(caps.get(1)?.as_str()).to_string();
            Some(Found {
                span: whole.range(),
                kind: ChangeKind::Addition,
                keep: !text.trim().is_empty(),
                text,
            })
        })
        .filter(|add| !found.iter().any(|del| overlaps(&del.span, &add.span)))
        .collect();
    found.extend(additions);

    let mut sequence = 0usize;
    let mut changes = Vec::new();
    let mut tokens: Vec<(Range<usize>, Option<ChangeToken>)> = Vec::with_capacity(found.len());

    for item in found {
        if !item.keep {
            tokens.push((item.span, None));
            continue;
        }
        let id = format!("{}-{}", item.kind.prefix(), sequence);
        sequence += 1;
        changes.push(Change {
            id: id.clone(),
            kind: item.kind,
            raw_markup: document[item.span.clone()].to_string(),
            display_text: item.text.clone(),
            span: item.span.clone(),
        });
        tokens.push((
            item.span,
            Some(ChangeToken {
                id,
                kind: item.kind,
                display_text: item.text,
            }),
        ));
    }

    tokens.sort_by_key(|(span, _)| span.start);

    let mut segments = Vec::new();
    let mut cursor = 0;
    for (span, token) in tokens {
        push_text(&mut segments, &document[cursor..span.start]);
        if let Some(token) = token {
            segments.push(Segment::Change(token));
        }
        cursor = span.end;
    }
    push_text(&mut segments, &document[cursor..]);

    if segments.is_empty() {
        segments.push(Segment::Text {
            text: String::new(),
        });
    }

    TokenizedDocument {
        segments,
        registry: ChangeRegistry::from_changes(changes),
    }
}

/// Rebuilds a change from its raw markup alone, as the side panel sends it
/// back. `raw_markup` must be exactly one non-empty redline span.
pub fn parse_change(id: &str, raw_markup: &str) -> Option<Change> {
    let tokenized = tokenize(raw_markup);
    let mut changes = tokenized.registry.iter();
    let change = changes.next()?;
    if changes.next().is_some() || change.span != (0..raw_markup.len()) {
        return None;
    }
    Some(Change {
        id: id.to_string(),
        ..change.clone()
    })
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Appends text, merging with a preceding text segment (elided empty spans
/// would otherwise leave two text segments side by side).
fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text { text: last }) = segments.last_mut() {
        last.push_str(text);
        return;
    }
    segments.push(Segment::Text {
        text: text.to_string(),
    });
}
