//! Change applier. Resolves one change against the whole document and returns
//! the rewritten document. The input document is never mutated in place.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::redline::registry::{Change, ChangeKind};
use crate::redline::tokenizer::tokenize;
use crate::redline::RedlineError;

/// What the user decided for one change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "text", rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
    /// Replace an addition with user-supplied text. Additions only.
    Edit(String),
}

/// Text that replaces a change's raw markup for a given decision.
///
/// | kind     | accept     | reject     | edit          |
/// |----------|------------|------------|---------------|
/// | deletion | ""         | inner text | not allowed   |
/// | addition | inner text | ""         | supplied text |
pub fn resolved_text(change: &Change, decision: &Decision) -> Result<String, RedlineError> {
    match (change.kind, decision) {
        (ChangeKind::Deletion, Decision::Accept) => Ok(String::new()),
        (ChangeKind::Deletion, Decision::Reject) => Ok(change.display_text.clone()),
        (ChangeKind::Deletion, Decision::Edit(_)) => Err(RedlineError::UnsupportedDecision {
            id: change.id.clone(),
            decision: "edit",
        }),
        (ChangeKind::Addition, Decision::Accept) => Ok(change.display_text.clone()),
        (ChangeKind::Addition, Decision::Reject) => Ok(String::new()),
        (ChangeKind::Addition, Decision::Edit(text)) => Ok(text.clone()),
    }
}

/// Replaces the FIRST literal occurrence of the change's raw markup.
///
/// A missing anchor (already resolved, or the document changed underneath) is
/// a no-op that returns the document unchanged.
pub fn apply(document: &str, change: &Change, decision: &Decision) -> Result<String, RedlineError> {
    let replacement = resolved_text(change, decision)?;

    if !document.contains(&change.raw_markup) {
        debug!(
            "Change {} not found in document, nothing to resolve",
            change.id
        );
        return Ok(document.to_string());
    }

    Ok(document.replacen(&change.raw_markup, &replacement, 1))
}

/// Resolves the change at the exact span it was tokenized from when the
/// document still holds its raw markup there; otherwise falls back to
/// [`apply`]. Removes the duplicate-markup ambiguity of first-occurrence
/// substitution.
pub fn apply_at(
    document: &str,
    change: &Change,
    decision: &Decision,
) -> Result<String, RedlineError> {
    match document.get(change.span.clone()) {
        Some(slice) if slice == change.raw_markup => {
            let replacement = resolved_text(change, decision)?;
            let mut out = String::with_capacity(document.len());
            out.push_str(&document[..change.span.start]);
            out.push_str(&replacement);
            out.push_str(&document[change.span.end..]);
            Ok(out)
        }
        _ => apply(document, change, decision),
    }
}

/// Tokenizes `document`, looks up `id` and resolves it positionally.
/// Unknown ids are a no-op.
pub fn apply_by_id(document: &str, id: &str, decision: &Decision) -> Result<String, RedlineError> {
    let tokenized = tokenize(document);
    match tokenized.registry.get(id) {
        Some(change) => apply_at(document, change, decision),
        None => {
            debug!("Unknown change id {id}, document unchanged");
            Ok(document.to_string())
        }
    }
}

/// Resolves every change in one pass, choosing a decision per change.
/// Changes are spliced from the back so earlier spans stay valid.
pub fn resolve_all<F>(document: &str, mut decide: F) -> Result<String, RedlineError>
where
    F: FnMut(&Change) -> Decision,
{
    let tokenized = tokenize(document);
    let changes: Vec<_> = tokenized.changes().collect();

    let mut out = document.to_string();
    for change in changes.into_iter().rev() {
        let replacement = resolved_text(change, &decide(change))?;
        out.replace_range(change.span.clone(), &replacement);
    }
    Ok(out)
}
