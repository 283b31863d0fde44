//! Inline redline engine: tokenizer, change registry, renderer, applier and
//! clean-view projector.
//!
//! Everything here is synchronous and pure. A document goes in as text and a
//! new document comes out; nothing is mutated in place.

pub mod apply;
pub mod clean;
pub mod handlers;
pub mod markup;
pub mod registry;
pub mod render;
pub mod tokenizer;

use thiserror::Error;

pub use apply::{apply, apply_at, apply_by_id, resolve_all, Decision};
pub use clean::clean_view;
pub use registry::{Change, ChangeKind, ChangeRegistry, ChangeStatus};
pub use render::{render, render_plain, RenderedDocument, ViewState};
pub use tokenizer::{tokenize, Segment, TokenizedDocument};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RedlineError {
    #[error("cannot {decision} change {id}")]
    UnsupportedDecision { id: String, decision: &'static str },
}
