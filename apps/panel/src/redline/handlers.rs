//! Axum route handlers for the Redline API.
//!
//! Stateless: the side panel owns the document and sends it with every call.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::redline::render::{render, render_plain, Block, ViewState};
use crate::redline::tokenizer::parse_change;
use crate::redline::{apply, apply_by_id, clean_view, tokenize, Change, Decision};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub document: String,
    #[serde(default = "default_true")]
    pub show_redlines: bool,
    #[serde(default)]
    pub hovered_id: Option<String>,
    #[serde(default)]
    pub editing_id: Option<String>,
    #[serde(default)]
    pub draft: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub blocks: Vec<Block>,
    pub html: String,
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Accept,
    Reject,
    Edit,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub document: String,
    pub change_id: String,
    pub decision: DecisionKind,
    /// When present, the exact markup to substitute (first occurrence).
    /// When absent, the change is looked up by id in a fresh tokenization.
    #[serde(default)]
    pub raw_markup: Option<String>,
    #[serde(default)]
    pub edited_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CleanRequest {
    pub document: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub document: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/redline/render
///
/// Tokenizes and renders the document. With `show_redlines: false` the clean
/// view is rendered instead and no changes are reported.
pub async fn handle_render(Json(request): Json<RenderRequest>) -> Json<RenderResponse> {
    if !request.show_redlines {
        let rendered = render_plain(&clean_view(&request.document));
        return Json(RenderResponse {
            html: rendered.to_html(),
            blocks: rendered.blocks,
            changes: Vec::new(),
        });
    }

    let tokenized = tokenize(&request.document);
    let view = ViewState {
        hovered_id: request.hovered_id,
        editing_id: request.editing_id,
        draft: request.draft.unwrap_or_default(),
    };
    let rendered = render(&tokenized, &view);

    Json(RenderResponse {
        html: rendered.to_html(),
        blocks: rendered.blocks,
        changes: tokenized.registry.iter().cloned().collect(),
    })
}

/// POST /api/v1/redline/apply
///
/// Resolves one change and returns the rewritten document. A change whose
/// markup is no longer in the document leaves it unchanged.
pub async fn handle_apply(
    Json(request): Json<ApplyRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let decision = match (request.decision, request.edited_text) {
        (DecisionKind::Accept, _) => Decision::Accept,
        (DecisionKind::Reject, _) => Decision::Reject,
        (DecisionKind::Edit, Some(text)) => Decision::Edit(text),
        (DecisionKind::Edit, None) => {
            return Err(AppError::Validation(
                "edited_text is required for an edit".to_string(),
            ))
        }
    };

    let document = match request.raw_markup {
        Some(raw) => {
            let change = parse_change(&request.change_id, &raw).ok_or_else(|| {
                AppError::Validation(format!(
                    "raw_markup for {} is not a redline span",
                    request.change_id
                ))
            })?;
            apply(&request.document, &change, &decision)?
        }
        None => apply_by_id(&request.document, &request.change_id, &decision)?,
    };

    Ok(Json(DocumentResponse { document }))
}

/// POST /api/v1/redline/clean
///
/// Returns the clean (copy/export) projection of the document.
pub async fn handle_clean(Json(request): Json<CleanRequest>) -> Json<DocumentResponse> {
    Json(DocumentResponse {
        document: clean_view(&request.document),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redline::markup::{addition, deletion};

    fn managed() -> String {
        format!("Managed **3** {}{} projects", deletion("small"), addition("large"))
    }

    #[tokio::test]
    async fn test_render_reports_changes_and_html() {
        let Json(response) = handle_render(Json(RenderRequest {
            document: managed(),
            show_redlines: true,
            hovered_id: Some("del-0".to_string()),
            editing_id: None,
            draft: None,
        }))
        .await;
        assert_eq!(response.changes.len(), 2);
        assert!(response.html.contains(r#"data-hovered="true""#));
    }

    #[tokio::test]
    async fn test_render_clean_view() {
        let Json(response) = handle_render(Json(RenderRequest {
            document: managed(),
            show_redlines: false,
            hovered_id: None,
            editing_id: None,
            draft: None,
        }))
        .await;
        assert!(response.changes.is_empty());
        assert!(response.html.contains("Managed <strong>3</strong> large projects"));
    }

    #[tokio::test]
    async fn test_apply_by_id_and_by_raw_markup() {
        let Json(by_id) = handle_apply(Json(ApplyRequest {
            document: managed(),
            change_id: "del-0".to_string(),
            decision: DecisionKind::Reject,
            raw_markup: None,
            edited_text: None,
        }))
        .await
        .unwrap();
        assert_eq!(
            by_id.document,
            format!("Managed **3** small{} projects", addition("large"))
        );

        let Json(by_raw) = handle_apply(Json(ApplyRequest {
            document: by_id.document,
            change_id: "add-0".to_string(),
            decision: DecisionKind::Edit,
            raw_markup: Some(addition("large")),
            edited_text: Some(" many".to_string()),
        }))
        .await
        .unwrap();
        assert_eq!(by_raw.document, "Managed **3** small many projects");
    }

    #[tokio::test]
    async fn test_edit_without_text_is_validation_error() {
        let result = handle_apply(Json(ApplyRequest {
            document: managed(),
            change_id: "add-1".to_string(),
            decision: DecisionKind::Edit,
            raw_markup: None,
            edited_text: None,
        }))
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_bogus_raw_markup_is_validation_error() {
        let result = handle_apply(Json(ApplyRequest {
            document: managed(),
            change_id: "add-1".to_string(),
            decision: DecisionKind::Accept,
            raw_markup: Some("<b>large</b>".to_string()),
            edited_text: None,
        }))
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_clean() {
        let Json(response) = handle_clean(Json(CleanRequest {
            document: managed(),
        }))
        .await;
        assert_eq!(response.document, "Managed **3** large projects");
    }
}
