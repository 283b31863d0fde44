//! Redline renderer. Turns the token stream into a line-oriented display model
//! with per-change affordances and serializes that model to HTML.
//!
//! Formatting rules: `# ` / `## ` headings at the start
//! of a line and `**bold**` inside plain text. Text inside a pending change is
//! rendered literally, emphasis markers included.

use serde::Serialize;

use crate::redline::markup::{escape_html, BOLD_RE};
use crate::redline::registry::ChangeKind;
use crate::redline::tokenizer::{tokenize, ChangeToken, Segment, TokenizedDocument};

/// Something the user can do to a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Accept,
    Reject,
    Edit,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Action::Accept => "accept",
            Action::Reject => "reject",
            Action::Edit => "edit",
        }
    }
}

/// Deletions: accept removes the text, reject keeps it.
pub const DELETION_ACTIONS: &[Action] = &[Action::Accept, Action::Reject];
/// Additions: accept keeps the text, reject removes it, edit replaces it.
pub const ADDITION_ACTIONS: &[Action] = &[Action::Accept, Action::Reject, Action::Edit];

pub fn actions_for(kind: ChangeKind) -> &'static [Action] {
    match kind {
        ChangeKind::Deletion => DELETION_ACTIONS,
        ChangeKind::Addition => ADDITION_ACTIONS,
    }
}

/// Transient per-change interaction state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Focus {
    #[default]
    Idle,
    /// Pointer or keyboard focus is on the change: actions are shown.
    Hovered,
    /// The change is being edited; `draft` is the current input value.
    Editing { draft: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeView {
    pub id: String,
    pub kind: ChangeKind,
    pub text: String,
    pub actions: &'static [Action],
    pub focus: Focus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text { text: String },
    Strong { text: String },
    Change(ChangeView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Blank,
    Heading { level: u8, inlines: Vec<Inline> },
    Paragraph { inlines: Vec<Inline> },
}

/// UI state the renderer needs. Owned by the panel session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub hovered_id: Option<String>,
    pub editing_id: Option<String>,
    pub draft: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub blocks: Vec<Block>,
}

/// Renders a document with redlines visible.
pub fn render(tokenized: &TokenizedDocument, view: &ViewState) -> RenderedDocument {
    let blocks = split_lines(&tokenized.segments)
        .into_iter()
        .map(|line| render_line(line, view))
        .collect();
    RenderedDocument { blocks }
}

/// Renders already-clean text (no redline markup) with the same block rules.
pub fn render_plain(text: &str) -> RenderedDocument {
    render(&tokenize(text), &ViewState::default())
}

enum LinePart<'a> {
    Text(&'a str),
    Change(&'a ChangeToken),
}

/// Change spans never cross a newline, so splitting text segments on `\n` is
/// enough to recover lines.
fn split_lines(segments: &[Segment]) -> Vec<Vec<LinePart<'_>>> {
    let mut lines = vec![Vec::new()];
    for segment in segments {
        match segment {
            Segment::Text { text } => {
                let mut pieces = text.split('\n');
                if let Some(first) = pieces.next() {
                    push_part(&mut lines, first);
                }
                for piece in pieces {
                    lines.push(Vec::new());
                    push_part(&mut lines, piece);
                }
            }
            Segment::Change(token) => {
                if let Some(line) = lines.last_mut() {
                    line.push(LinePart::Change(token));
                }
            }
        }
    }
    lines
}

fn push_part<'a>(lines: &mut [Vec<LinePart<'a>>], text: &'a str) {
    if text.is_empty() {
        return;
    }
    if let Some(line) = lines.last_mut() {
        line.push(LinePart::Text(text));
    }
}

fn render_line(mut parts: Vec<LinePart<'_>>, view: &ViewState) -> Block {
    let is_blank = parts.iter().all(|part| match part {
        LinePart::Text(text) => text.trim().is_empty(),
        LinePart::Change(_) => false,
    });
    if is_blank {
        return Block::Blank;
    }

    let mut level = 0;
    if let Some(LinePart::Text(first)) = parts.first_mut() {
        let leading = *first;
        if let Some(rest) = leading.strip_prefix("## ") {
            level = 2;
            *first = rest;
        } else if let Some(rest) = leading.strip_prefix("# ") {
            level = 1;
            *first = rest;
        }
    }

    let mut inlines = Vec::new();
    for part in parts {
        match part {
            LinePart::Text(text) => push_formatted(&mut inlines, text),
            LinePart::Change(token) => inlines.push(Inline::Change(change_view(token, view))),
        }
    }

    if level > 0 {
        Block::Heading { level, inlines }
    } else {
        Block::Paragraph { inlines }
    }
}

fn push_formatted(inlines: &mut Vec<Inline>, text: &str) {
    let mut cursor = 0;
    for caps in BOLD_RE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > cursor {
            inlines.push(Inline::Text {
                text: text[cursor..whole.start()].to_string(),
            });
        }
        inlines.push(Inline::Strong {
            text: inner.as_str().to_string(),
        });
        cursor = whole.end();
    }
    if cursor < text.len() {
        inlines.push(Inline::Text {
            text: text[cursor..].to_string(),
        });
    }
}

fn change_view(token: &ChangeToken, view: &ViewState) -> ChangeView {
    let focus = if view.editing_id.as_deref() == Some(token.id.as_str()) {
        Focus::Editing {
            draft: view.draft.clone(),
        }
    } else if view.hovered_id.as_deref() == Some(token.id.as_str()) {
        Focus::Hovered
    } else {
        Focus::Idle
    };

    ChangeView {
        id: token.id.clone(),
        kind: token.kind,
        text: token.display_text.clone(),
        actions: actions_for(token.kind),
        focus,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HTML serialization
// ────────────────────────────────────────────────────────────────────────────

impl RenderedDocument {
    /// Serializes to HTML. Every text node and attribute value is escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::from(r#"<div class="resume">"#);
        for block in &self.blocks {
            match block {
                Block::Blank => html.push_str("<br>"),
                Block::Heading { level, inlines } => {
                    html.push_str(&format!("<h{level}>"));
                    push_inlines_html(&mut html, inlines);
                    html.push_str(&format!("</h{level}>"));
                }
                Block::Paragraph { inlines } => {
                    html.push_str(r#"<div class="line">"#);
                    push_inlines_html(&mut html, inlines);
                    html.push_str("</div>");
                }
            }
        }
        html.push_str("</div>");
        html
    }

    pub fn changes(&self) -> impl Iterator<Item = &ChangeView> {
        self.blocks
            .iter()
            .flat_map(|block| {
                let inlines: &[Inline] = match block {
                    Block::Blank => &[],
                    Block::Heading { inlines, .. } | Block::Paragraph { inlines } => inlines,
                };
                inlines.iter()
            })
            .filter_map(|inline| match inline {
                Inline::Change(view) => Some(view),
                _ => None,
            })
    }
}

fn push_inlines_html(html: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text { text } => html.push_str(&escape_html(text)),
            Inline::Strong { text } => {
                html.push_str("<strong>");
                html.push_str(&escape_html(text));
                html.push_str("</strong>");
            }
            Inline::Change(view) => push_change_html(html, view),
        }
    }
}

fn push_change_html(html: &mut String, view: &ChangeView) {
    let id = escape_html(&view.id);

    if let Focus::Editing { draft } = &view.focus {
        html.push_str(&format!(
            r#"<input class="redline-edit" data-change-id="{id}" value="{}">"#,
            escape_html(draft)
        ));
        return;
    }

    let (tag, class) = match view.kind {
        ChangeKind::Deletion => ("del", "redline deletion"),
        ChangeKind::Addition => ("ins", "redline addition"),
    };
    let actions = view
        .actions
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let hovered = if view.focus == Focus::Hovered {
        r#" data-hovered="true""#
    } else {
        ""
    };

    html.push_str(&format!(
        r#"<{tag} class="{class}" data-change-id="{id}" data-actions="{actions}"{hovered}>{}</{tag}>"#,
        escape_html(&view.text)
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redline::markup::{addition, deletion};

    fn rendered(doc: &str) -> RenderedDocument {
        render(&tokenize(doc), &ViewState::default())
    }

    fn text(s: &str) -> Inline {
        Inline::Text {
            text: s.to_string(),
        }
    }

    #[test]
    fn test_headings_and_blank_lines() {
        let doc = "# Jane Doe\n\n## Experience\nEngineer";
        let blocks = rendered(doc).blocks;
        assert_eq!(blocks.len(), 4);
        assert_eq!(
            blocks[0],
            Block::Heading {
                level: 1,
                inlines: vec![text("Jane Doe")]
            }
        );
        assert_eq!(blocks[1], Block::Blank);
        assert_eq!(
            blocks[2],
            Block::Heading {
                level: 2,
                inlines: vec![text("Experience")]
            }
        );
        assert_eq!(
            blocks[3],
            Block::Paragraph {
                inlines: vec![text("Engineer")]
            }
        );
    }

    #[test]
    fn test_bold_in_plain_text_only() {
        let doc = format!("Managed **3** {}", addition("**5** teams"));
        let blocks = rendered(&doc).blocks;
        let Block::Paragraph { inlines } = &blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(inlines[0], text("Managed "));
        assert_eq!(
            inlines[1],
            Inline::Strong {
                text: "3".to_string()
            }
        );
        assert_eq!(inlines[2], text(" "));
        match &inlines[3] {
            Inline::Change(view) => assert_eq!(view.text, "**5** teams"),
            other => panic!("expected change, got {other:?}"),
        }
    }

    #[test]
    fn test_actions_by_kind() {
        let doc = format!("{}{}", deletion("small"), addition("large"));
        let doc = rendered(&doc);
        let views: Vec<_> = doc.changes().collect();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].actions, DELETION_ACTIONS);
        assert_eq!(views[1].actions, ADDITION_ACTIONS);
        assert!(!views[0].actions.contains(&Action::Edit));
    }

    #[test]
    fn test_focus_states() {
        let doc = format!("{} {}", deletion("a"), addition("b"));
        let view = ViewState {
            hovered_id: Some("del-0".to_string()),
            editing_id: Some("add-1".to_string()),
            draft: "bee".to_string(),
        };
        let out = render(&tokenize(&doc), &view);
        let views: Vec<_> = out.changes().collect();
        assert_eq!(views[0].focus, Focus::Hovered);
        assert_eq!(
            views[1].focus,
            Focus::Editing {
                draft: "bee".to_string()
            }
        );
    }

    #[test]
    fn test_change_inside_heading_line() {
        let doc = format!("## {}Summary", deletion("Professional "));
        let blocks = rendered(&doc).blocks;
        assert!(matches!(&blocks[0], Block::Heading { level: 2, inlines } if inlines.len() == 2));
    }

    #[test]
    fn test_html_escapes_and_marks_changes() {
        let doc = format!("R&D <b>x</b> {}", addition(r#"5 "quoted" <items>"#));
        let html = rendered(&doc).to_html();
        assert!(html.contains("R&amp;D &lt;b&gt;x&lt;/b&gt; "));
        assert!(html.contains(r#"data-change-id="add-0""#));
        assert!(html.contains(r#"data-actions="accept reject edit""#));
        assert!(html.contains("5 &quot;quoted&quot; &lt;items&gt;</ins>"));
    }

    #[test]
    fn test_html_editing_renders_input() {
        let doc = addition("large");
        let view = ViewState {
            hovered_id: None,
            editing_id: Some("add-0".to_string()),
            draft: "huge".to_string(),
        };
        let html = render(&tokenize(&doc), &view).to_html();
        assert!(html.contains(r#"<input class="redline-edit" data-change-id="add-0" value="huge">"#));
        assert!(!html.contains("<ins"));
    }

    #[test]
    fn test_render_plain_has_no_changes() {
        let out = render_plain("# Jane\nBuilt **fast** things");
        assert_eq!(out.changes().count(), 0);
        assert_eq!(out.blocks.len(), 2);
    }
}
