//! Clean-view projector: the final tailored text used for copy and export.
//!
//! Additions are kept and deletions are dropped; any other redline or HTML
//! markup is stripped. Per-change decisions are never consulted.

use once_cell::sync::Lazy;
use regex::Regex;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rule(pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("clean-view pattern is valid"),
        replacement,
    }
}

/// Applied in order. Deletion spans must go before the generic colour-span
/// unwrap, or their text would survive.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(r#"<span style="color:#c00000"><del>.*?</del></span>"#, ""),
        rule(r"(?i)<del[^>]*>.*?</del>", ""),
        rule(r"(?i)<ins[^>]*>(.*?)</ins>", "$1"),
        rule(r"~~.*?~~", ""),
        rule(r#"(?i)<span\s+class=["']add["'][^>]*>(.*?)</span>"#, "$1"),
        rule(r#"(?i)<span\s+class=["']del["'][^>]*>.*?</span>"#, ""),
        rule(r"(?i)<add>(.*?)</add>", "$1"),
        rule(r#"(?i)<span style="color:#[0-9a-f]+">(.*?)</span>"#, "$1"),
        rule(r"<[^>]*>", ""),
        rule(r"\n\s*\n\s*\n", "\n\n"),
    ]
});

/// Upper bound on projection passes. A pass that changes the text makes it
/// strictly shorter.
const MAX_PASSES: usize = 16;

/// Strips all redline markup from `document`.
///
/// Idempotent: `clean_view(&clean_view(d)) == clean_view(d)`. Stripping one
/// tag can expose a new `~~` pair, so rules are re-run to a fixed point.
pub fn clean_view(document: &str) -> String {
    let mut current = project_once(document);
    for _ in 0..MAX_PASSES {
        let next = project_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn project_once(text: &str) -> String {
    let mut out = text.to_string();
    for rule in RULES.iter() {
        out = rule
            .pattern
            .replace_all(&out, rule.replacement)
            .into_owned();
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redline::markup::{addition, deletion};

    const MANAGED: &str = r#"Managed **3** <span style="color:#c00000"><del>small</del></span><span style="color:#008000">large</span> projects"#;

    #[test]
    fn test_keeps_additions_drops_deletions() {
        assert_eq!(clean_view(MANAGED), "Managed **3** large projects");
    }

    #[test]
    fn test_add_tag_variant() {
        let doc = format!("Shipped {}{} features", deletion("some"), addition("12"));
        assert_eq!(clean_view(&doc), "Shipped 12 features");
    }

    #[test]
    fn test_no_markup_survives() {
        let doc = format!(
            "# Jane\n{} {}\n<span class=\"del\">gone</span><span class='add'>kept</span> ~~old~~ <ins>new</ins>",
            deletion("x"),
            addition("y")
        );
        let clean = clean_view(&doc);
        for marker in ["color:#c00000", "color:#008000", "<del>", "<add>", "<span", "~~"] {
            assert!(!clean.contains(marker), "{marker} survived in {clean:?}");
        }
        assert!(clean.contains("kept"));
        assert!(clean.contains("new"));
        assert!(!clean.contains("gone"));
        assert!(!clean.contains("old"));
    }

    #[test]
    fn test_collapses_blank_runs_and_trims() {
        let doc = "\n\n# Jane\n\n\n\n## Skills\n  \n\n- Rust\n\n";
        assert_eq!(clean_view(doc), "# Jane\n\n## Skills\n\n- Rust");
    }

    #[test]
    fn test_idempotent() {
        let docs = [
            MANAGED.to_string(),
            "~<b>~a~<b>~ tail".to_string(),
            "<<x>y> and <span style=\"color:#008000\">z".to_string(),
            format!("{}\n\n\n{}", deletion("a"), addition("b")),
        ];
        for doc in docs {
            let once = clean_view(&doc);
            assert_eq!(clean_view(&once), once, "not idempotent for {doc:?}");
        }
    }

    #[test]
    fn test_plain_text_unchanged_except_trim() {
        let doc = "Built **fast** services";
        assert_eq!(clean_view(doc), doc);
    }
}
