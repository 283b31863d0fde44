//! Built-in fixture shown when the panel runs in demo mode.

use crate::backend::models::{Fit, GapEntry};
use crate::backend::ReviewResponse;

pub const DEMO_JOB_DESCRIPTION: &str = "\
Senior Backend Engineer (Rust)

We are looking for an engineer to own our ingestion pipeline.

Requirements:
- 5+ years building backend services
- Production Rust experience (tokio, axum or similar)
- Experience with PostgreSQL and message queues
- Kubernetes in production
- Mentoring junior engineers";

pub const DEMO_TAILORED_RESUME: &str = r#"# Jane Doe
Backend Engineer

## Experience
- Led <span style="color:#c00000"><del>a team</del></span><span style="color:#008000">a team of 4 engineers</span> building a **Rust** ingestion service on tokio
- Managed **3** <span style="color:#c00000"><del>small</del></span><span style="color:#008000">large</span> projects
- Cut p99 latency <span style="color:#008000"><add>by 40% </add></span>on the PostgreSQL write path

## Skills
Rust, <span style="color:#c00000"><del>PHP, </del></span>PostgreSQL, <span style="color:#008000">Kafka, </span>Docker"#;

/// Review payload served in demo mode.
pub fn demo_review() -> ReviewResponse {
    ReviewResponse {
        tailored_resume: Some(DEMO_TAILORED_RESUME.to_string()),
        fit: Some(Fit {
            score: Some(7.0),
            rationale: Some(
                "Strong Rust and PostgreSQL background. No evidence of Kubernetes in production."
                    .to_string(),
            ),
        }),
        gap_map: Some(vec![
            GapEntry {
                requirement: "Production Rust".to_string(),
                present: "Y".to_string(),
                evidence: "Experience, first bullet".to_string(),
                gap_handling: "Emphasized".to_string(),
            },
            GapEntry {
                requirement: "Kubernetes".to_string(),
                present: "N".to_string(),
                evidence: String::new(),
                gap_handling: "Asked as a question".to_string(),
            },
        ]),
        questions: Some(vec![
            "Have you run services on Kubernetes in production?".to_string(),
            "Have you mentored other engineers?".to_string(),
        ]),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redline::{clean_view, tokenize};

    #[test]
    fn test_demo_resume_has_both_change_kinds() {
        let tokenized = tokenize(DEMO_TAILORED_RESUME);
        assert!(tokenized.registry.get("del-0").is_some());
        assert!(tokenized.changes().any(|c| c.id.starts_with("add-")));
    }

    #[test]
    fn test_demo_clean_view() {
        let clean = clean_view(DEMO_TAILORED_RESUME);
        assert!(clean.contains("Managed **3** large projects"));
        assert!(clean.contains("Rust, PostgreSQL, Kafka, Docker"));
        assert!(!clean.contains("PHP"));
    }

    #[test]
    fn test_demo_review_is_complete() {
        let review = demo_review();
        assert_eq!(review.fit_score_label(), "7/10");
        assert_eq!(review.questions().len(), 2);
        assert!(review.gap_map().iter().any(|g| !g.is_present()));
    }
}
