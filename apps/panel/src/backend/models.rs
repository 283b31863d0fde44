use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub job_description: String,
    pub url: String,
    #[serde(default)]
    pub demo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionsRequest {
    pub qa_pairs: Vec<QaPair>,
    #[serde(default)]
    pub demo: bool,
}

/// Pairs each question with the answer at its index. Unanswered questions
/// are sent with an empty answer.
pub fn qa_pairs(questions: &[String], answers: &BTreeMap<usize, String>) -> Vec<QaPair> {
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| QaPair {
            question: question.clone(),
            answer: answers.get(&index).cloned().unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptionRequest {
    pub url: String,
    #[serde(default)]
    pub demo: bool,
}

// ────────────────────────────────────────────────
// Responses
// ────────────────────────────────────────────────

pub const RATIONALE_PLACEHOLDER: &str = "No rationale provided.";

/// Review payload. The backend may omit any field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewResponse {
    #[serde(rename = "Tailored_Resume", default, skip_serializing_if = "Option::is_none")]
    pub tailored_resume: Option<String>,
    #[serde(rename = "Fit", default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<Fit>,
    #[serde(rename = "Gap_Map", default, skip_serializing_if = "Option::is_none")]
    pub gap_map: Option<Vec<GapEntry>>,
    #[serde(rename = "Questions", default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReviewResponse {
    pub fn tailored_resume(&self) -> &str {
        self.tailored_resume.as_deref().unwrap_or("")
    }

    pub fn fit_score(&self) -> Option<f64> {
        self.fit.as_ref().and_then(|f| f.score)
    }

    /// Score shown as `N/10`, or `N/A` when missing.
    pub fn fit_score_label(&self) -> String {
        match self.fit_score() {
            Some(score) => format!("{}/10", format_score(score)),
            None => "N/A".to_string(),
        }
    }

    pub fn fit_band(&self) -> Option<FitBand> {
        self.fit_score().map(FitBand::from_score)
    }

    pub fn rationale(&self) -> &str {
        self.fit
            .as_ref()
            .and_then(|f| f.rationale.as_deref())
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(RATIONALE_PLACEHOLDER)
    }

    pub fn gap_map(&self) -> &[GapEntry] {
        self.gap_map.as_deref().unwrap_or(&[])
    }

    pub fn questions(&self) -> &[String] {
        self.questions.as_deref().unwrap_or(&[])
    }
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fit {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub rationale: Option<String>,
}

/// Coarse bucket of the 0-10 fit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitBand {
    Excellent,
    Strong,
    Moderate,
    Weak,
    Poor,
}

impl FitBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            FitBand::Excellent
        } else if score >= 7.0 {
            FitBand::Strong
        } else if score >= 5.0 {
            FitBand::Moderate
        } else if score >= 3.0 {
            FitBand::Weak
        } else {
            FitBand::Poor
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapEntry {
    #[serde(rename = "JD Requirement/Keyword", default)]
    pub requirement: String,
    #[serde(rename = "Present in Resume?", default)]
    pub present: String,
    #[serde(rename = "Where/Evidence", default)]
    pub evidence: String,
    #[serde(rename = "Gap handling", default)]
    pub gap_handling: String,
}

impl GapEntry {
    pub fn is_present(&self) -> bool {
        self.present.trim().eq_ignore_ascii_case("y")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
