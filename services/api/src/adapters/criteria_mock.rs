//! services/api/src/adapters/criteria_mock.rs
//!
//! The default `CriteriaExtractionService`: returns the canned preparation plan,
//! honouring a CGPA cutoff stated in the submitted text.

use async_trait::async_trait;
use interview_prep_core::{
    domain::{CriteriaPayload, Eligibility, ExtractedCriteria, InterviewRound, Weightage},
    ports::{CriteriaExtractionService, PortError, PortResult},
};
use regex::Regex;
use std::sync::OnceLock;
use tracing::info;

const DEFAULT_CGPA: f64 = 7.5;

fn cgpa_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bcgpa\b[^0-9]{0,16}?(\d{1,2}(?:\.\d+)?)\b").expect("cgpa pattern is valid")
    })
}

/// Finds the first plausible CGPA cutoff (0-10) stated in free text.
pub fn find_cgpa(text: &str) -> Option<f64> {
    cgpa_pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
        .find(|value| (0.0..=10.0).contains(value))
}

#[derive(Clone, Default)]
pub struct MockCriteriaAdapter;

impl MockCriteriaAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CriteriaExtractionService for MockCriteriaAdapter {
    async fn extract_criteria(&self, payload: &CriteriaPayload) -> PortResult<ExtractedCriteria> {
        let stated_cgpa = match payload {
            CriteriaPayload::Text(text) => find_cgpa(text),
            CriteriaPayload::File { file_name, bytes } if payload.extension().as_deref() == Some("txt") => {
                let text = std::str::from_utf8(bytes).map_err(|e| {
                    PortError::Unexpected(format!("{} is not valid UTF-8 text: {}", file_name, e))
                })?;
                find_cgpa(text)
            }
            // Binary documents are not parsed; the canned plan stands.
            CriteriaPayload::File { .. } => None,
        };

        let cgpa = stated_cgpa.unwrap_or(DEFAULT_CGPA);
        info!("Mock extraction produced plan with CGPA cutoff {}", cgpa);
        Ok(canned_criteria(cgpa))
    }
}

fn round(round_type: &str, topics: &[&str], duration: u32, question_count: Option<u32>) -> InterviewRound {
    InterviewRound {
        round_type: round_type.to_string(),
        topics: topics.iter().map(|t| t.to_string()).collect(),
        duration,
        question_count,
    }
}

fn canned_criteria(cgpa: f64) -> ExtractedCriteria {
    ExtractedCriteria {
        eligibility: Eligibility {
            cgpa,
            branches: ["CSE", "IT", "ECE"].iter().map(|b| b.to_string()).collect(),
        },
        rounds: vec![
            round("MCQ", &["Aptitude", "Technical"], 60, Some(30)),
            round("DSA", &["Arrays", "Strings", "Trees"], 90, Some(3)),
            round("Technical Interview", &["System Design", "Projects"], 45, None),
            round("HR Interview", &["Behavioral", "Situational"], 30, None),
        ],
        topics: ["Arrays", "Strings", "Trees", "Dynamic Programming", "System Design"]
            .iter()
            .map(|t| t.to_string())
            .collect(),
        difficulty: "Medium-Hard".to_string(),
        weightage: Weightage {
            dsa: 40,
            mcq: 30,
            interview: 30,
        },
    }
}
