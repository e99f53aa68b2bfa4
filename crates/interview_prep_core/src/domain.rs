//! crates/interview_prep_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs carry serde derives so adapters can put them on the wire,
//! but they are independent of any transport or storage.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Identity
//=========================================================================================

/// A reference to an authenticated user, as returned by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl UserRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role: None,
            company: None,
        }
    }
}

/// The outcome of a successful login or signup: an opaque token plus the identity.
#[derive(Debug, Clone, Serialize)]
pub struct AuthGrant {
    pub token: String,
    pub user: UserRef,
}

//=========================================================================================
// Catalog
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// A job role the user can prepare for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub skills: Vec<String>,
    pub icon: String,
}

/// Minimum academic requirements a company places on candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    pub cgpa: f64,
    pub branches: BTreeSet<String>,
}

/// A hiring company and its published interview shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySummary {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub difficulty: Difficulty,
    pub rounds: u32,
    pub roles: Vec<String>,
    pub avg_package: String,
    pub eligibility: Eligibility,
}

impl CompanySummary {
    /// Case-insensitive substring match on the company name.
    pub fn name_matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }

    pub fn hires_for(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentAttempt {
    pub id: String,
    pub company: String,
    pub date: String,
    pub score: u8,
    pub round: String,
}

/// Per-round preparation percentages plus the aggregate readiness score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub mcq: u8,
    pub dsa: u8,
    pub technical: u8,
    pub hr: u8,
    pub overall_score: u8,
    pub recent_attempts: Vec<RecentAttempt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct: usize,
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsaProblem {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub topics: Vec<String>,
    pub companies: Vec<String>,
}

//=========================================================================================
// Criteria
//=========================================================================================

/// Raw criteria input: an uploaded file or pasted text.
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaPayload {
    File { file_name: String, bytes: Bytes },
    Text(String),
}

impl CriteriaPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            CriteriaPayload::File { .. } => "file",
            CriteriaPayload::Text(_) => "text",
        }
    }

    /// Lowercased extension of a file payload, if it has one.
    pub fn extension(&self) -> Option<String> {
        match self {
            CriteriaPayload::File { file_name, .. } => file_name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase()),
            CriteriaPayload::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewRound {
    #[serde(rename = "type")]
    pub round_type: String,
    pub topics: Vec<String>,
    /// Minutes.
    pub duration: u32,
    #[serde(rename = "questions", default)]
    pub question_count: Option<u32>,
}

/// Percentage split of the evaluation across round families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weightage {
    pub dsa: u8,
    pub mcq: u8,
    pub interview: u8,
}

/// Structured preparation plan produced by the extraction collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedCriteria {
    pub eligibility: Eligibility,
    pub rounds: Vec<InterviewRound>,
    pub topics: Vec<String>,
    pub difficulty: String,
    pub weightage: Weightage,
}
