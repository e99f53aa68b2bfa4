//! crates/interview_prep_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture: the stores and the
//! submission state machine only ever talk to collaborators through them.

use async_trait::async_trait;
use crate::domain::{
    CompanySummary, CriteriaPayload, Difficulty, DsaProblem, ExtractedCriteria, McqQuestion,
    ProgressSnapshot, RoleSummary, UserRef,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, LLM).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CriteriaExtractionService: Send + Sync {
    /// Converts raw criteria input into a structured preparation plan.
    /// The failure reason is opaque to the caller.
    async fn extract_criteria(&self, payload: &CriteriaPayload) -> PortResult<ExtractedCriteria>;
}

/// Read-only catalog data shown on the role, company and dashboard pages.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn fetch_roles(&self) -> PortResult<Vec<RoleSummary>>;

    async fn fetch_role(&self, id: &str) -> PortResult<RoleSummary>;

    async fn fetch_companies(&self) -> PortResult<Vec<CompanySummary>>;

    async fn fetch_company(&self, id: &str) -> PortResult<CompanySummary>;

    async fn fetch_progress(&self) -> PortResult<ProgressSnapshot>;

    async fn fetch_mcqs(&self) -> PortResult<Vec<McqQuestion>>;

    /// DSA practice problems, optionally narrowed to one difficulty.
    async fn fetch_dsa(&self, difficulty: Option<Difficulty>) -> PortResult<Vec<DsaProblem>>;
}

#[async_trait]
pub trait AuthenticationService: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> PortResult<UserRef>;

    async fn register(&self, name: &str, email: &str, password: &str) -> PortResult<UserRef>;
}
