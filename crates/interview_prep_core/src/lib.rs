pub mod domain;
pub mod ports;
pub mod selection;
pub mod session;
pub mod submission;

pub use domain::{
    AuthGrant, CompanySummary, CriteriaPayload, Difficulty, DsaProblem, Eligibility,
    ExtractedCriteria, InterviewRound, McqQuestion, ProgressSnapshot, RecentAttempt, RoleSummary,
    UserRef, Weightage,
};
pub use ports::{
    AuthenticationService, CatalogService, CriteriaExtractionService, PortError, PortResult,
};
pub use selection::{Selection, SelectionStore};
pub use session::{Session, SessionStore};
pub use submission::{
    RampSchedule, SubmissionController, SubmissionError, SubmissionMachine, SubmissionSnapshot,
    SubmissionStatus, ValidationError,
};
