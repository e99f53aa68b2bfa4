//! crates/interview_prep_core/src/submission.rs
//!
//! The criteria submission state machine and the async driver that walks it.
//!
//! `SubmissionMachine` holds the transition rules and nothing else; it never
//! sleeps and never calls out. `SubmissionController` owns one machine, plays the
//! scripted progress ramp, calls the extraction collaborator and publishes every
//! change as a `SubmissionSnapshot`.

use crate::domain::{CriteriaPayload, ExtractedCriteria};
use crate::ports::CriteriaExtractionService;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

/// Progress at which the upload ramp hands over to processing.
pub const UPLOAD_CEILING: u8 = 50;
/// Progress of a completed ramp.
pub const PROGRESS_COMPLETE: u8 = 100;
/// File extensions the upload picker accepts.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "txt", "doc", "docx"];

//=========================================================================================
// Status, Errors
//=========================================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Uploading,
    Processing,
    Success,
    Error,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Idle => "idle",
            SubmissionStatus::Uploading => "uploading",
            SubmissionStatus::Processing => "processing",
            SubmissionStatus::Success => "success",
            SubmissionStatus::Error => "error",
        }
    }

    /// True while a submission is in flight.
    pub fn is_active(&self) -> bool {
        matches!(self, SubmissionStatus::Uploading | SubmissionStatus::Processing)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a payload is refused before any state change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Pasted text is empty")]
    EmptyText,
    #[error("File '{0}' is empty")]
    EmptyFile(String),
    #[error("No file or text was provided")]
    MissingPayload,
    #[error("Unsupported file type for '{0}' (expected pdf, txt, doc or docx)")]
    UnsupportedFileType(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Invalid payload: {0}")]
    Validation(#[from] ValidationError),
    #[error("A submission is already in flight")]
    Busy,
    #[error("Cannot {action} while {status}")]
    InvalidTransition {
        action: &'static str,
        status: SubmissionStatus,
    },
    #[error("Progress cannot move from {from} to {to}")]
    ProgressRegression { from: u8, to: u8 },
    #[error("Progress {to} is past the {status} ceiling of {ceiling}")]
    ProgressOutOfRange {
        to: u8,
        ceiling: u8,
        status: SubmissionStatus,
    },
}

/// Checks that a payload carries something to extract from.
pub fn validate_payload(payload: &CriteriaPayload) -> Result<(), ValidationError> {
    match payload {
        CriteriaPayload::Text(text) => {
            if text.trim().is_empty() {
                return Err(ValidationError::EmptyText);
            }
        }
        CriteriaPayload::File { file_name, bytes } => {
            let supported = payload
                .extension()
                .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false);
            if !supported {
                return Err(ValidationError::UnsupportedFileType(file_name.clone()));
            }
            if bytes.is_empty() {
                return Err(ValidationError::EmptyFile(file_name.clone()));
            }
        }
    }
    Ok(())
}

//=========================================================================================
// Snapshot
//=========================================================================================

/// Serializable view of a submission handed to the view layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionSnapshot {
    pub id: Option<Uuid>,
    pub status: SubmissionStatus,
    pub progress: u8,
    pub payload_kind: Option<&'static str>,
    pub result: Option<ExtractedCriteria>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

//=========================================================================================
// State Machine
//=========================================================================================

/// One criteria submission. `result` is `Some` exactly when the status is `Success`,
/// and `progress` never decreases between `begin` and the next reset.
#[derive(Debug, Default)]
pub struct SubmissionMachine {
    id: Option<Uuid>,
    status: SubmissionStatus,
    progress: u8,
    payload: Option<CriteriaPayload>,
    result: Option<ExtractedCriteria>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl SubmissionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn payload(&self) -> Option<&CriteriaPayload> {
        self.payload.as_ref()
    }

    pub fn result(&self) -> Option<&ExtractedCriteria> {
        self.result.as_ref()
    }

    pub fn snapshot(&self) -> SubmissionSnapshot {
        SubmissionSnapshot {
            id: self.id,
            status: self.status,
            progress: self.progress,
            payload_kind: self.payload.as_ref().map(CriteriaPayload::kind),
            result: self.result.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    /// Idle (or a finished Success) → Uploading. A Success instance is replaced by
    /// a fresh one; an Error instance must be retried first.
    pub fn begin(&mut self, payload: CriteriaPayload) -> Result<Uuid, SubmissionError> {
        match self.status {
            SubmissionStatus::Uploading | SubmissionStatus::Processing => {
                return Err(SubmissionError::Busy)
            }
            SubmissionStatus::Error => {
                return Err(SubmissionError::InvalidTransition {
                    action: "submit",
                    status: self.status,
                })
            }
            SubmissionStatus::Idle | SubmissionStatus::Success => {}
        }
        validate_payload(&payload)?;

        let id = Uuid::new_v4();
        *self = Self {
            id: Some(id),
            status: SubmissionStatus::Uploading,
            progress: 0,
            payload: Some(payload),
            result: None,
            started_at: Some(Utc::now()),
            finished_at: None,
        };
        Ok(id)
    }

    /// Moves progress forward within the current phase.
    pub fn advance(&mut self, to: u8) -> Result<(), SubmissionError> {
        let ceiling = match self.status {
            SubmissionStatus::Uploading => UPLOAD_CEILING,
            SubmissionStatus::Processing => PROGRESS_COMPLETE,
            status => {
                return Err(SubmissionError::InvalidTransition {
                    action: "advance progress",
                    status,
                })
            }
        };
        if to < self.progress {
            return Err(SubmissionError::ProgressRegression {
                from: self.progress,
                to,
            });
        }
        if to > ceiling {
            return Err(SubmissionError::ProgressOutOfRange {
                to,
                ceiling,
                status: self.status,
            });
        }
        self.progress = to;
        Ok(())
    }

    pub fn start_processing(&mut self) -> Result<(), SubmissionError> {
        self.expect_status(SubmissionStatus::Uploading, "start processing")?;
        self.status = SubmissionStatus::Processing;
        self.progress = UPLOAD_CEILING;
        Ok(())
    }

    pub fn succeed(&mut self, result: ExtractedCriteria) -> Result<(), SubmissionError> {
        self.expect_status(SubmissionStatus::Processing, "complete")?;
        self.status = SubmissionStatus::Success;
        self.progress = PROGRESS_COMPLETE;
        self.result = Some(result);
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), SubmissionError> {
        self.expect_status(SubmissionStatus::Processing, "fail")?;
        self.status = SubmissionStatus::Error;
        self.result = None;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Error → Idle, dropping the payload and progress.
    pub fn retry(&mut self) -> Result<(), SubmissionError> {
        self.expect_status(SubmissionStatus::Error, "retry")?;
        *self = Self::default();
        Ok(())
    }

    fn expect_status(
        &self,
        expected: SubmissionStatus,
        action: &'static str,
    ) -> Result<(), SubmissionError> {
        if self.status != expected {
            return Err(SubmissionError::InvalidTransition {
                action,
                status: self.status,
            });
        }
        Ok(())
    }
}

//=========================================================================================
// Ramp Schedule
//=========================================================================================

/// The scripted pseudo-progress shown while a submission is in flight.
/// It is a display affordance and has no relation to bytes transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampSchedule {
    pub step: u8,
    pub upload_step_delay: Duration,
    pub processing_step_delay: Duration,
}

impl Default for RampSchedule {
    fn default() -> Self {
        Self {
            step: 10,
            upload_step_delay: Duration::from_millis(100),
            processing_step_delay: Duration::from_millis(150),
        }
    }
}

impl RampSchedule {
    /// A schedule with no delays, for callers that only care about the sequence.
    pub fn immediate() -> Self {
        Self {
            upload_step_delay: Duration::ZERO,
            processing_step_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Upload ramp points: 0, step, ..., 50.
    pub fn upload_points(&self) -> Vec<u8> {
        ramp(0, UPLOAD_CEILING, self.step)
    }

    /// Processing ramp points after the hand-over: 50 + step, ..., 100.
    pub fn processing_points(&self) -> Vec<u8> {
        ramp(UPLOAD_CEILING, PROGRESS_COMPLETE, self.step)
            .into_iter()
            .skip(1)
            .collect()
    }
}

fn ramp(from: u8, to: u8, step: u8) -> Vec<u8> {
    let mut points: Vec<u8> = (from..=to).step_by(step.max(1) as usize).collect();
    if points.last() != Some(&to) {
        points.push(to);
    }
    points
}

//=========================================================================================
// Controller
//=========================================================================================

pub type UpdateSender = mpsc::UnboundedSender<SubmissionSnapshot>;

/// Owns one `SubmissionMachine` and drives it end to end.
///
/// At most one submission is in flight per controller: a second `submit` while the
/// first is uploading or processing returns `SubmissionError::Busy` and leaves the
/// running one untouched.
pub struct SubmissionController {
    machine: Mutex<SubmissionMachine>,
    extractor: Arc<dyn CriteriaExtractionService>,
    schedule: RampSchedule,
}

impl SubmissionController {
    pub fn new(extractor: Arc<dyn CriteriaExtractionService>, schedule: RampSchedule) -> Self {
        Self {
            machine: Mutex::new(SubmissionMachine::new()),
            extractor,
            schedule,
        }
    }

    pub async fn snapshot(&self) -> SubmissionSnapshot {
        self.machine.lock().await.snapshot()
    }

    pub async fn retry(&self) -> Result<SubmissionSnapshot, SubmissionError> {
        let mut machine = self.machine.lock().await;
        machine.retry()?;
        info!("Submission reset to idle after retry.");
        Ok(machine.snapshot())
    }

    /// Runs a submission to completion and returns its final snapshot.
    ///
    /// Every state or progress change is sent to `updates`, in order. An extraction
    /// failure is not an `Err`: it ends the submission in `SubmissionStatus::Error`.
    pub async fn submit(
        &self,
        payload: CriteriaPayload,
        updates: Option<&UpdateSender>,
    ) -> Result<SubmissionSnapshot, SubmissionError> {
        let working = payload.clone();
        let id = {
            let mut machine = self.machine.lock().await;
            let id = machine.begin(payload)?;
            publish(updates, machine.snapshot());
            id
        };
        info!("Submission {} started ({} payload).", id, working.kind());

        for point in self.schedule.upload_points() {
            tokio::time::sleep(self.schedule.upload_step_delay).await;
            self.apply(updates, |m| m.advance(point)).await?;
        }

        self.apply(updates, SubmissionMachine::start_processing).await?;

        for point in self.schedule.processing_points() {
            tokio::time::sleep(self.schedule.processing_step_delay).await;
            self.apply(updates, |m| m.advance(point)).await?;
        }

        match self.extractor.extract_criteria(&working).await {
            Ok(criteria) => {
                info!("Submission {} extracted successfully.", id);
                self.apply(updates, |m| m.succeed(criteria)).await
            }
            Err(e) => {
                warn!("Submission {} failed during extraction: {}", id, e);
                self.apply(updates, SubmissionMachine::fail).await
            }
        }
    }

    async fn apply<F>(
        &self,
        updates: Option<&UpdateSender>,
        transition: F,
    ) -> Result<SubmissionSnapshot, SubmissionError>
    where
        F: FnOnce(&mut SubmissionMachine) -> Result<(), SubmissionError>,
    {
        let mut machine = self.machine.lock().await;
        transition(&mut machine)?;
        let snapshot = machine.snapshot();
        publish(updates, snapshot.clone());
        Ok(snapshot)
    }
}

fn publish(updates: Option<&UpdateSender>, snapshot: SubmissionSnapshot) {
    if let Some(tx) = updates {
        // A dropped receiver only means nobody is watching any more.
        let _ = tx.send(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Eligibility, InterviewRound, Weightage};
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use bytes::Bytes;

    fn criteria(cgpa: f64) -> ExtractedCriteria {
        ExtractedCriteria {
            eligibility: Eligibility {
                cgpa,
                branches: ["CSE".to_string(), "IT".to_string()].into_iter().collect(),
            },
            rounds: vec![InterviewRound {
                round_type: "DSA".to_string(),
                topics: vec!["Arrays".to_string()],
                duration: 90,
                question_count: Some(3),
            }],
            topics: vec!["Arrays".to_string()],
            difficulty: "Medium".to_string(),
            weightage: Weightage {
                dsa: 50,
                mcq: 25,
                interview: 25,
            },
        }
    }

    struct FixedExtractor(f64);

    #[async_trait]
    impl CriteriaExtractionService for FixedExtractor {
        async fn extract_criteria(&self, _: &CriteriaPayload) -> PortResult<ExtractedCriteria> {
            Ok(criteria(self.0))
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl CriteriaExtractionService for FailingExtractor {
        async fn extract_criteria(&self, _: &CriteriaPayload) -> PortResult<ExtractedCriteria> {
            Err(PortError::Unexpected("upstream timed out".to_string()))
        }
    }

    fn text(s: &str) -> CriteriaPayload {
        CriteriaPayload::Text(s.to_string())
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SubmissionSnapshot>) -> Vec<SubmissionSnapshot> {
        let mut seen = Vec::new();
        while let Ok(snapshot) = rx.try_recv() {
            seen.push(snapshot);
        }
        seen
    }

    fn distinct_statuses(seen: &[SubmissionSnapshot]) -> Vec<SubmissionStatus> {
        let mut statuses: Vec<SubmissionStatus> = seen.iter().map(|s| s.status).collect();
        statuses.dedup();
        statuses
    }

    #[test]
    fn empty_text_is_rejected_without_transition() {
        let mut machine = SubmissionMachine::new();
        for blank in ["", "   ", "\n\t"] {
            let err = machine.begin(text(blank)).unwrap_err();
            assert_eq!(err, SubmissionError::Validation(ValidationError::EmptyText));
            assert_eq!(machine.status(), SubmissionStatus::Idle);
            assert_eq!(machine.progress(), 0);
        }
    }

    #[test]
    fn file_payload_validation() {
        let empty = CriteriaPayload::File {
            file_name: "criteria.pdf".to_string(),
            bytes: Bytes::new(),
        };
        assert_eq!(
            validate_payload(&empty),
            Err(ValidationError::EmptyFile("criteria.pdf".to_string()))
        );

        let image = CriteriaPayload::File {
            file_name: "criteria.png".to_string(),
            bytes: Bytes::from_static(b"\x89PNG"),
        };
        assert_eq!(
            validate_payload(&image),
            Err(ValidationError::UnsupportedFileType("criteria.png".to_string()))
        );

        let docx = CriteriaPayload::File {
            file_name: "Pattern.DOCX".to_string(),
            bytes: Bytes::from_static(b"PK"),
        };
        assert_eq!(validate_payload(&docx), Ok(()));
    }

    #[test]
    fn progress_never_regresses_or_overshoots() {
        let mut machine = SubmissionMachine::new();
        machine.begin(text("CGPA 7.0")).unwrap();
        machine.advance(30).unwrap();
        assert_eq!(
            machine.advance(20),
            Err(SubmissionError::ProgressRegression { from: 30, to: 20 })
        );
        assert!(matches!(
            machine.advance(60),
            Err(SubmissionError::ProgressOutOfRange { ceiling: 50, .. })
        ));
        assert_eq!(machine.progress(), 30);
    }

    #[test]
    fn result_only_present_on_success() {
        let mut machine = SubmissionMachine::new();
        machine.begin(text("criteria")).unwrap();
        assert!(machine.succeed(criteria(7.0)).is_err());
        machine.start_processing().unwrap();
        assert!(machine.result().is_none());
        machine.succeed(criteria(7.0)).unwrap();
        assert_eq!(machine.status(), SubmissionStatus::Success);
        assert!(machine.result().is_some());
    }

    #[test]
    fn retry_only_from_error() {
        let mut machine = SubmissionMachine::new();
        assert!(matches!(
            machine.retry(),
            Err(SubmissionError::InvalidTransition { action: "retry", .. })
        ));

        machine.begin(text("criteria")).unwrap();
        machine.start_processing().unwrap();
        machine.fail().unwrap();
        assert!(matches!(
            machine.begin(text("again")),
            Err(SubmissionError::InvalidTransition { action: "submit", .. })
        ));

        machine.retry().unwrap();
        assert_eq!(machine.status(), SubmissionStatus::Idle);
        assert_eq!(machine.progress(), 0);
        assert!(machine.payload().is_none());
        assert!(machine.id().is_none());
    }

    #[test]
    fn success_is_replaced_by_fresh_submission() {
        let mut machine = SubmissionMachine::new();
        let first = machine.begin(text("first")).unwrap();
        machine.start_processing().unwrap();
        machine.succeed(criteria(8.0)).unwrap();

        let second = machine.begin(text("second")).unwrap();
        assert_ne!(first, second);
        assert_eq!(machine.status(), SubmissionStatus::Uploading);
        assert_eq!(machine.progress(), 0);
        assert!(machine.result().is_none());
    }

    #[test]
    fn ramp_points_cover_both_phases() {
        let schedule = RampSchedule::default();
        assert_eq!(schedule.upload_points(), vec![0, 10, 20, 30, 40, 50]);
        assert_eq!(schedule.processing_points(), vec![60, 70, 80, 90, 100]);

        let odd = RampSchedule {
            step: 15,
            ..RampSchedule::immediate()
        };
        assert_eq!(odd.upload_points(), vec![0, 15, 30, 45, 50]);
        assert_eq!(odd.processing_points(), vec![65, 80, 95, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_submission_walks_every_state() {
        let controller =
            SubmissionController::new(Arc::new(FixedExtractor(8.5)), RampSchedule::default());
        assert_eq!(controller.snapshot().await.status, SubmissionStatus::Idle);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let done = controller.submit(text("Min CGPA 8.5"), Some(&tx)).await.unwrap();

        assert_eq!(done.status, SubmissionStatus::Success);
        assert_eq!(done.progress, PROGRESS_COMPLETE);
        assert_eq!(done.result.as_ref().map(|r| r.eligibility.cgpa), Some(8.5));
        assert!(done.finished_at.is_some());

        let seen = drain(&mut rx);
        assert_eq!(
            distinct_statuses(&seen),
            vec![
                SubmissionStatus::Uploading,
                SubmissionStatus::Processing,
                SubmissionStatus::Success
            ]
        );
        let progress: Vec<u8> = seen.iter().map(|s| s.progress).collect();
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(progress.last(), Some(&PROGRESS_COMPLETE));
        assert!(seen.iter().all(|s| s.result.is_some() == (s.status == SubmissionStatus::Success)));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submission_ends_in_error_then_retries_to_idle() {
        let controller =
            SubmissionController::new(Arc::new(FailingExtractor), RampSchedule::default());

        let done = controller.submit(text("criteria text"), None).await.unwrap();
        assert_eq!(done.status, SubmissionStatus::Error);
        assert!(done.result.is_none());

        let reset = controller.retry().await.unwrap();
        assert_eq!(reset.status, SubmissionStatus::Idle);
        assert_eq!(reset.progress, 0);
        assert!(reset.payload_kind.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_submission_keeps_controller_idle() {
        let controller =
            SubmissionController::new(Arc::new(FixedExtractor(7.0)), RampSchedule::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let err = controller.submit(text(""), Some(&tx)).await.unwrap_err();
        assert_eq!(err, SubmissionError::Validation(ValidationError::EmptyText));
        assert_eq!(controller.snapshot().await.status, SubmissionStatus::Idle);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn second_submit_while_in_flight_is_busy() {
        let controller = Arc::new(SubmissionController::new(
            Arc::new(FixedExtractor(7.5)),
            RampSchedule::default(),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let running = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit(text("first"), Some(&tx)).await })
        };

        // The first published snapshot means the submission has begun.
        let first = rx.recv().await.unwrap();
        assert_eq!(first.status, SubmissionStatus::Uploading);

        let err = controller.submit(text("second"), None).await.unwrap_err();
        assert_eq!(err, SubmissionError::Busy);

        let done = running.await.unwrap().unwrap();
        assert_eq!(done.status, SubmissionStatus::Success);
        assert_eq!(done.id, first.id);
    }

    #[tokio::test]
    async fn immediate_schedule_completes_without_timers() {
        let controller =
            SubmissionController::new(Arc::new(FixedExtractor(6.0)), RampSchedule::immediate());
        let file = CriteriaPayload::File {
            file_name: "pattern.txt".to_string(),
            bytes: Bytes::from_static(b"Rounds: MCQ, DSA"),
        };
        let done = controller.submit(file, None).await.unwrap();
        assert_eq!(done.status, SubmissionStatus::Success);
        assert_eq!(done.payload_kind, Some("file"));
    }
}
