//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the criteria upload flow.

use interview_prep_core::{domain::ExtractedCriteria, SubmissionSnapshot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================
// NOTE: File contents are sent as raw Binary frames between `begin_file` and
// `end_file`, not as part of this enum.
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submits pasted criteria text.
    SubmitText { text: String },

    /// Announces a file upload. Binary frames that follow are its contents.
    BeginFile { file_name: String },

    /// Ends the announced file and submits it.
    EndFile,

    /// Returns a failed submission to idle.
    Retry,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The submission changed state or progress.
    Status { snapshot: SubmissionSnapshot },

    /// Extraction succeeded; the UI can render the plan.
    Extracted {
        submission_id: Option<Uuid>,
        criteria: ExtractedCriteria,
    },

    /// Extraction failed; the only way forward is `retry`.
    Failed { submission_id: Option<Uuid> },

    /// The request was refused without touching the submission
    /// (empty payload, one already in flight, nothing to retry).
    Rejected { reason: String },

    /// Reports a protocol error, e.g. an unparseable message.
    Error { message: String },
}
