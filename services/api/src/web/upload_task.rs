//! services/api/src/web/upload_task.rs
//!
//! Per-connection handling of the criteria upload flow: turns client frames into
//! calls on a `SubmissionController` and turns its snapshots into server messages.

use crate::web::protocol::{ClientMessage, ServerMessage};
use bytes::BytesMut;
use interview_prep_core::{
    domain::CriteriaPayload,
    submission::UpdateSender,
    SubmissionController, SubmissionSnapshot, SubmissionStatus, ValidationError,
};
use std::sync::Arc;
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The server messages one snapshot produces, in send order.
pub fn messages_for(snapshot: SubmissionSnapshot) -> Vec<ServerMessage> {
    let terminal = match snapshot.status {
        SubmissionStatus::Success => snapshot.result.clone().map(|criteria| ServerMessage::Extracted {
            submission_id: snapshot.id,
            criteria,
        }),
        SubmissionStatus::Error => Some(ServerMessage::Failed {
            submission_id: snapshot.id,
        }),
        _ => None,
    };
    let mut messages = vec![ServerMessage::Status { snapshot }];
    messages.extend(terminal);
    messages
}

/// Forwards snapshots to the outbound queue until cancelled or either side closes.
pub async fn relay_snapshots(
    mut snapshots: UnboundedReceiver<SubmissionSnapshot>,
    outbound: UnboundedSender<ServerMessage>,
    cancellation_token: CancellationToken,
) {
    loop {
        let snapshot = tokio::select! {
            _ = cancellation_token.cancelled() => break,
            next = snapshots.recv() => match next {
                Some(snapshot) => snapshot,
                None => break,
            },
        };
        for message in messages_for(snapshot) {
            if outbound.send(message).is_err() {
                return;
            }
        }
    }
}

struct PendingFile {
    file_name: String,
    buffer: BytesMut,
}

/// The upload state of one WebSocket connection.
pub struct UploadSession {
    controller: Arc<SubmissionController>,
    outbound: UnboundedSender<ServerMessage>,
    snapshots: UpdateSender,
    pending_file: Option<PendingFile>,
    submissions: Vec<JoinHandle<()>>,
    max_upload_bytes: usize,
}

impl UploadSession {
    pub fn new(
        controller: Arc<SubmissionController>,
        outbound: UnboundedSender<ServerMessage>,
        snapshots: UpdateSender,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            controller,
            outbound,
            snapshots,
            pending_file: None,
            submissions: Vec::new(),
            max_upload_bytes,
        }
    }

    /// Handles one JSON text frame from the client.
    pub async fn on_text(&mut self, text: &str) {
        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to deserialize client message: {}", e);
                self.send(ServerMessage::Error {
                    message: format!("Unrecognized message: {}", e),
                });
                return;
            }
        };

        match message {
            ClientMessage::SubmitText { text } => {
                self.submit(CriteriaPayload::Text(text));
            }
            ClientMessage::BeginFile { file_name } => {
                info!("File upload announced: {}", file_name);
                if let Some(previous) = self.pending_file.take() {
                    warn!(
                        "Discarding {} buffered bytes of {} for a new upload.",
                        previous.buffer.len(),
                        previous.file_name
                    );
                    self.reject(format!(
                        "Upload of '{}' was replaced before end_file",
                        previous.file_name
                    ));
                }
                self.pending_file = Some(PendingFile {
                    file_name,
                    buffer: BytesMut::new(),
                });
            }
            ClientMessage::EndFile => match self.pending_file.take() {
                Some(file) => self.submit(CriteriaPayload::File {
                    file_name: file.file_name,
                    bytes: file.buffer.freeze(),
                }),
                None => self.reject(ValidationError::MissingPayload.to_string()),
            },
            ClientMessage::Retry => match self.controller.retry().await {
                Ok(snapshot) => {
                    // Goes through the relay so it stays ordered after earlier snapshots.
                    let _ = self.snapshots.send(snapshot);
                }
                Err(e) => self.reject(e.to_string()),
            },
        }
    }

    /// Appends a binary frame to the announced file.
    pub fn on_binary(&mut self, data: &[u8]) {
        let Some(file) = self.pending_file.as_mut() else {
            warn!("Binary frame received without a begin_file; ignoring.");
            self.reject("Binary data received before begin_file");
            return;
        };

        if file.buffer.len() + data.len() > self.max_upload_bytes {
            warn!("Upload of {} exceeded {} bytes.", file.file_name, self.max_upload_bytes);
            let reason = format!(
                "File '{}' exceeds the {} byte limit",
                file.file_name, self.max_upload_bytes
            );
            self.pending_file = None;
            self.reject(reason);
            return;
        }
        file.buffer.extend_from_slice(data);
    }

    /// Stops every submission still running for this connection.
    pub fn shutdown(&mut self) {
        for handle in self.submissions.drain(..) {
            handle.abort();
        }
    }

    fn submit(&mut self, payload: CriteriaPayload) {
        self.submissions.retain(|h| !h.is_finished());

        let controller = self.controller.clone();
        let snapshots = self.snapshots.clone();
        let outbound = self.outbound.clone();
        let handle = tokio::spawn(async move {
            match controller.submit(payload, Some(&snapshots)).await {
                Ok(done) => info!("Submission finished as {}.", done.status),
                Err(e) => {
                    warn!("Submission rejected: {}", e);
                    let _ = outbound.send(ServerMessage::Rejected {
                        reason: e.to_string(),
                    });
                }
            }
        });
        self.submissions.push(handle);
    }

    fn reject(&self, reason: impl Into<String>) {
        self.send(ServerMessage::Rejected {
            reason: reason.into(),
        });
    }

    fn send(&self, message: ServerMessage) {
        // The writer is gone once the socket closes; nothing left to tell.
        let _ = self.outbound.send(message);
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
