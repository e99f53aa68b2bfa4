//! Drives an `UploadSession` the way the WebSocket loop does, minus the socket.

use api_lib::{
    adapters::MockCriteriaAdapter,
    web::{
        protocol::ServerMessage,
        upload_task::{relay_snapshots, UploadSession},
    },
};
use interview_prep_core::{RampSchedule, SubmissionController, SubmissionStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio_util::sync::CancellationToken;

struct Harness {
    session: UploadSession,
    outbound: UnboundedReceiver<ServerMessage>,
    token: CancellationToken,
}

fn harness(schedule: RampSchedule, max_upload_bytes: usize) -> Harness {
    let (outbound_tx, outbound) = unbounded_channel();
    let (snapshot_tx, snapshot_rx) = unbounded_channel();
    let token = CancellationToken::new();
    tokio::spawn(relay_snapshots(snapshot_rx, outbound_tx.clone(), token.clone()));

    let controller = Arc::new(SubmissionController::new(
        Arc::new(MockCriteriaAdapter::new()),
        schedule,
    ));
    Harness {
        session: UploadSession::new(controller, outbound_tx, snapshot_tx, max_upload_bytes),
        outbound,
        token,
    }
}

fn is_terminal(message: &ServerMessage) -> bool {
    matches!(
        message,
        ServerMessage::Extracted { .. } | ServerMessage::Failed { .. } | ServerMessage::Rejected { .. }
    )
}

/// Collects messages up to and including the next terminal one.
async fn until_terminal(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut seen = Vec::new();
    loop {
        let message = tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("timed out waiting for a server message")
            .expect("outbound channel closed");
        let done = is_terminal(&message);
        seen.push(message);
        if done {
            return seen;
        }
    }
}

fn statuses(messages: &[ServerMessage]) -> Vec<SubmissionStatus> {
    let mut statuses: Vec<SubmissionStatus> = messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::Status { snapshot } => Some(snapshot.status),
            _ => None,
        })
        .collect();
    statuses.dedup();
    statuses
}

#[tokio::test(start_paused = true)]
async fn pasted_text_is_extracted() {
    let mut h = harness(RampSchedule::default(), 1024);
    h.session
        .on_text(r#"{"type":"submit_text","text":"Eligibility: CGPA 8.2 and above"}"#)
        .await;

    let messages = until_terminal(&mut h.outbound).await;
    assert_eq!(
        statuses(&messages),
        vec![
            SubmissionStatus::Uploading,
            SubmissionStatus::Processing,
            SubmissionStatus::Success
        ]
    );
    match messages.last() {
        Some(ServerMessage::Extracted { criteria, submission_id }) => {
            assert_eq!(criteria.eligibility.cgpa, 8.2);
            assert!(submission_id.is_some());
        }
        other => panic!("expected extracted, got {:?}", other),
    }
    h.token.cancel();
}

#[tokio::test]
async fn empty_text_and_missing_file_are_rejected() {
    let mut h = harness(RampSchedule::immediate(), 1024);

    h.session.on_text(r#"{"type":"submit_text","text":"   "}"#).await;
    let messages = until_terminal(&mut h.outbound).await;
    assert!(matches!(messages.as_slice(), [ServerMessage::Rejected { .. }]));

    h.session.on_text(r#"{"type":"end_file"}"#).await;
    let messages = until_terminal(&mut h.outbound).await;
    assert!(matches!(messages.as_slice(), [ServerMessage::Rejected { .. }]));
    h.token.cancel();
}

#[tokio::test]
async fn garbage_frame_reports_error() {
    let mut h = harness(RampSchedule::immediate(), 1024);
    h.session.on_text("not json").await;
    let message = h.outbound.recv().await.unwrap();
    assert!(matches!(message, ServerMessage::Error { .. }));
    h.token.cancel();
}

#[tokio::test]
async fn failed_file_can_be_retried() {
    let mut h = harness(RampSchedule::immediate(), 1024);

    h.session
        .on_text(r#"{"type":"begin_file","file_name":"pattern.txt"}"#)
        .await;
    h.session.on_binary(&[0xff, 0xfe]);
    h.session.on_binary(&[0x00]);
    h.session.on_text(r#"{"type":"end_file"}"#).await;

    let messages = until_terminal(&mut h.outbound).await;
    assert!(matches!(messages.last(), Some(ServerMessage::Failed { .. })));
    assert_eq!(statuses(&messages).last(), Some(&SubmissionStatus::Error));

    h.session.on_text(r#"{"type":"retry"}"#).await;
    match h.outbound.recv().await {
        Some(ServerMessage::Status { snapshot }) => {
            assert_eq!(snapshot.status, SubmissionStatus::Idle);
            assert_eq!(snapshot.progress, 0);
        }
        other => panic!("expected idle status, got {:?}", other),
    }

    // Nothing left to retry.
    h.session.on_text(r#"{"type":"retry"}"#).await;
    assert!(matches!(
        h.outbound.recv().await,
        Some(ServerMessage::Rejected { .. })
    ));
    h.token.cancel();
}

#[tokio::test]
async fn oversized_file_is_dropped() {
    let mut h = harness(RampSchedule::immediate(), 4);
    h.session
        .on_text(r#"{"type":"begin_file","file_name":"big.pdf"}"#)
        .await;
    h.session.on_binary(b"12345");
    assert!(matches!(
        h.outbound.recv().await,
        Some(ServerMessage::Rejected { .. })
    ));

    // The partial file was discarded, so ending it has nothing to submit.
    h.session.on_text(r#"{"type":"end_file"}"#).await;
    let messages = until_terminal(&mut h.outbound).await;
    assert!(matches!(messages.as_slice(), [ServerMessage::Rejected { .. }]));
    h.token.cancel();
}

#[tokio::test]
async fn replacing_an_unfinished_file_is_reported() {
    let mut h = harness(RampSchedule::immediate(), 1024);
    h.session
        .on_text(r#"{"type":"begin_file","file_name":"draft.txt"}"#)
        .await;
    h.session.on_binary(b"CGPA 6.0");
    h.session
        .on_text(r#"{"type":"begin_file","file_name":"final.txt"}"#)
        .await;

    match h.outbound.recv().await {
        Some(ServerMessage::Rejected { reason }) => assert!(reason.contains("draft.txt")),
        other => panic!("expected rejection, got {:?}", other),
    }

    // Only the second file's bytes are submitted.
    h.session.on_binary(b"CGPA 9.1");
    h.session.on_text(r#"{"type":"end_file"}"#).await;
    let messages = until_terminal(&mut h.outbound).await;
    match messages.last() {
        Some(ServerMessage::Extracted { criteria, .. }) => {
            assert_eq!(criteria.eligibility.cgpa, 9.1)
        }
        other => panic!("expected extracted, got {:?}", other),
    }
    h.token.cancel();
}

#[tokio::test(start_paused = true)]
async fn double_submit_is_rejected_while_in_flight() {
    let mut h = harness(RampSchedule::default(), 1024);
    h.session
        .on_text(r#"{"type":"submit_text","text":"first"}"#)
        .await;

    // Wait until the first submission is visibly uploading.
    match h.outbound.recv().await {
        Some(ServerMessage::Status { snapshot }) => {
            assert_eq!(snapshot.status, SubmissionStatus::Uploading)
        }
        other => panic!("expected uploading status, got {:?}", other),
    }

    h.session
        .on_text(r#"{"type":"submit_text","text":"second"}"#)
        .await;

    let mut rejected = false;
    loop {
        let messages = until_terminal(&mut h.outbound).await;
        match messages.last() {
            Some(ServerMessage::Rejected { reason }) => {
                assert!(reason.contains("already in flight"));
                rejected = true;
            }
            Some(ServerMessage::Extracted { .. }) => break,
            other => panic!("unexpected terminal message {:?}", other),
        }
    }
    assert!(rejected);
    h.token.cancel();
}
