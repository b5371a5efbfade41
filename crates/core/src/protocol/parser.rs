use serde::de::DeserializeOwned;

use crate::protocol::envelope::ResponseEnvelope;
use crate::shared::error::WorkerError;
use crate::worker::domain::operation::OperationKind;
use crate::worker::domain::worker_runner::ProcessOutcome;

/// Classify a captured worker outcome into the envelope shape keyed by
/// `kind`.
///
/// Diagnostics win: when stderr holds any non-whitespace text the whole
/// operation failed and that text is surfaced verbatim, stdout is not even
/// inspected. Otherwise stdout must be a JSON object; unknown fields are
/// ignored and missing ones take their defaults, so `{}` is a valid (if
/// uninformative) envelope. Exit codes are deliberately not consulted.
pub fn parse_envelope(
    kind: OperationKind,
    outcome: &ProcessOutcome,
) -> Result<ResponseEnvelope, WorkerError> {
    if !outcome.stderr.trim().is_empty() {
        return Err(WorkerError::WorkerReported(outcome.stderr.clone()));
    }

    match kind {
        OperationKind::ListIdentities => decode(outcome).map(ResponseEnvelope::IdentityList),
        OperationKind::AddIdentity => decode(outcome).map(ResponseEnvelope::IdentityAdd),
        OperationKind::DetectOnImage => decode(outcome).map(ResponseEnvelope::Detection),
        OperationKind::StartLiveRecognition => decode(outcome).map(ResponseEnvelope::LiveSummary),
        OperationKind::ResetStore | OperationKind::CameraWindow => Err(WorkerError::Precondition(
            format!("{kind:?} does not produce a worker response"),
        )),
    }
}

fn decode<T: DeserializeOwned>(outcome: &ProcessOutcome) -> Result<T, WorkerError> {
    let invalid = || {
        log::debug!("undecodable worker stdout: {}", outcome.stdout);
        WorkerError::InvalidResponse {
            raw: outcome.stdout.clone(),
        }
    };
    let value: serde_json::Value = serde_json::from_str(&outcome.stdout).map_err(|_| invalid())?;
    if !value.is_object() {
        return Err(invalid());
    }
    serde_json::from_value(value).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    // --- Helpers ---

    fn captured(stdout: &str, stderr: &str) -> ProcessOutcome {
        ProcessOutcome {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code: Some(0),
        }
    }

    // --- Tests ---

    #[test]
    fn test_detection_fields_round_trip() {
        let outcome = captured(
            r#"{"success":true,"face_count":3,"output_path":"annotated.jpg"}"#,
            "",
        );
        let envelope = parse_envelope(OperationKind::DetectOnImage, &outcome).unwrap();
        let ResponseEnvelope::Detection(detection) = envelope else {
            panic!("wrong variant");
        };
        assert!(detection.success);
        assert_eq!(detection.face_count, 3);
        assert_eq!(detection.output_path.as_deref(), Some("annotated.jpg"));
        assert_eq!(detection.error, None);
    }

    #[test]
    fn test_stderr_wins_over_valid_stdout() {
        let outcome = captured(
            r#"{"success":true,"face_count":3}"#,
            "Traceback (most recent call last):\n  boom\n",
        );
        match parse_envelope(OperationKind::DetectOnImage, &outcome) {
            Err(WorkerError::WorkerReported(text)) => {
                assert_eq!(text, "Traceback (most recent call last):\n  boom\n");
            }
            other => panic!("expected worker-reported failure, got {other:?}"),
        }
    }

    #[test]
    fn test_whitespace_only_stderr_is_not_a_failure() {
        let outcome = ProcessOutcome {
            stdout: r#"{"success":true,"identities":[],"count":0}"#.to_string(),
            stderr: "  \n\t".to_string(),
            exit_code: Some(0),
        };
        assert!(parse_envelope(OperationKind::ListIdentities, &outcome).is_ok());
    }

    #[rstest]
    #[case::truncated(r#"{"success":true,"#)]
    #[case::empty("")]
    #[case::bare_number("42")]
    #[case::array("[1,2,3]")]
    #[case::bare_string("\"ok\"")]
    #[case::null("null")]
    #[case::wrong_type(r#"{"success":true,"face_count":"three"}"#)]
    fn test_unusable_stdout_is_an_invalid_response(#[case] stdout: &str) {
        let outcome = captured(stdout, "");
        match parse_envelope(OperationKind::DetectOnImage, &outcome) {
            Err(WorkerError::InvalidResponse { raw }) => assert_eq!(raw, stdout),
            other => panic!("expected invalid response, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_object_is_a_valid_envelope() {
        let outcome = captured("{}", "");
        let envelope = parse_envelope(OperationKind::AddIdentity, &outcome).unwrap();
        let ResponseEnvelope::IdentityAdd(add) = envelope else {
            panic!("wrong variant");
        };
        assert!(!add.success);
        assert_eq!(add.total_identities, 0);
        assert_eq!(add.message, None);
    }

    #[test]
    fn test_identity_list_preserves_order() {
        let outcome = captured(r#"{"success":true,"identities":["Ada","Grace"],"count":2}"#, "");
        let envelope = parse_envelope(OperationKind::ListIdentities, &outcome).unwrap();
        let ResponseEnvelope::IdentityList(list) = envelope else {
            panic!("wrong variant");
        };
        assert_eq!(list.identities, vec!["Ada", "Grace"]);
        assert_eq!(list.count, 2);
    }

    #[test]
    fn test_live_summary_average_is_not_rounded() {
        let outcome = captured(
            r#"{"success":true,"total_faces_detected":7,"frames_processed":3,"average_faces_per_frame":2.3333}"#,
            "",
        );
        let envelope = parse_envelope(OperationKind::StartLiveRecognition, &outcome).unwrap();
        let ResponseEnvelope::LiveSummary(summary) = envelope else {
            panic!("wrong variant");
        };
        assert_eq!(summary.total_faces_detected, 7);
        assert_relative_eq!(summary.average_faces_per_frame, 2.3333);
    }

    #[test]
    fn test_nonzero_exit_with_clean_streams_still_parses() {
        let outcome = ProcessOutcome {
            stdout: r#"{"success":true,"identities":["Ada"],"count":1}"#.to_string(),
            stderr: String::new(),
            exit_code: Some(2),
        };
        assert!(parse_envelope(OperationKind::ListIdentities, &outcome).is_ok());
    }

    #[rstest]
    #[case::reset(OperationKind::ResetStore)]
    #[case::camera(OperationKind::CameraWindow)]
    fn test_local_operations_never_parse(#[case] kind: OperationKind) {
        let outcome = captured("{}", "");
        match parse_envelope(kind, &outcome) {
            Err(WorkerError::Precondition(_)) => {}
            other => panic!("expected precondition error, got {other:?}"),
        }
    }
}
