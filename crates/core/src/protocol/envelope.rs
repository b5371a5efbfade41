use serde::Deserialize;

/// Result of a single-image detection run.
///
/// Every field is defaulted so a structurally empty object still decodes;
/// workers are free to omit what they have nothing to say about.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectionEnvelope {
    pub success: bool,
    pub face_count: u32,
    pub output_path: Option<String>,
    pub error: Option<String>,
}

/// Snapshot of the durable identity store, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IdentityListEnvelope {
    pub success: bool,
    pub identities: Vec<String>,
    pub count: u32,
}

/// Acknowledgement of a registration. `total_identities` is advisory; the
/// registry resynchronizes from a fresh list instead of trusting it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IdentityAddEnvelope {
    pub success: bool,
    pub message: Option<String>,
    pub total_identities: u32,
    pub error: Option<String>,
}

/// Terminal statistics of a live-recognition session. Best effort: the
/// session's value was its own window, not this report.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LiveSessionSummaryEnvelope {
    pub success: bool,
    pub total_faces_detected: u32,
    pub frames_processed: u32,
    /// Kept as reported; rounding happens at the presentation boundary.
    pub average_faces_per_frame: f64,
}

/// Every shape a worker can emit on stdout, one variant per wire operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    Detection(DetectionEnvelope),
    IdentityList(IdentityListEnvelope),
    IdentityAdd(IdentityAddEnvelope),
    LiveSummary(LiveSessionSummaryEnvelope),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_decodes_to_defaults() {
        let envelope: DetectionEnvelope = serde_json::from_str("{}").unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.face_count, 0);
        assert_eq!(envelope.output_path, None);
        assert_eq!(envelope.error, None);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let envelope: IdentityListEnvelope = serde_json::from_str(
            r#"{"success":true,"identities":["Ada"],"count":1,"debug_timing_ms":42}"#,
        )
        .unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.identities, vec!["Ada"]);
    }
}
