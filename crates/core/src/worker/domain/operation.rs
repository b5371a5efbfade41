use std::path::{Path, PathBuf};

use crate::shared::config::WorkerConfig;
use crate::shared::constants::THRESHOLD_ENV;

/// One variant per user intent the session layer exposes.
///
/// `ResetStore` and `CameraWindow` never travel over the wire protocol:
/// resets are performed client-side by deleting the store file, and the
/// camera window emits no structured response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    ListIdentities,
    AddIdentity,
    DetectOnImage,
    StartLiveRecognition,
    ResetStore,
    CameraWindow,
}

/// A fully built worker invocation. Immutable once constructed; built
/// fresh for every call and never reused.
///
/// `args` is passed to the process as-is, one entry per OS argument, so
/// labels and paths containing spaces or quotes survive intact. The first
/// entry is always the script path.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub kind: OperationKind,
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub env: Vec<(String, String)>,
}

impl OperationRequest {
    pub fn list_identities(config: &WorkerConfig) -> Self {
        Self::on_wire(config, OperationKind::ListIdentities, "list_people", vec![])
    }

    pub fn add_identity(config: &WorkerConfig, image: &Path, label: &str) -> Self {
        Self::on_wire(
            config,
            OperationKind::AddIdentity,
            "add_person",
            vec![path_arg(image), label.to_string()],
        )
    }

    pub fn detect_on_image(config: &WorkerConfig, image: &Path, label_hint: &str) -> Self {
        Self::on_wire(
            config,
            OperationKind::DetectOnImage,
            "detect",
            vec![path_arg(image), label_hint.to_string()],
        )
    }

    pub fn live_recognition(config: &WorkerConfig) -> Self {
        Self::on_wire(
            config,
            OperationKind::StartLiveRecognition,
            "recognize",
            vec![],
        )
    }

    /// The legacy camera window takes no arguments beyond its script and
    /// provides no structured output.
    pub fn camera_window(config: &WorkerConfig) -> Self {
        Self {
            kind: OperationKind::CameraWindow,
            program: config.python.clone(),
            args: vec![path_arg(&config.camera_script)],
            working_dir: config.working_dir.clone(),
            env: vec![],
        }
    }

    /// Wire convention: `<script> <operation> <config-path> [tail...]`.
    fn on_wire(
        config: &WorkerConfig,
        kind: OperationKind,
        operation: &str,
        tail: Vec<String>,
    ) -> Self {
        let mut args = vec![
            path_arg(&config.worker_script),
            operation.to_string(),
            path_arg(&config.cascade),
        ];
        args.extend(tail);

        let env = config
            .match_threshold
            .map(|threshold| (THRESHOLD_ENV.to_string(), threshold.to_string()))
            .into_iter()
            .collect();

        Self {
            kind,
            program: config.python.clone(),
            args,
            working_dir: config.working_dir.clone(),
            env,
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
