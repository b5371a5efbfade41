use std::path::{Path, PathBuf};

use crate::protocol::envelope::{LiveSessionSummaryEnvelope, ResponseEnvelope};
use crate::protocol::parser::parse_envelope;
use crate::session::confirmation::ConfirmationPrompt;
use crate::session::registry::IdentityRegistry;
use crate::session::selection::ImageSelection;
use crate::shared::config::WorkerConfig;
use crate::shared::error::WorkerError;
use crate::worker::domain::operation::OperationRequest;
use crate::worker::domain::worker_runner::{ExecMode, WorkerRunner};

/// Result of a successful registration as acknowledged by the worker. The
/// registry itself is resynchronized from a fresh list and stays the
/// source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedIdentity {
    pub message: Option<String>,
    pub advisory_total: u32,
}

/// Outcome of a successful single-image detection. `annotated_path` is
/// only present when the worker's reported output file actually exists.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionReport {
    pub face_count: u32,
    pub annotated_path: Option<PathBuf>,
}

/// Façade over the worker protocol: one method per user intent, each a
/// strict build-request → invoke → parse → update-state sequence.
///
/// Taking `&mut self` for every invoking method makes the one-at-a-time
/// rule a borrow-checker fact: a second synchronous invocation cannot
/// start while one is outstanding on the same session.
pub struct SessionOrchestrator {
    config: WorkerConfig,
    runner: Box<dyn WorkerRunner>,
    registry: IdentityRegistry,
    selection: ImageSelection,
}

impl SessionOrchestrator {
    pub fn new(config: WorkerConfig, runner: Box<dyn WorkerRunner>) -> Self {
        Self {
            config,
            runner,
            registry: IdentityRegistry::default(),
            selection: ImageSelection::default(),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &ImageSelection {
        &self.selection
    }

    pub fn select_image(&mut self, path: PathBuf) {
        log::info!("selected image {}", path.display());
        self.selection.select(path);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Refresh the registry from the worker's durable store. On any
    /// failure the previous snapshot stays in place.
    pub fn list_identities(&mut self) -> Result<usize, WorkerError> {
        self.require_script(&self.config.worker_script)?;
        let request = OperationRequest::list_identities(&self.config);
        let outcome = self.runner.invoke(&request, ExecMode::Capture)?;
        let ResponseEnvelope::IdentityList(list) = parse_envelope(request.kind, &outcome)? else {
            return Err(WorkerError::InvalidResponse {
                raw: outcome.stdout,
            });
        };
        if !list.success {
            return Err(WorkerError::WorkerReported(
                "worker could not list known identities".to_string(),
            ));
        }
        if list.count as usize != list.identities.len() {
            log::warn!(
                "worker count {} disagrees with list length {}",
                list.count,
                list.identities.len()
            );
        }
        self.registry.replace(list.identities);
        log::info!("registry refreshed, {} identities", self.registry.len());
        Ok(self.registry.len())
    }

    /// Register a new identity from an image, then resynchronize the
    /// registry. Label and image are validated before anything spawns.
    pub fn add_identity(&mut self, image: &Path, label: &str) -> Result<AddedIdentity, WorkerError> {
        if label.trim().is_empty() {
            return Err(WorkerError::Precondition(
                "identity label cannot be blank".to_string(),
            ));
        }
        if !self.config.resolve(image).is_file() {
            return Err(WorkerError::Precondition(format!(
                "image file not found: {}",
                image.display()
            )));
        }
        self.require_script(&self.config.worker_script)?;

        let request = OperationRequest::add_identity(&self.config, image, label);
        let outcome = self.runner.invoke(&request, ExecMode::Capture)?;
        let ResponseEnvelope::IdentityAdd(add) = parse_envelope(request.kind, &outcome)? else {
            return Err(WorkerError::InvalidResponse {
                raw: outcome.stdout,
            });
        };
        if !add.success {
            return Err(WorkerError::WorkerReported(add.error.unwrap_or_else(
                || "worker rejected the identity".to_string(),
            )));
        }

        // The write is durable even if the follow-up list fails, so a
        // refresh failure downgrades to a warning and a stale snapshot.
        if let Err(err) = self.list_identities() {
            log::warn!("registry refresh after registration failed: {err}");
        }

        Ok(AddedIdentity {
            message: add.message,
            advisory_total: add.total_identities,
        })
    }

    /// Run detection on the currently selected image. The selection, the
    /// cascade and the script are all re-checked on disk at call time.
    pub fn detect_on_image(&mut self, label_hint: &str) -> Result<DetectionReport, WorkerError> {
        let Some(source) = self.selection.source().map(Path::to_path_buf) else {
            return Err(WorkerError::Precondition(
                "no image selected, select an image first".to_string(),
            ));
        };
        if !self.config.resolve(&source).is_file() {
            return Err(WorkerError::Precondition(format!(
                "selected image no longer exists: {}",
                source.display()
            )));
        }
        self.require_cascade()?;
        self.require_script(&self.config.worker_script)?;

        let request = OperationRequest::detect_on_image(&self.config, &source, label_hint);
        let outcome = self.runner.invoke(&request, ExecMode::Capture)?;
        let ResponseEnvelope::Detection(detection) = parse_envelope(request.kind, &outcome)? else {
            return Err(WorkerError::InvalidResponse {
                raw: outcome.stdout,
            });
        };
        if !detection.success {
            return Err(WorkerError::WorkerReported(
                detection
                    .error
                    .unwrap_or_else(|| "worker reported a detection failure".to_string()),
            ));
        }

        // A worker may name an output file it never managed to write;
        // only a file present on disk counts as a visual result.
        let annotated = detection
            .output_path
            .as_deref()
            .map(|reported| self.config.resolve(Path::new(reported)))
            .filter(|path| path.is_file());
        match &annotated {
            Some(path) => self.selection.set_annotated(path.clone()),
            None if detection.output_path.is_some() => {
                log::warn!("worker reported an output file that does not exist");
            }
            None => {}
        }

        Ok(DetectionReport {
            face_count: detection.face_count,
            annotated_path: annotated,
        })
    }

    /// Open the interactive recognition window and block until the user
    /// closes it. The returned summary is best effort: a session that ends
    /// without a readable one is still a successful session.
    pub fn start_live_recognition(
        &mut self,
    ) -> Result<Option<LiveSessionSummaryEnvelope>, WorkerError> {
        if self.registry.is_empty() {
            return Err(WorkerError::Precondition(
                "no known identities registered, add at least one before starting live recognition"
                    .to_string(),
            ));
        }
        self.require_cascade()?;
        self.require_script(&self.config.worker_script)?;

        let request = OperationRequest::live_recognition(&self.config);
        let outcome = self.runner.invoke(&request, ExecMode::Capture)?;
        match parse_envelope(request.kind, &outcome) {
            Ok(ResponseEnvelope::LiveSummary(summary)) if summary.success => Ok(Some(summary)),
            Ok(_) => Ok(None),
            Err(err @ WorkerError::WorkerReported(_)) => Err(err),
            Err(err) => {
                log::debug!("live session ended without a readable summary: {err}");
                Ok(None)
            }
        }
    }

    /// Delete the worker's durable store after confirmation, then refresh
    /// to observe the empty registry. Returns `Ok(false)` when declined.
    /// A store file that is already gone is not an error.
    pub fn reset_store(
        &mut self,
        prompt: &mut dyn ConfirmationPrompt,
    ) -> Result<bool, WorkerError> {
        if !prompt.confirm("All registered identities will be deleted. Are you sure?") {
            log::info!("store reset declined");
            return Ok(false);
        }

        let store = self.config.store_path();
        match std::fs::remove_file(&store) {
            Ok(()) => log::info!("deleted identity store {}", store.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(WorkerError::StoreDelete { path: store, source }),
        }
        self.registry.clear();
        self.list_identities()?;
        Ok(true)
    }

    /// Launch the legacy camera window and detach from it. The window is
    /// its own feedback; no result is awaited.
    pub fn launch_camera_window(&mut self) -> Result<(), WorkerError> {
        self.require_script(&self.config.camera_script)?;
        let request = OperationRequest::camera_window(&self.config);
        self.runner.invoke(&request, ExecMode::Detached)?;
        log::info!("camera window launched");
        Ok(())
    }

    fn require_cascade(&self) -> Result<(), WorkerError> {
        let cascade = self.config.cascade_path();
        if cascade.is_file() {
            Ok(())
        } else {
            Err(WorkerError::Precondition(format!(
                "cascade file not found: {}",
                cascade.display()
            )))
        }
    }

    /// A script missing from disk would still spawn the interpreter, whose
    /// own diagnostic would then read as a worker-reported failure.
    fn require_script(&self, script: &Path) -> Result<(), WorkerError> {
        let resolved = self.config.resolve(script);
        if resolved.is_file() {
            Ok(())
        } else {
            Err(WorkerError::Launch {
                program: resolved.to_string_lossy().into_owned(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }
}
