use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    CAMERA_SCRIPT, CASCADE_FILE, PYTHON_PROGRAM, STORE_FILE, WORKER_SCRIPT,
};

/// Everything needed to locate and invoke the worker processes.
///
/// Script, cascade and store paths may be relative; they are resolved
/// against `working_dir` at invocation time, matching how the workers
/// themselves resolve the store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub python: String,
    pub worker_script: PathBuf,
    pub camera_script: PathBuf,
    pub cascade: PathBuf,
    pub store: PathBuf,
    pub working_dir: PathBuf,
    /// Optional recognition match threshold, exported to workers via the
    /// environment. `None` leaves the worker's own default in effect.
    pub match_threshold: Option<f64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            python: PYTHON_PROGRAM.to_string(),
            worker_script: PathBuf::from(WORKER_SCRIPT),
            camera_script: PathBuf::from(CAMERA_SCRIPT),
            cascade: PathBuf::from(CASCADE_FILE),
            store: PathBuf::from(STORE_FILE),
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            match_threshold: None,
        }
    }
}

impl WorkerConfig {
    pub fn cascade_path(&self) -> PathBuf {
        self.resolve(&self.cascade)
    }

    pub fn store_path(&self) -> PathBuf {
        self.resolve(&self.store)
    }

    /// Resolve a possibly relative path the way the workers do, against the
    /// working directory they run in.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}
