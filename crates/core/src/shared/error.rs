use thiserror::Error;

/// One variant per failure class; every variant is terminal for the
/// triggering operation, nothing is retried.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The worker process never started (missing interpreter, missing
    /// script, permissions). Distinct from a worker that ran and failed.
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The worker ran and reported failure, either as stderr diagnostics
    /// or a `success: false` envelope. Text is surfaced verbatim.
    #[error("{0}")]
    WorkerReported(String),

    /// Stdout was not a JSON object. The raw text is kept for logging,
    /// not for display.
    #[error("worker returned an invalid response")]
    InvalidResponse { raw: String },

    /// Rejected before any process was spawned.
    #[error("{0}")]
    Precondition(String),

    /// The store file exists but could not be removed during a reset.
    #[error("failed to delete identity store {path}: {source}")]
    StoreDelete {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
