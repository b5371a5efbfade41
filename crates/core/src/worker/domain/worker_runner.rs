use crate::shared::error::WorkerError;
use crate::worker::domain::operation::OperationRequest;

/// How an invocation relates to the process it spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Await process exit and capture both output streams for parsing.
    Capture,
    /// Start the process and return immediately; its output is discarded
    /// and the process outlives the call.
    Detached,
}

/// Captured result of one awaited worker process. Produced exactly once
/// per invocation and handed straight to the envelope parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Seam between the session layer and the operating system.
///
/// Implementations must pass the argument vector through without any shell
/// in between. In `Detached` mode the returned outcome is empty.
pub trait WorkerRunner: Send {
    fn invoke(&self, request: &OperationRequest, mode: ExecMode)
        -> Result<ProcessOutcome, WorkerError>;
}
