use std::process::{Command, Stdio};

use crate::shared::error::WorkerError;
use crate::worker::domain::operation::OperationRequest;
use crate::worker::domain::worker_runner::{ExecMode, ProcessOutcome, WorkerRunner};

/// Spawns real worker processes. The argument vector goes straight to the
/// OS, no shell ever sees it.
pub struct SystemWorkerRunner;

impl WorkerRunner for SystemWorkerRunner {
    fn invoke(
        &self,
        request: &OperationRequest,
        mode: ExecMode,
    ) -> Result<ProcessOutcome, WorkerError> {
        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .current_dir(&request.working_dir)
            .envs(request.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null());

        match mode {
            ExecMode::Capture => {
                // `output()` drains stdout and stderr while waiting for
                // exit; reading them one after the other could deadlock on
                // a filled pipe.
                let output = command.output().map_err(|source| WorkerError::Launch {
                    program: request.program.clone(),
                    source,
                })?;
                log::debug!(
                    "{} {:?} exited with {}",
                    request.program,
                    request.kind,
                    output.status
                );
                Ok(ProcessOutcome {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code: output.status.code(),
                })
            }
            ExecMode::Detached => {
                let child = command
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .map_err(|source| WorkerError::Launch {
                        program: request.program.clone(),
                        source,
                    })?;
                log::debug!("detached {} (pid {})", request.program, child.id());
                Ok(ProcessOutcome::default())
            }
        }
    }
}
