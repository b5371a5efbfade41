use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::Receiver;

use facelink_core::protocol::envelope::LiveSessionSummaryEnvelope;
use facelink_core::session::confirmation::AutoConfirm;
use facelink_core::session::orchestrator::SessionOrchestrator;

/// A unit of work handed to a background session thread.
#[derive(Debug, Clone)]
pub enum SessionJob {
    RefreshIdentities,
    AddIdentity { image: PathBuf, label: String },
    DetectFaces { label_hint: String },
    LiveRecognition,
    ResetStore,
}

/// Terminal message sent from the worker thread back to the UI.
/// Every job produces exactly one of these.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Refreshed {
        identities: Vec<String>,
    },
    IdentityAdded {
        identities: Vec<String>,
        label: String,
        message: Option<String>,
    },
    DetectionFinished {
        face_count: u32,
        annotated: Option<PathBuf>,
    },
    LiveFinished {
        summary: Option<LiveSessionSummaryEnvelope>,
    },
    StoreCleared {
        identities: Vec<String>,
    },
    Failed(String),
}

/// Spawn a background thread that runs one session job to completion.
/// The session mutex is held for the whole job, so the UI must not
/// dispatch another job until the event for this one arrives.
pub fn spawn(session: Arc<Mutex<SessionOrchestrator>>, job: SessionJob) -> Receiver<SessionEvent> {
    let (tx, rx) = crossbeam_channel::unbounded::<SessionEvent>();

    thread::spawn(move || {
        let event = run_job(&session, job);
        let _ = tx.send(event);
    });

    rx
}

fn run_job(session: &Arc<Mutex<SessionOrchestrator>>, job: SessionJob) -> SessionEvent {
    let mut session = session.lock().unwrap();
    log::debug!("running session job: {job:?}");

    match job {
        SessionJob::RefreshIdentities => match session.list_identities() {
            Ok(_) => SessionEvent::Refreshed {
                identities: session.registry().identities().to_vec(),
            },
            Err(e) => SessionEvent::Failed(e.to_string()),
        },
        SessionJob::AddIdentity { image, label } => match session.add_identity(&image, &label) {
            Ok(added) => SessionEvent::IdentityAdded {
                identities: session.registry().identities().to_vec(),
                label,
                message: added.message,
            },
            Err(e) => SessionEvent::Failed(e.to_string()),
        },
        SessionJob::DetectFaces { label_hint } => match session.detect_on_image(&label_hint) {
            Ok(report) => SessionEvent::DetectionFinished {
                face_count: report.face_count,
                annotated: report.annotated_path,
            },
            Err(e) => SessionEvent::Failed(e.to_string()),
        },
        SessionJob::LiveRecognition => match session.start_live_recognition() {
            Ok(summary) => SessionEvent::LiveFinished { summary },
            Err(e) => SessionEvent::Failed(e.to_string()),
        },
        SessionJob::ResetStore => {
            // The UI has already asked the user, so the prompt here
            // always answers yes.
            match session.reset_store(&mut AutoConfirm) {
                Ok(_) => SessionEvent::StoreCleared {
                    identities: session.registry().identities().to_vec(),
                },
                Err(e) => SessionEvent::Failed(e.to_string()),
            }
        }
    }
}
