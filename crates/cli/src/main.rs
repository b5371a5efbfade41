use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use facelink_core::session::confirmation::{AutoConfirm, ConfirmationPrompt};
use facelink_core::session::orchestrator::SessionOrchestrator;
use facelink_core::shared::config::WorkerConfig;
use facelink_core::shared::constants::{
    CAMERA_SCRIPT, CASCADE_FILE, PYTHON_PROGRAM, STORE_FILE, WORKER_SCRIPT,
};
use facelink_core::worker::infrastructure::system_runner::SystemWorkerRunner;

/// Front-end for external face-detection and recognition workers.
#[derive(Parser)]
#[command(name = "facelink")]
struct Cli {
    /// Interpreter used to run the worker scripts.
    #[arg(long, default_value = PYTHON_PROGRAM)]
    python: String,

    /// Worker script implementing the wire operations.
    #[arg(long, default_value = WORKER_SCRIPT)]
    script: PathBuf,

    /// Script behind the detached camera window.
    #[arg(long, default_value = CAMERA_SCRIPT)]
    camera_script: PathBuf,

    /// Cascade file passed to every worker operation.
    #[arg(long, default_value = CASCADE_FILE)]
    cascade: PathBuf,

    /// Identity store file maintained by the workers.
    #[arg(long, default_value = STORE_FILE)]
    store: PathBuf,

    /// Directory the workers run in; relative paths resolve against it.
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Recognition match threshold (0.0-1.0), exported to the workers.
    #[arg(long)]
    threshold: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the known identities.
    List,

    /// Register a new identity from an image.
    Add {
        /// Image showing the face to register.
        image: PathBuf,
        /// Label to register the face under.
        label: String,
    },

    /// Detect faces on an image and report the annotated output.
    Detect {
        /// Image to scan.
        image: PathBuf,
        /// Label hint forwarded to the worker.
        #[arg(long, default_value = "")]
        label_hint: String,
    },

    /// Open the live recognition window; blocks until it is closed.
    Live,

    /// Launch the legacy camera window and detach.
    Camera,

    /// Delete the identity store.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;
    let mut session = SessionOrchestrator::new(config, Box::new(SystemWorkerRunner));

    match cli.command {
        Command::List => run_list(&mut session),
        Command::Add { image, label } => run_add(&mut session, image, &label),
        Command::Detect { image, label_hint } => run_detect(&mut session, image, &label_hint),
        Command::Live => run_live(&mut session),
        Command::Camera => {
            session.launch_camera_window()?;
            println!("Camera window launched.");
            Ok(())
        }
        Command::Reset { yes } => run_reset(&mut session, yes),
    }
}

fn run_list(session: &mut SessionOrchestrator) -> Result<(), Box<dyn std::error::Error>> {
    let count = session.list_identities()?;
    if count == 0 {
        println!("No identities registered.");
    } else {
        println!("Known identities ({count}):");
        for name in session.registry().identities() {
            println!("  {name}");
        }
    }
    Ok(())
}

fn run_add(
    session: &mut SessionOrchestrator,
    image: PathBuf,
    label: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let added = session.add_identity(&image, label)?;
    match added.message {
        Some(message) => println!("{message}"),
        None => println!("Registered '{label}'."),
    }
    println!("Known identities: {}", session.registry().len());
    Ok(())
}

fn run_detect(
    session: &mut SessionOrchestrator,
    image: PathBuf,
    label_hint: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    session.select_image(image);
    let report = session.detect_on_image(label_hint)?;
    log::info!("detection complete, {} face(s)", report.face_count);
    println!("Detected {} face(s).", report.face_count);
    match report.annotated_path {
        Some(path) => println!("Annotated image: {}", path.display()),
        None => println!("No annotated image was produced."),
    }
    Ok(())
}

fn run_live(session: &mut SessionOrchestrator) -> Result<(), Box<dyn std::error::Error>> {
    // Fresh process, so the registry starts empty; live recognition
    // refuses to run without known identities.
    session.list_identities()?;
    log::info!("starting live recognition session");
    println!("Opening the live recognition window; close it to finish.");
    match session.start_live_recognition()? {
        Some(summary) => {
            println!("Session summary:");
            println!("  Faces detected:   {}", summary.total_faces_detected);
            println!("  Frames processed: {}", summary.frames_processed);
            // Rounded here and only here; the envelope keeps full precision.
            println!(
                "  Faces per frame:  {:.2}",
                summary.average_faces_per_frame
            );
        }
        None => println!("Session ended (no summary reported)."),
    }
    Ok(())
}

fn run_reset(
    session: &mut SessionOrchestrator,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let completed = if yes {
        session.reset_store(&mut AutoConfirm)?
    } else {
        session.reset_store(&mut StdinPrompt)?
    };
    if completed {
        println!(
            "Identity store reset. Known identities: {}",
            session.registry().len()
        );
    } else {
        println!("Reset cancelled.");
    }
    Ok(())
}

/// Asks on the terminal. Anything but an explicit yes, including EOF,
/// declines.
struct StdinPrompt;

impl ConfirmationPrompt for StdinPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        print!("{message} [y/N]: ");
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

fn build_config(cli: &Cli) -> Result<WorkerConfig, Box<dyn std::error::Error>> {
    let working_dir = match &cli.workdir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    Ok(WorkerConfig {
        python: cli.python.clone(),
        worker_script: cli.script.clone(),
        camera_script: cli.camera_script.clone(),
        cascade: cli.cascade.clone(),
        store: cli.store.clone(),
        working_dir,
        match_threshold: cli.threshold,
    })
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(threshold) = cli.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(format!(
                "Threshold must be between 0.0 and 1.0, got {threshold}"
            )
            .into());
        }
    }
    if let Some(dir) = &cli.workdir {
        if !dir.is_dir() {
            return Err(format!("Working directory not found: {}", dir.display()).into());
        }
    }
    Ok(())
}
