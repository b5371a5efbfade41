pub const PYTHON_PROGRAM: &str = "python3";

pub const WORKER_SCRIPT: &str = "face_worker.py";
pub const CAMERA_SCRIPT: &str = "camera_window.py";

/// Cascade file the workers load; existence-checked before detection runs.
pub const CASCADE_FILE: &str = "haarcascade_frontalface_default.xml";

/// Identity store maintained by the workers; the only file the client ever
/// touches directly (deleted on reset).
pub const STORE_FILE: &str = "face_database.pkl";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Environment variable the workers read for the recognition match threshold.
pub const THRESHOLD_ENV: &str = "FACE_THRESHOLD";
