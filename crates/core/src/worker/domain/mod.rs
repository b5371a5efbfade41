pub mod operation;
pub mod worker_runner;
