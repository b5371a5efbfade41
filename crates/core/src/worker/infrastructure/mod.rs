pub mod system_runner;
