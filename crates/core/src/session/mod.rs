pub mod confirmation;
pub mod orchestrator;
pub mod registry;
pub mod selection;
