pub mod envelope;
pub mod parser;
