pub mod config;
pub mod discovery;
pub mod errors;
pub mod publish;
pub mod report;
