//! Command implementations for the CLI
//!
//! - start: Start the web server
//! - check: Load configuration and artifacts and run a smoke prediction
//! - config: Configuration display

pub mod check;
pub mod config;
pub mod start;
