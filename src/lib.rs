// Library surface for headless/integration tests and reuse.
// The binary in main.rs only wires the terminal, logging and CLI around it.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod finger;
pub mod ledger;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod thok;
pub mod ui;
pub mod words;

pub use error::{Error, Result};
