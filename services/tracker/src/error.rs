//! services/tracker/src/error.rs
//!
//! Defines the primary error type for the tracker service.

use crate::config::ConfigError;
use health_journal_core::ports::PortError;

/// The primary error type for the `tracker` service.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core storage ports.
    #[error("Storage Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error on the console streams.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The console input ended while a prompt was waiting for an answer.
    #[error("Input closed")]
    InputClosed,

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
