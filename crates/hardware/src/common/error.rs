//! Simulator error definitions.
//!
//! This module defines the error handling for the simulator. It provides:
//! 1. **Configuration Errors:** Missing or invalid parameters, detected at load time.
//! 2. **Hierarchy Errors:** A write-through level receiving a writeback from above.
//! 3. **Invariant Violations:** Internal contract failures that indicate a simulator bug.
//! 4. **Input Errors:** Malformed trace records and I/O failures.

use thiserror::Error;

/// Errors raised while building or running a simulation.
///
/// Configuration and invariant errors are fatal: the simulator never retries
/// and never substitutes defaults. End of trace is not an error.
#[derive(Debug, Error)]
pub enum SimError {
    /// A configuration key is missing, malformed, or out of range.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// The configuration document is not well-formed JSON.
    #[error("malformed configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A write-through level was asked to absorb a writeback.
    ///
    /// No valid hierarchy places a write-back level above a write-through
    /// one, so this always points at the configuration.
    #[error("write-through level `{level}` received a writeback for {addr:#x}")]
    IllegalWriteBack {
        /// Name of the offending level.
        level: String,
        /// Address carried by the writeback request.
        addr: u64,
    },

    /// An internal contract was broken.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    /// A trace record could not be decoded.
    #[error("malformed trace: {0}")]
    Trace(String),

    /// Reading a configuration or trace file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Builds a [`SimError::ConfigInvalid`] from anything printable.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigInvalid(msg.into())
    }

    /// Builds a [`SimError::InvariantViolation`] from anything printable.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Returns `true` for configuration-class errors.
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigInvalid(_) | Self::ConfigParse(_) | Self::IllegalWriteBack { .. }
        )
    }
}

/// Result alias used throughout the simulator.
pub type SimResult<T> = Result<T, SimError>;
