//! Error handling for the IR facade
//!
//! Contract violations (foreign handles, malformed instruction sequences,
//! operand type mismatches) are fatal and panic at the call site. The types
//! here cover the recoverable channels: literal parsing, verification and
//! stream opening.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recoverable errors raised while building or checking IR
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("Invalid integer literal '{text}': {message}")]
    InvalidLiteral {
        text: String,
        message: String,
    },

    #[error("Unsupported radix {radix}: expected 2, 8, 10, 16 or 36")]
    UnsupportedRadix { radix: u8 },

    #[error("Integer bit width must be between 1 and {max}, got {bits}")]
    InvalidBitWidth { bits: u32, max: u32 },

    #[error("Verification failed in '{function}': {message}")]
    Verify {
        function: String,
        message: String,
    },
}

impl IrError {
    pub fn invalid_literal(text: &str, message: impl Into<String>) -> Self {
        IrError::InvalidLiteral {
            text: text.to_string(),
            message: message.into(),
        }
    }

    pub fn verify(function: impl Into<String>, message: impl Into<String>) -> Self {
        IrError::Verify {
            function: function.into(),
            message: message.into(),
        }
    }
}

/// Failure to open an output stream
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("{}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StreamError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            StreamError::Open { path, .. } => path,
        }
    }
}
