//! Error types for the chanrelay protocol library.
//!
//! This module defines error types for framing failures and for
//! building typed commands out of parsed lines.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Framing errors raised by the line codec.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The line was not valid UTF-8.
    #[error("invalid UTF-8 in line at byte {byte_pos}")]
    Decode {
        /// Byte position where UTF-8 validation failed.
        byte_pos: usize,
    },

    /// Line exceeded the configured maximum length.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Bytes seen so far.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },
}

/// Errors encountered when converting a parsed line into a typed [`Command`](crate::Command).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CommandParseError {
    /// The line does not start with the sentinel character.
    #[error("not a command")]
    NotACommand,

    /// A required argument is absent.
    #[error("missing {argument} for #{command}")]
    MissingArgument {
        /// Command name without the sentinel.
        command: &'static str,
        /// Human-readable argument name.
        argument: &'static str,
    },

    /// Command name is not part of the grammar.
    #[error("unknown command: #{0}")]
    UnknownCommand(String),
}
