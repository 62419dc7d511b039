//! Unified error handling for chanrelay.
//!
//! This module provides the error hierarchy for the server, with automatic
//! conversions, reply text generation, and metric labeling.

use chanrelay_proto::reply;
use thiserror::Error;
use tokio::sync::mpsc;

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Password did not match; the connection is closed after the notice.
    #[error("authentication rejected")]
    AuthRejected,

    #[error("missing {argument} for #{command}")]
    NeedMoreParams {
        command: &'static str,
        argument: &'static str,
    },

    #[error("no text to send")]
    NoTextToSend,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("already logged in as {0}")]
    AlreadyLoggedIn(String),

    #[error("{0} is already logged on")]
    LoginInUse(String),

    #[error("invalid login id: {0}")]
    InvalidLoginId(String),

    #[error("unknown command: #{0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<String>),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AuthRejected => "auth_rejected",
            Self::NeedMoreParams { .. } => "need_more_params",
            Self::NoTextToSend => "no_text_to_send",
            Self::NotLoggedIn => "not_logged_in",
            Self::AlreadyLoggedIn(_) => "already_logged_in",
            Self::LoginInUse(_) => "login_in_use",
            Self::InvalidLoginId(_) => "invalid_login_id",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Channel(e) => e.error_code(),
            Self::Monitor(e) => e.error_code(),
            Self::Send(_) => "send_error",
        }
    }

    /// Convert to the line sent back to the originating client.
    ///
    /// Returns `None` for errors that don't warrant a client-visible reply.
    pub fn to_reply(&self) -> Option<String> {
        let text = match self {
            Self::AuthRejected => return Some(reply::AUTH_REJECTED.to_string()),
            Self::NeedMoreParams { command, argument } => {
                reply::error(format_args!("Missing {} for #{}", argument, command))
            }
            Self::NoTextToSend => reply::error("No text to send"),
            Self::NotLoggedIn => reply::error("You must #login first"),
            Self::AlreadyLoggedIn(id) => {
                reply::error(format_args!("You are already logged in as {}", id))
            }
            Self::LoginInUse(id) => reply::error(format_args!("{} is already logged on", id)),
            Self::InvalidLoginId(id) => reply::error(format_args!("Invalid login id {}", id)),
            Self::UnknownCommand(name) => reply::error(format_args!("Unknown command #{}", name)),
            Self::Channel(e) => reply::error(e),
            Self::Monitor(e) => reply::error(e),

            // The client is unreachable
            Self::Send(_) => return None,
        };
        Some(text)
    }

    /// Whether the connection must be closed after the reply is sent.
    pub fn closes_connection(&self) -> bool {
        matches!(self, Self::AuthRejected | Self::Send(_))
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Channel Errors
// ============================================================================

/// Channel registry errors. `Display` is the user-visible text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("Channel name taken")]
    ChannelExists(String),

    #[error("Channel does not exist")]
    NoSuchChannel(String),

    #[error("You are already in a channel")]
    AlreadyInChannel,

    #[error("You are not in a channel")]
    NotInChannel,
}

impl ChannelError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ChannelExists(_) => "channel_exists",
            Self::NoSuchChannel(_) => "no_such_channel",
            Self::AlreadyInChannel => "already_in_channel",
            Self::NotInChannel => "not_in_channel",
        }
    }
}

// ============================================================================
// Monitor Errors
// ============================================================================

/// Routing and monitoring errors. `Display` is the user-visible text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    #[error("User {0} is not logged on")]
    TargetNotFound(String),

    #[error("You are not monitoring anyone")]
    NoActiveMonitor,

    #[error("You cannot monitor yourself")]
    CannotMonitorSelf,
}

impl MonitorError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TargetNotFound(_) => "target_not_found",
            Self::NoActiveMonitor => "no_active_monitor",
            Self::CannotMonitorSelf => "cannot_monitor_self",
        }
    }
}

// ============================================================================
// Store Errors (credential file)
// ============================================================================

/// Credential file errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_codes() {
        assert_eq!(HandlerError::NotLoggedIn.error_code(), "not_logged_in");
        assert_eq!(
            HandlerError::from(ChannelError::NotInChannel).error_code(),
            "not_in_channel"
        );
        assert_eq!(
            HandlerError::from(mpsc::error::SendError(String::new())).error_code(),
            "send_error"
        );
    }

    #[test]
    fn test_handler_error_to_reply() {
        assert_eq!(
            HandlerError::from(ChannelError::ChannelExists("lobby".into())).to_reply(),
            Some("Error. Channel name taken".to_string())
        );
        assert_eq!(
            HandlerError::from(MonitorError::NoActiveMonitor).to_reply(),
            Some("Error. You are not monitoring anyone".to_string())
        );
        assert_eq!(
            HandlerError::UnknownCommand("dance".into()).to_reply(),
            Some("Error. Unknown command #dance".to_string())
        );

        // Nothing is sent back over a dead queue
        assert!(
            HandlerError::from(mpsc::error::SendError(String::new()))
                .to_reply()
                .is_none()
        );
    }

    #[test]
    fn test_missing_argument_reply() {
        let err = HandlerError::NeedMoreParams {
            command: "join",
            argument: "channel name",
        };
        assert_eq!(
            err.to_reply(),
            Some("Error. Missing channel name for #join".to_string())
        );
    }

    #[test]
    fn test_only_auth_rejection_closes() {
        assert!(HandlerError::AuthRejected.closes_connection());
        assert!(!HandlerError::NotLoggedIn.closes_connection());
        assert!(!HandlerError::from(MonitorError::NoActiveMonitor).closes_connection());
    }
}
