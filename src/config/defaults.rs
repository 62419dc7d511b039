//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Port the chat service listens on when nothing is configured.
pub const DEFAULT_PORT: u16 = 5555;

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_server_name() -> String {
    "chanrelay".to_string()
}

// =============================================================================
// Listen Defaults
// =============================================================================

pub fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
}

// =============================================================================
// Accounts Defaults
// =============================================================================

pub fn default_accounts_path() -> PathBuf {
    PathBuf::from("accounts.txt")
}

// =============================================================================
// Limits Defaults
// =============================================================================

/// Zero leaves flood control off.
pub fn default_message_rate() -> f32 {
    0.0
}

pub fn default_message_burst() -> f32 {
    20.0
}

pub fn default_max_line_length() -> usize {
    4096
}

pub fn default_send_queue() -> usize {
    64
}
