//! # chanrelay-proto
//!
//! Wire grammar for the chanrelay chat server.
//!
//! ## Features
//!
//! - Borrowed parsing of sentinel commands (`#login alice secret`)
//! - Typed client-side commands that serialize to the exact wire line
//! - Server reply text constructors, so every crate agrees on the strings
//! - Optional Tokio line codec for newline-delimited framing
//!
//! ## Quick Start
//!
//! ```rust
//! use chanrelay_proto::{Command, CommandRef};
//!
//! let cmd = CommandRef::parse("#private bob see you at noon").unwrap();
//! assert_eq!(cmd.name(), "private");
//! assert_eq!(cmd.arg(0), Some("bob"));
//! assert_eq!(cmd.text_from(1).as_deref(), Some("see you at noon"));
//!
//! let login = Command::Login {
//!     login_id: "alice".into(),
//!     password: "hunter2".into(),
//! };
//! assert_eq!(login.to_string(), "#login alice hunter2");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod reply;

pub use command::{first_token, is_sentinel, Command, CommandRef, SENTINEL};
pub use error::{CommandParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use line::LineCodec;
