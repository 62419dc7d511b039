//! Command handlers.
//!
//! This module contains the Handler trait and command registry for
//! dispatching each received line to the right handler.
//!
//! Handlers receive a `CommandRef<'_>` that borrows from the received line.
//! Use `cmd.arg(n)` to access arguments as `&str` slices.

mod channel;
mod connection;
pub mod core;
mod messaging;
mod monitor;

pub use channel::{CreateHandler, DisplayChannelsHandler, JoinHandler, LeaveHandler};
pub use connection::LoginHandler;
pub use core::{Context, Handler, HandlerError, HandlerResult, Registry};
pub use messaging::PrivateHandler;
pub use monitor::{BackHandler, RetrieveHandler, SelectHandler};
