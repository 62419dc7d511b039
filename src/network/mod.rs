//! Network module.
//!
//! Contains the Gateway (TCP listener), Connection handler, and rate limiting.

mod connection;
mod gateway;
pub mod limit;

pub use connection::Connection;
pub use gateway::Gateway;
