//! chanrelay - a line-oriented chat relay server.
//!
//! Clients connect over TCP, log in with `#login`, then chat in the open,
//! in channels, or privately. A monitor may watch another user's private
//! traffic while that user is away.

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod metrics;
pub mod network;
pub mod state;
pub mod telemetry;
