//! Domain managers for server state.
//!
//! Each manager owns one domain of shared state (credentials, live
//! connections, channels, monitor pairs) together with the locking that
//! domain needs.

pub mod account;
pub mod channel;
pub mod client;
pub mod monitor;
