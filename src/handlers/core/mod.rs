//! Core handler infrastructure.
//!
//! This module contains the handler registry, the context passed to each
//! handler, and the `Handler` trait.

pub mod context;
pub mod registry;

pub use context::{Context, Handler, HandlerError, HandlerResult};
pub use registry::Registry;
