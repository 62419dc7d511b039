//! State management module.
//!
//! Contains the Matrix (shared server state) and the per-connection
//! client record.

mod client;
mod dashmap_ext;
pub mod managers;
mod matrix;
mod uid;

pub use client::{Client, Session};
pub use dashmap_ext::DashMapExt;
pub use matrix::Matrix;
pub use uid::{Uid, UidGenerator};
