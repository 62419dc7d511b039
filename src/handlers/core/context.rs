//! Command handler context and core types.
//!
//! Defines the `Context<'a>` struct passed to all handlers and the
//! `Handler` trait they implement.

use async_trait::async_trait;
use chanrelay_proto::CommandRef;
use std::net::SocketAddr;
use std::sync::Arc;

pub use crate::error::{HandlerError, HandlerResult};
use crate::state::{Client, Matrix};

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The connection's unique ID.
    pub uid: &'a str,
    /// The connection's client record.
    pub client: &'a Arc<Client>,
    /// Shared server state.
    pub matrix: &'a Arc<Matrix>,
    /// Remote address of the client.
    pub remote_addr: SocketAddr,
}

impl<'a> Context<'a> {
    pub fn new(client: &'a Arc<Client>, matrix: &'a Arc<Matrix>) -> Self {
        Self {
            uid: client.uid(),
            client,
            matrix,
            remote_addr: client.addr(),
        }
    }

    /// Queue a line for this connection, waiting for queue capacity.
    #[inline]
    pub async fn reply(&self, line: impl Into<String>) -> HandlerResult {
        self.client.send(line.into()).await?;
        Ok(())
    }

    /// The login id of this connection, or `NotLoggedIn`.
    pub fn login_id(&self) -> Result<String, HandlerError> {
        self.client.login_id().ok_or(HandlerError::NotLoggedIn)
    }
}

/// A command handler.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Whether the command may run before `#login`.
    fn allows_anonymous(&self) -> bool {
        false
    }

    /// Handle one parsed command.
    async fn handle(&self, ctx: &Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult;
}
