//! Login handler.
//!
//! `#login <id> <password>` authenticates the connection, registering the
//! id on first use. A live id cannot be claimed by a second connection.

use super::{Context, Handler, HandlerError, HandlerResult};
use crate::state::managers::account::{AuthOutcome, is_valid_login_id};
use async_trait::async_trait;
use chanrelay_proto::{CommandRef, reply};
use tracing::{info, warn};

/// Handler for `#login`.
pub struct LoginHandler;

#[async_trait]
impl Handler for LoginHandler {
    fn allows_anonymous(&self) -> bool {
        true
    }

    async fn handle(&self, ctx: &Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let login_id = cmd.arg(0).ok_or(HandlerError::NeedMoreParams {
            command: "login",
            argument: "login id",
        })?;
        let password = cmd.arg(1).ok_or(HandlerError::NeedMoreParams {
            command: "login",
            argument: "password",
        })?;

        if let Some(current) = ctx.client.login_id() {
            return Err(HandlerError::AlreadyLoggedIn(current));
        }
        if !is_valid_login_id(login_id) {
            return Err(HandlerError::InvalidLoginId(login_id.to_owned()));
        }

        // Claim before authenticating so a refused login never registers an account
        if !ctx.matrix.clients.claim_login(login_id, ctx.uid) {
            return Err(HandlerError::LoginInUse(login_id.to_owned()));
        }

        let outcome = ctx.matrix.accounts.authenticate(login_id, password);
        if outcome == AuthOutcome::Rejected {
            ctx.matrix.clients.release_login(login_id, ctx.uid);
            crate::metrics::record_login_rejected();
            warn!(uid = %ctx.uid, addr = %ctx.remote_addr, login = %login_id, "Login rejected");
            return Err(HandlerError::AuthRejected);
        }

        ctx.client.set_login_id(login_id.to_owned());
        info!(
            uid = %ctx.uid,
            login = %login_id,
            registered = outcome == AuthOutcome::Registered,
            "Client logged in"
        );

        ctx.matrix.clients.broadcast(&reply::logged_on(login_id));
        Ok(())
    }
}
