//! Monitor handlers.
//!
//! `#select <id>` makes the caller the monitor of a logged-in user,
//! `#back` ends that, and `#retrieve` replays the caller's own away queue.

use super::{Context, Handler, HandlerError, HandlerResult};
use crate::error::MonitorError;
use async_trait::async_trait;
use chanrelay_proto::{CommandRef, reply};
use tracing::{debug, info};

/// Handler for `#select`.
pub struct SelectHandler;

#[async_trait]
impl Handler for SelectHandler {
    async fn handle(&self, ctx: &Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let target_id = cmd.arg(0).ok_or(HandlerError::NeedMoreParams {
            command: "select",
            argument: "login id",
        })?;
        let me = ctx.login_id()?;

        let target = ctx
            .matrix
            .clients
            .find_by_login(target_id)
            .ok_or_else(|| MonitorError::TargetNotFound(target_id.to_owned()))?;

        // The target may disconnect between lookup and link
        let outcome = ctx
            .matrix
            .monitors
            .select(ctx.uid, target.uid())
            .map_err(|e| match e {
                MonitorError::TargetNotFound(_) => MonitorError::TargetNotFound(target_id.to_owned()),
                other => other,
            })?;

        if let Some(released) = outcome.released.and_then(|uid| ctx.matrix.clients.get(&uid)) {
            released.try_deliver(reply::monitor_released(&me));
        }
        if let Some(displaced) = outcome.displaced {
            // Displaced monitors are not told
            debug!(monitee = %target_id, displaced = %displaced, "Previous monitor displaced");
        }

        info!(monitor = %me, monitee = %target_id, "Monitor linked");
        target.try_deliver(reply::monitor_started(&me));
        ctx.reply(reply::monitoring(target_id)).await
    }
}

/// Handler for `#back`.
pub struct BackHandler;

#[async_trait]
impl Handler for BackHandler {
    async fn handle(&self, ctx: &Context<'_>, _cmd: &CommandRef<'_>) -> HandlerResult {
        let me = ctx.login_id()?;
        let monitee_uid = ctx.matrix.monitors.back(ctx.uid)?;

        let monitee = ctx.matrix.clients.get(&monitee_uid);
        let monitee_id = monitee
            .as_ref()
            .and_then(|c| c.login_id())
            .unwrap_or_else(|| monitee_uid.clone());
        if let Some(monitee) = monitee {
            monitee.try_deliver(reply::monitor_released(&me));
        }

        info!(monitor = %me, monitee = %monitee_id, "Monitor unlinked");
        ctx.reply(reply::monitoring_stopped(&monitee_id)).await
    }
}

/// Handler for `#retrieve`. Replays without clearing.
pub struct RetrieveHandler;

#[async_trait]
impl Handler for RetrieveHandler {
    async fn handle(&self, ctx: &Context<'_>, _cmd: &CommandRef<'_>) -> HandlerResult {
        let entries = ctx.matrix.monitors.away_messages(ctx.uid);

        ctx.reply(reply::AWAY_START).await?;
        for entry in entries {
            ctx.reply(entry).await?;
        }
        ctx.reply(reply::AWAY_END).await
    }
}
