//! Messaging handlers.
//!
//! Handles `#private` and plain chat lines broadcast to everyone.

use super::{Context, Handler, HandlerError, HandlerResult};
use crate::error::MonitorError;
use async_trait::async_trait;
use chanrelay_proto::{CommandRef, reply};
use tracing::debug;

/// Handler for `#private <id> <words...>`.
///
/// The recipient gets the message; if it is monitored, its monitor gets a
/// copy and the recipient's away queue records it.
pub struct PrivateHandler;

#[async_trait]
impl Handler for PrivateHandler {
    async fn handle(&self, ctx: &Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let target = cmd.arg(0).ok_or(HandlerError::NeedMoreParams {
            command: "private",
            argument: "recipient",
        })?;
        let text = cmd.text_from(1).ok_or(HandlerError::NoTextToSend)?;
        let sender = ctx.login_id()?;

        let recipient = ctx
            .matrix
            .clients
            .find_by_login(target)
            .ok_or_else(|| MonitorError::TargetNotFound(target.to_owned()))?;

        ctx.reply(reply::private_to(target, &text)).await?;

        let delivered = reply::private_from(&sender, &text);
        recipient.try_deliver(delivered.clone());

        if let Some(monitor_uid) = ctx.matrix.monitors.capture(recipient.uid(), delivered) {
            debug!(target = %target, monitor = %monitor_uid, "Captured message for monitored user");
            if let Some(monitor) = ctx.matrix.clients.get(&monitor_uid) {
                monitor.try_deliver(reply::monitored_message(target, &sender, &text));
            }
        }

        Ok(())
    }
}

/// Broadcast a non-command line to every connection.
pub async fn broadcast_chat(ctx: &Context<'_>, line: &str) -> HandlerResult {
    let sender = ctx.login_id()?;
    ctx.matrix.clients.broadcast(&reply::says(&sender, line));
    Ok(())
}
