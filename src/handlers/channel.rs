//! Channel handlers.
//!
//! Handles `#create`, `#join`, `#leave` and `#displayChannels`, plus the
//! relay of every other line sent while in a channel.

use super::{Context, Handler, HandlerError, HandlerResult};
use crate::error::ChannelError;
use async_trait::async_trait;
use chanrelay_proto::{CommandRef, reply};
use tracing::debug;

fn channel_name<'a>(cmd: &CommandRef<'a>, command: &'static str) -> Result<&'a str, HandlerError> {
    cmd.arg(0).ok_or(HandlerError::NeedMoreParams {
        command,
        argument: "channel name",
    })
}

/// Handler for `#create`.
pub struct CreateHandler;

#[async_trait]
impl Handler for CreateHandler {
    async fn handle(&self, ctx: &Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let name = channel_name(cmd, "create")?;

        if ctx.matrix.channels.exists(name) {
            return Err(ChannelError::ChannelExists(name.to_owned()).into());
        }
        if ctx.client.channel().is_some() {
            return Err(ChannelError::AlreadyInChannel.into());
        }

        ctx.matrix.channels.create(name, ctx.uid)?;
        ctx.client.set_channel(Some(name.to_owned()));
        ctx.reply(reply::channel_created(name)).await
    }
}

/// Handler for `#join`.
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let name = channel_name(cmd, "join")?;

        if ctx.client.channel().is_some() {
            return Err(ChannelError::AlreadyInChannel.into());
        }

        ctx.matrix.channels.join(name, ctx.uid)?;
        ctx.client.set_channel(Some(name.to_owned()));
        debug!(uid = %ctx.uid, channel = %name, "Joined channel");
        ctx.reply(reply::channel_joined(name)).await
    }
}

/// Handler for `#leave`. Allowed before login so it never traps a client.
pub struct LeaveHandler;

#[async_trait]
impl Handler for LeaveHandler {
    fn allows_anonymous(&self) -> bool {
        true
    }

    async fn handle(&self, ctx: &Context<'_>, _cmd: &CommandRef<'_>) -> HandlerResult {
        let name = ctx.client.take_channel().ok_or(ChannelError::NotInChannel)?;
        ctx.matrix.channels.leave(&name, ctx.uid);
        debug!(uid = %ctx.uid, channel = %name, "Left channel");
        ctx.reply(reply::channel_left(&name)).await
    }
}

/// Handler for `#displayChannels`.
pub struct DisplayChannelsHandler;

#[async_trait]
impl Handler for DisplayChannelsHandler {
    fn allows_anonymous(&self) -> bool {
        true
    }

    async fn handle(&self, ctx: &Context<'_>, _cmd: &CommandRef<'_>) -> HandlerResult {
        ctx.reply(reply::CHANNEL_LIST_HEADER).await?;
        for name in ctx.matrix.channels.list() {
            ctx.reply(name).await?;
        }
        Ok(())
    }
}

/// Relay `line` to every member of `channel`, the sender included, in
/// join order.
pub async fn relay_to_channel(ctx: &Context<'_>, channel: &str, line: &str) -> HandlerResult {
    let sender = ctx.login_id()?;
    let relayed = reply::channel_says(channel, &sender, line);

    let mut delivered = 0;
    for member in ctx.matrix.channels.members(channel) {
        if member == ctx.uid {
            ctx.reply(relayed.clone()).await?;
            delivered += 1;
        } else if let Some(client) = ctx.matrix.clients.get(&member)
            && client.try_deliver(relayed.clone())
        {
            delivered += 1;
        }
    }

    crate::metrics::record_fanout(delivered);
    Ok(())
}
