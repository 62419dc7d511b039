//! Command handler registry and dispatch.
//!
//! The `Registry` routes each received line and keeps per-command usage
//! counts. Every route runs inside a `command` span with latency and
//! error metrics.

use super::context::{Context, Handler, HandlerError, HandlerResult};
use crate::handlers::{
    channel::{CreateHandler, DisplayChannelsHandler, JoinHandler, LeaveHandler, relay_to_channel},
    connection::LoginHandler,
    messaging::{PrivateHandler, broadcast_chat},
    monitor::{BackHandler, RetrieveHandler, SelectHandler},
};
use crate::telemetry::{CommandTimer, spans};
use chanrelay_proto::CommandRef;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, debug};

/// Route name for plain chat lines outside a channel.
const CHAT: &str = "chat";
/// Route name for lines relayed inside a channel.
const RELAY: &str = "relay";
/// Metrics label for unrecognised sentinel commands.
const UNKNOWN: &str = "unknown";

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
    /// Usage counters per route
    command_counts: HashMap<&'static str, AtomicU64>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        handlers.insert("login", Box::new(LoginHandler));
        handlers.insert("private", Box::new(PrivateHandler));

        // Channel handlers
        handlers.insert("create", Box::new(CreateHandler));
        handlers.insert("join", Box::new(JoinHandler));
        handlers.insert("leave", Box::new(LeaveHandler));
        handlers.insert("displayChannels", Box::new(DisplayChannelsHandler));

        // Monitor handlers
        handlers.insert("select", Box::new(SelectHandler));
        handlers.insert("back", Box::new(BackHandler));
        handlers.insert("retrieve", Box::new(RetrieveHandler));

        let mut command_counts = HashMap::new();
        for &cmd in handlers.keys().chain([CHAT, RELAY].iter()) {
            command_counts.insert(cmd, AtomicU64::new(0));
        }

        Self {
            handlers,
            command_counts,
        }
    }

    /// Usage counts of every route used at least once, most used first.
    pub fn command_stats(&self) -> Vec<(&'static str, u64)> {
        let mut stats: Vec<_> = self
            .command_counts
            .iter()
            .map(|(cmd, count)| (*cmd, count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        stats
    }

    /// Route one received line.
    ///
    /// Inside a channel every line is relayed except `#leave`, blank lines
    /// included. Outside a channel a sentinel line goes to its handler,
    /// blank lines are ignored and anything else is broadcast as chat.
    pub async fn dispatch(&self, ctx: &Context<'_>, line: &str) -> HandlerResult {
        let cmd = CommandRef::parse(line);
        let is_leave = cmd.as_ref().is_some_and(|c| c.name() == "leave");

        if !is_leave && let Some(channel) = ctx.client.channel() {
            return self
                .observe(RELAY, ctx, relay_to_channel(ctx, &channel, line))
                .await;
        }

        if line.trim().is_empty() {
            return Ok(());
        }

        let Some(cmd) = cmd else {
            return self.observe(CHAT, ctx, broadcast_chat(ctx, line)).await;
        };

        let Some((&name, handler)) = self.handlers.get_key_value(cmd.name()) else {
            crate::metrics::record_command_error(UNKNOWN, "unknown_command");
            debug!(uid = %ctx.uid, command = %cmd.name(), "Unknown command");
            return Err(HandlerError::UnknownCommand(cmd.name().to_owned()));
        };

        self.observe(name, ctx, async {
            if !handler.allows_anonymous() && !ctx.client.is_logged_in() {
                return Err(HandlerError::NotLoggedIn);
            }
            handler.handle(ctx, &cmd).await
        })
        .await
    }

    /// Run one route with usage counting, a tracing span, latency and
    /// error metrics.
    async fn observe<F>(&self, name: &'static str, ctx: &Context<'_>, fut: F) -> HandlerResult
    where
        F: Future<Output = HandlerResult>,
    {
        if let Some(counter) = self.command_counts.get(name) {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        let span = spans::command(name, ctx.uid);
        let _timer = CommandTimer::new(name);

        let result = fut.instrument(span).await;

        if let Err(ref e) = result {
            crate::metrics::record_command_error(name, e.error_code());
            debug!(command = name, error = %e, "Command error");
        }

        result
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
