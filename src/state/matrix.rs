//! The Matrix - Central shared state for the chat server.
//!
//! The Matrix holds credentials, live connections, channels and monitor
//! pairs, each in a manager with its own locking, and is shared by every
//! connection task behind an `Arc`.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use chanrelay_proto::reply;

use crate::config::{Config, LimitsConfig};
use crate::state::managers::account::AccountManager;
use crate::state::managers::channel::ChannelManager;
use crate::state::managers::client::ClientManager;
use crate::state::managers::monitor::MonitorManager;
use crate::state::{Client, UidGenerator};

/// The Matrix - Central shared state container.
pub struct Matrix {
    /// Server name, for logs.
    pub server_name: String,

    /// Connection id generator.
    pub uid_gen: UidGenerator,

    /// Credential store.
    pub accounts: AccountManager,

    /// Live connections and the login index.
    pub clients: ClientManager,

    /// Channel registry.
    pub channels: ChannelManager,

    /// Monitor pairs and away queues.
    pub monitors: MonitorManager,

    /// Per-connection limits.
    pub limits: LimitsConfig,
}

impl Matrix {
    pub fn new(config: &Config, accounts: AccountManager) -> Self {
        Self {
            server_name: config.server.name.clone(),
            uid_gen: UidGenerator::new(),
            accounts,
            clients: ClientManager::new(),
            channels: ChannelManager::new(),
            monitors: MonitorManager::new(),
            limits: config.limits.clone(),
        }
    }

    /// Allocate an id and register a new client with an empty session.
    pub fn connect(&self, addr: SocketAddr, sender: mpsc::Sender<String>) -> Arc<Client> {
        let client = Arc::new(Client::new(self.uid_gen.next(), addr, sender));
        self.clients.register(client.clone());
        self.monitors.attach(client.uid());
        client
    }

    /// Tear down everything a connection owns. Runs once per connection.
    ///
    /// Order: login released, channel left, monitor pairs ended (partners
    /// notified), client unregistered.
    pub fn disconnect(&self, uid: &str) {
        let Some(client) = self.clients.get(uid) else {
            return;
        };
        let session = client.session();

        if let Some(login_id) = &session.login_id {
            self.clients.release_login(login_id, uid);
        }

        if let Some(channel) = client.take_channel() {
            self.channels.leave(&channel, uid);
        }

        let teardown = self.monitors.disconnect(uid);
        let display = session.login_id.as_deref().unwrap_or(uid);
        if let Some(monitee) = teardown.monitee.and_then(|m| self.clients.get(&m)) {
            monitee.try_deliver(reply::monitor_logged_off(display));
        }
        if let Some(monitor) = teardown.monitor.and_then(|m| self.clients.get(&m)) {
            monitor.try_deliver(reply::monitee_logged_off(display));
        }

        self.clients.unregister(uid);
        info!(uid = %uid, login = ?session.login_id, "Client disconnected");
    }
}
