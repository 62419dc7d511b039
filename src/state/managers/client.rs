//! Live connections and the login index.
//!
//! The ClientManager handles:
//! - Tracking every live [`Client`] by connection id
//! - Mapping logged-in ids to their connection (one live connection per id)
//! - Broadcasting a line to every connection
//!
//! # Thread Safety
//!
//! Both maps are DashMaps. Lookups clone the `Arc<Client>` out so no shard
//! lock outlives the call.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

use crate::state::client::Client;
use crate::state::{DashMapExt, Uid};

/// Manages all live connections.
#[derive(Debug, Default)]
pub struct ClientManager {
    /// Clients by connection id.
    clients: DashMap<Uid, Arc<Client>>,

    /// Login id to connection id for authenticated connections.
    logins: DashMap<String, Uid>,
}

impl ClientManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, client: Arc<Client>) {
        self.clients.insert(client.uid().to_owned(), client);
        crate::metrics::client_connected();
    }

    pub fn unregister(&self, uid: &str) -> Option<Arc<Client>> {
        let removed = self.clients.remove(uid).map(|(_, c)| c);
        if removed.is_some() {
            crate::metrics::client_disconnected();
        }
        removed
    }

    pub fn get(&self, uid: &str) -> Option<Arc<Client>> {
        self.clients.get_cloned(uid)
    }

    /// Number of live connections.
    pub fn count(&self) -> usize {
        self.clients.len()
    }

    /// Snapshot of every live connection.
    pub fn all(&self) -> Vec<Arc<Client>> {
        self.clients.values_cloned()
    }

    /// Claim `login_id` for `uid`. Returns `false` if another live
    /// connection already holds it.
    pub fn claim_login(&self, login_id: &str, uid: &str) -> bool {
        match self.logins.entry(login_id.to_owned()) {
            Entry::Occupied(entry) => entry.get() == uid,
            Entry::Vacant(entry) => {
                entry.insert(uid.to_owned());
                true
            }
        }
    }

    /// Release `login_id` if it is still held by `uid`.
    pub fn release_login(&self, login_id: &str, uid: &str) {
        self.logins.remove_if(login_id, |_, holder| holder == uid);
    }

    /// The live connection logged in as `login_id`.
    pub fn find_by_login(&self, login_id: &str) -> Option<Arc<Client>> {
        let uid = self.logins.get_cloned(login_id)?;
        self.get(&uid)
    }

    /// Queue `line` on every live connection. Returns how many accepted it.
    pub fn broadcast(&self, line: &str) -> usize {
        let recipients = self.all();
        let delivered = recipients
            .iter()
            .filter(|c| c.try_deliver(line.to_owned()))
            .count();
        crate::metrics::record_fanout(delivered);
        delivered
    }
}
