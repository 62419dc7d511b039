//! Channel registry.
//!
//! This module contains the `ChannelManager` struct, which owns every
//! registered channel and its ordered member list.
//!
//! A channel exists from `#create` until its last member leaves. Names are
//! case-sensitive. Whether a connection is already in a channel is tracked
//! on its session; the registry only guards names and member lists.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use crate::error::ChannelError;
use crate::state::Uid;

/// A named group of connections.
#[derive(Debug, Clone)]
pub struct Channel {
    pub name: String,
    /// Connection ids in join order, no duplicates.
    pub members: Vec<Uid>,
}

/// Channel registry state and behavior.
#[derive(Debug, Default)]
pub struct ChannelManager {
    /// All channels by exact name.
    channels: DashMap<String, Channel>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with `owner` as its only member.
    pub fn create(&self, name: &str, owner: &str) -> Result<(), ChannelError> {
        match self.channels.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(ChannelError::ChannelExists(name.to_owned())),
            Entry::Vacant(entry) => {
                entry.insert(Channel {
                    name: name.to_owned(),
                    members: vec![owner.to_owned()],
                });
                info!(channel = %name, "Channel created");
                crate::metrics::channel_created();
                Ok(())
            }
        }
    }

    /// Append `member` to an existing channel.
    pub fn join(&self, name: &str, member: &str) -> Result<(), ChannelError> {
        let mut channel = self
            .channels
            .get_mut(name)
            .ok_or_else(|| ChannelError::NoSuchChannel(name.to_owned()))?;
        if !channel.members.iter().any(|m| m == member) {
            channel.members.push(member.to_owned());
        }
        Ok(())
    }

    /// Remove `member` from `name`, deregistering the channel if it is now
    /// empty. Returns `true` when the channel was deregistered.
    pub fn leave(&self, name: &str, member: &str) -> bool {
        if let Some(mut channel) = self.channels.get_mut(name) {
            channel.members.retain(|m| m != member);
        }

        // Re-checked under the shard lock so a join that slipped in between
        // keeps the channel alive
        let removed = self
            .channels
            .remove_if(name, |_, channel| channel.members.is_empty())
            .is_some();
        if removed {
            info!(channel = %name, "Channel removed");
            crate::metrics::channel_removed();
        }
        removed
    }

    /// Snapshot of a channel's members in join order.
    pub fn members(&self, name: &str) -> Vec<Uid> {
        self.channels
            .get(name)
            .map(|c| c.members.clone())
            .unwrap_or_default()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Registered channel names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }

    pub fn count(&self) -> usize {
        self.channels.len()
    }
}
