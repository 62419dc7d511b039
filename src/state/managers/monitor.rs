//! Monitor relation and away-message queues.
//!
//! A monitor observes one monitee's incoming private messages; each side
//! of the pair has at most one partner. While the pair exists, the
//! monitee owns an away queue that collects those messages for replay.
//!
//! Both directions of the pair and every away queue live in one table
//! behind one mutex, so `select`, `back`, message capture and disconnect
//! teardown never observe half a pair. The table also tracks which
//! connections are still attached; a pair is only ever formed between two
//! of them.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use crate::error::MonitorError;
use crate::state::Uid;

#[derive(Debug, Default)]
struct MonitorTable {
    /// Connections between `attach` and `disconnect`.
    live: HashSet<Uid>,
    /// monitor -> monitee
    monitor_of: HashMap<Uid, Uid>,
    /// monitee -> monitor
    monitored_by: HashMap<Uid, Uid>,
    /// monitee -> away queue
    away: HashMap<Uid, Vec<String>>,
}

impl MonitorTable {
    /// Remove the pair rooted at `monitor`, returning its monitee.
    fn unlink_monitor(&mut self, monitor: &str) -> Option<Uid> {
        let monitee = self.monitor_of.remove(monitor)?;
        if self.monitored_by.get(&monitee).is_some_and(|m| m == monitor) {
            self.monitored_by.remove(&monitee);
            self.away.remove(&monitee);
        }
        Some(monitee)
    }

    /// Remove the pair rooted at `monitee`, returning its monitor.
    fn unlink_monitee(&mut self, monitee: &str) -> Option<Uid> {
        let monitor = self.monitored_by.remove(monitee)?;
        if self.monitor_of.get(&monitor).is_some_and(|t| t == monitee) {
            self.monitor_of.remove(&monitor);
        }
        self.away.remove(monitee);
        Some(monitor)
    }
}

/// Pairs ended as a side effect of [`MonitorManager::select`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectOutcome {
    /// The monitor's previous monitee, if it was someone else.
    pub released: Option<Uid>,
    /// The target's previous monitor, if it was someone else.
    pub displaced: Option<Uid>,
}

/// Pairs ended by [`MonitorManager::disconnect`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Teardown {
    /// Who the departing connection was monitoring.
    pub monitee: Option<Uid>,
    /// Who was monitoring the departing connection.
    pub monitor: Option<Uid>,
}

/// Monitor relation state.
#[derive(Debug, Default)]
pub struct MonitorManager {
    table: Mutex<MonitorTable>,
}

impl MonitorManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `uid` as a connection that may take part in a pair.
    pub fn attach(&self, uid: &str) {
        self.table.lock().live.insert(uid.to_owned());
    }

    /// Make `monitor` the monitor of `target` with a fresh, empty away queue.
    ///
    /// Fails with `TargetNotFound` (carrying the uid) if either side has
    /// already been torn down by [`disconnect`](Self::disconnect).
    pub fn select(&self, monitor: &str, target: &str) -> Result<SelectOutcome, MonitorError> {
        if monitor == target {
            return Err(MonitorError::CannotMonitorSelf);
        }

        let mut table = self.table.lock();
        if !table.live.contains(monitor) || !table.live.contains(target) {
            return Err(MonitorError::TargetNotFound(target.to_owned()));
        }
        let mut outcome = SelectOutcome::default();

        if let Some(previous) = table.unlink_monitor(monitor)
            && previous != target
        {
            outcome.released = Some(previous);
        }
        if let Some(previous) = table.unlink_monitee(target)
            && previous != monitor
        {
            outcome.displaced = Some(previous);
        }

        table.monitor_of.insert(monitor.to_owned(), target.to_owned());
        table.monitored_by.insert(target.to_owned(), monitor.to_owned());
        table.away.insert(target.to_owned(), Vec::new());
        Ok(outcome)
    }

    /// End the pair rooted at `monitor`, destroying the away queue.
    /// Returns the released monitee.
    pub fn back(&self, monitor: &str) -> Result<Uid, MonitorError> {
        self.table
            .lock()
            .unlink_monitor(monitor)
            .ok_or(MonitorError::NoActiveMonitor)
    }

    /// If `target` is monitored, append `entry` to its away queue and
    /// return its monitor.
    pub fn capture(&self, target: &str, entry: String) -> Option<Uid> {
        let mut table = self.table.lock();
        let monitor = table.monitored_by.get(target)?.clone();
        table.away.entry(target.to_owned()).or_default().push(entry);
        Some(monitor)
    }

    /// Copy of `uid`'s away queue; empty if it has none.
    pub fn away_messages(&self, uid: &str) -> Vec<String> {
        self.table
            .lock()
            .away
            .get(uid)
            .cloned()
            .unwrap_or_default()
    }

    pub fn monitor_of(&self, monitor: &str) -> Option<Uid> {
        self.table.lock().monitor_of.get(monitor).cloned()
    }

    pub fn monitored_by(&self, monitee: &str) -> Option<Uid> {
        self.table.lock().monitored_by.get(monitee).cloned()
    }

    /// Drop every pair `uid` is part of, on both sides, and detach it so
    /// later selects naming it fail.
    pub fn disconnect(&self, uid: &str) -> Teardown {
        let mut table = self.table.lock();
        table.live.remove(uid);
        let teardown = Teardown {
            monitee: table.unlink_monitor(uid),
            monitor: table.unlink_monitee(uid),
        };
        table.away.remove(uid);
        teardown
    }
}
