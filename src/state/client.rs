//! Per-connection client state.
//!
//! A [`Client`] is created when a socket is accepted and dropped when the
//! connection task finishes. It carries the connection's outgoing queue and
//! its [`Session`] (login id and current channel).
//!
//! # Locking
//!
//! The session mutex is never held across an `.await`. Reads from other
//! connections (routing lookups, relay) take a snapshot. Only the owning
//! connection's task writes the session.

use parking_lot::Mutex;
use std::net::SocketAddr;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::state::Uid;

/// Identity and channel of one connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Set on successful `#login`.
    pub login_id: Option<String>,
    /// Set by `#create`/`#join`, cleared by `#leave` and disconnect.
    pub channel: Option<String>,
}

/// A live connection.
#[derive(Debug)]
pub struct Client {
    uid: Uid,
    addr: SocketAddr,
    sender: mpsc::Sender<String>,
    session: Mutex<Session>,
}

impl Client {
    pub fn new(uid: Uid, addr: SocketAddr, sender: mpsc::Sender<String>) -> Self {
        Self {
            uid,
            addr,
            sender,
            session: Mutex::new(Session::default()),
        }
    }

    #[inline]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    #[inline]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Snapshot of the session.
    pub fn session(&self) -> Session {
        self.session.lock().clone()
    }

    pub fn login_id(&self) -> Option<String> {
        self.session.lock().login_id.clone()
    }

    pub fn channel(&self) -> Option<String> {
        self.session.lock().channel.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.lock().login_id.is_some()
    }

    pub fn set_login_id(&self, login_id: String) {
        self.session.lock().login_id = Some(login_id);
    }

    pub fn set_channel(&self, channel: Option<String>) {
        self.session.lock().channel = channel;
    }

    /// Clear the channel, returning what it was.
    pub fn take_channel(&self) -> Option<String> {
        self.session.lock().channel.take()
    }

    /// Queue a line, waiting for capacity.
    ///
    /// Used for replies to the connection that issued the command.
    pub async fn send(&self, line: String) -> Result<(), mpsc::error::SendError<String>> {
        self.sender.send(line).await
    }

    /// Queue a line without waiting. Returns `false` if it was dropped.
    ///
    /// Used for fan-out so one slow reader cannot stall the sender.
    pub fn try_deliver(&self, line: String) -> bool {
        match self.sender.try_send(line) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(uid = %self.uid, "Outgoing queue full, dropping line");
                crate::metrics::record_dropped();
                false
            }
            // Connection is already tearing down
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(capacity: usize) -> (Client, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        let addr: SocketAddr = "127.0.0.1:5555".parse().unwrap();
        (Client::new("C000001".into(), addr, tx), rx)
    }

    #[test]
    fn test_session_starts_empty() {
        let (client, _rx) = test_client(4);
        assert_eq!(client.session(), Session::default());
        assert!(!client.is_logged_in());
    }

    #[test]
    fn test_take_channel_clears() {
        let (client, _rx) = test_client(4);
        client.set_channel(Some("lobby".into()));
        assert_eq!(client.take_channel().as_deref(), Some("lobby"));
        assert_eq!(client.channel(), None);
    }

    #[test]
    fn test_try_deliver_drops_when_full() {
        let (client, mut rx) = test_client(1);
        assert!(client.try_deliver("one".into()));
        assert!(!client.try_deliver("two".into()));
        assert_eq!(rx.try_recv().unwrap(), "one");
    }

    #[tokio::test]
    async fn test_send_waits_for_capacity() {
        let (client, mut rx) = test_client(1);
        client.send("first".into()).await.unwrap();
        let reader = tokio::spawn(async move {
            let a = rx.recv().await;
            let b = rx.recv().await;
            (a, b)
        });
        client.send("second".into()).await.unwrap();
        let (a, b) = reader.await.unwrap();
        assert_eq!(a.as_deref(), Some("first"));
        assert_eq!(b.as_deref(), Some("second"));
    }
}
