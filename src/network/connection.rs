//! Connection - Handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task:
//!
//! ```text
//!   socket ──▶ FramedRead ──▶ [RateLimiter] ──▶ Registry::dispatch
//!                                                   │
//!                                                   ▼
//!   socket ◀── FramedWrite ◀── writer task ◀── outgoing queue ◀── other connections
//! ```
//!
//! Lines queued for the client are written by a separate writer task, so a
//! handler awaiting queue capacity never waits on its own read loop.

use crate::handlers::{Context, HandlerError, Registry};
use crate::network::limit::RateLimiter;
use crate::state::{Client, Matrix};
use crate::telemetry::spans;
use chanrelay_proto::{LineCodec, reply};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Instrument, debug, info, warn};

/// How long a closing connection waits for queued lines to reach the socket.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Why the read loop stopped.
#[derive(Debug)]
enum CloseReason {
    /// Peer closed the socket.
    Eof,
    /// Framing or socket error.
    Protocol(chanrelay_proto::ProtocolError),
    /// Rate limit exceeded.
    Flood,
    /// A handler error that ends the session.
    Handler(HandlerError),
}

/// A client connection handler.
pub struct Connection {
    stream: TcpStream,
    addr: SocketAddr,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
}

impl Connection {
    /// Create a new connection handler.
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        matrix: Arc<Matrix>,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            stream,
            addr,
            matrix,
            registry,
        }
    }

    /// Run the connection until the peer leaves or the session is closed.
    ///
    /// Disconnect teardown runs exactly once, whatever ended the loop.
    pub async fn run(self) -> anyhow::Result<()> {
        let limits = self.matrix.limits.clone();
        let (outgoing_tx, outgoing_rx) = mpsc::channel::<String>(limits.send_queue);
        let client = self.matrix.connect(self.addr, outgoing_tx);
        let span = spans::connection(client.uid(), &self.addr);

        async move {
            info!("Client connected");

            let (read_half, write_half) = self.stream.into_split();
            let codec = LineCodec::with_max_len(limits.max_line_length);
            let mut reader = FramedRead::new(read_half, codec.clone());
            let writer = spawn_writer(FramedWrite::new(write_half, codec), outgoing_rx);

            let mut rate_limiter = RateLimiter::from_limits(&limits);

            // Handshake placeholder
            let reason = match client.send(String::new()).await {
                Ok(()) => {
                    read_loop(&mut reader, &mut rate_limiter, &client, &self.matrix, &self.registry)
                        .await
                }
                Err(e) => CloseReason::Handler(e.into()),
            };

            match &reason {
                CloseReason::Eof => info!("Client closed connection"),
                CloseReason::Protocol(e) => warn!(error = %e, "Closing on protocol error"),
                CloseReason::Flood => warn!("Rate limit exceeded, disconnecting"),
                CloseReason::Handler(e) => debug!(error = %e, "Closing after handler error"),
            }

            let uid = client.uid().to_owned();
            self.matrix.disconnect(&uid);

            // Last sender goes away here; the writer drains and exits
            drop(client);
            finish_writer(writer).await;
        }
        .instrument(span)
        .await;

        Ok(())
    }
}

async fn read_loop<R>(
    reader: &mut FramedRead<R, LineCodec>,
    rate_limiter: &mut Option<RateLimiter>,
    client: &Arc<Client>,
    matrix: &Arc<Matrix>,
    registry: &Registry,
) -> CloseReason
where
    R: tokio::io::AsyncRead + Unpin,
{
    loop {
        let line = match reader.next().await {
            Some(Ok(line)) => line,
            Some(Err(e)) => return CloseReason::Protocol(e),
            None => return CloseReason::Eof,
        };

        if let Some(limiter) = rate_limiter.as_mut()
            && !limiter.check()
        {
            crate::metrics::record_rate_limited();
            // Best effort, the connection is closing anyway
            let _ = client.send(reply::EXCESS_FLOOD.to_string()).await;
            return CloseReason::Flood;
        }

        let ctx = Context::new(client, matrix);
        if let Err(e) = registry.dispatch(&ctx, &line).await {
            if let Some(text) = e.to_reply()
                && let Err(send_err) = client.send(text).await
            {
                return CloseReason::Handler(send_err.into());
            }
            if e.closes_connection() {
                return CloseReason::Handler(e);
            }
        }
    }
}

fn spawn_writer<W>(
    mut writer: FramedWrite<W, LineCodec>,
    mut outgoing_rx: mpsc::Receiver<String>,
) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(
        async move {
            while let Some(line) = outgoing_rx.recv().await {
                if let Err(e) = writer.send(line).await {
                    debug!(error = %e, "Write error");
                    return;
                }
            }
        }
        .in_current_span(),
    )
}

async fn finish_writer(mut writer: JoinHandle<()>) {
    if tokio::time::timeout(DRAIN_TIMEOUT, &mut writer).await.is_err() {
        warn!("Timed out flushing outgoing queue");
        writer.abort();
    }
}
