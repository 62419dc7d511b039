//! Test chat client.
//!
//! Provides a line-based client for integration testing that can send
//! commands and assert on received lines.

use chanrelay_proto::Command;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test server and consume the empty greeting line.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;

        let (read_half, write_half) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        };

        let greeting = client.recv().await?;
        anyhow::ensure!(greeting.is_empty(), "unexpected greeting: {:?}", greeting);
        Ok(client)
    }

    /// Send one line.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Send a typed command.
    pub async fn send_command(&mut self, cmd: Command) -> anyhow::Result<()> {
        self.send(&cmd.to_string()).await
    }

    /// Send raw bytes without a terminator.
    #[allow(dead_code)]
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single line from the server.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a line with a timeout. A closed connection is an error.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            anyhow::bail!("connection closed");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Receive lines until the given predicate returns true.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    /// Assert that nothing arrives within a short window.
    #[allow(dead_code)]
    pub async fn expect_silence(&mut self) -> anyhow::Result<()> {
        match self.recv_timeout(Duration::from_millis(150)).await {
            Err(e) if e.is::<tokio::time::error::Elapsed>() => Ok(()),
            Err(e) => Err(e),
            Ok(line) => anyhow::bail!("expected silence, got {:?}", line),
        }
    }

    /// Wait until the server closes the connection.
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        loop {
            let mut line = String::new();
            match timeout(Duration::from_secs(5), self.reader.read_line(&mut line)).await? {
                Ok(0) | Err(_) => return Ok(()),
                Ok(_) => continue,
            }
        }
    }

    /// Log in and wait for this login's own broadcast.
    pub async fn login(&mut self, login_id: &str, password: &str) -> anyhow::Result<()> {
        self.send_command(Command::Login {
            login_id: login_id.to_string(),
            password: password.to_string(),
        })
        .await?;
        let expected = format!("{} has logged on.", login_id);
        let lines = self
            .recv_until(|line| {
                line == expected || line.starts_with("Error.") || line.starts_with("Invalid")
            })
            .await?;
        match lines.last() {
            Some(last) if *last == expected => Ok(()),
            other => anyhow::bail!("login failed: {:?}", other),
        }
    }
}
