//! Test server management.
//!
//! Runs a chanrelay gateway inside the test's runtime on an ephemeral port.

use chanrelay::config::{Config, LimitsConfig};
use chanrelay::network::Gateway;
use chanrelay::state::Matrix;
use chanrelay::state::managers::account::AccountManager;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// A test server instance.
pub struct TestServer {
    addr: SocketAddr,
    matrix: Arc<Matrix>,
    task: JoinHandle<()>,
    data_dir: TempDir,
}

impl TestServer {
    /// Spawn a test server with default limits (no flood control).
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with_limits(LimitsConfig::default()).await
    }

    /// Spawn a test server with custom per-connection limits.
    pub async fn spawn_with_limits(limits: LimitsConfig) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;

        let mut config = Config::default();
        config.server.name = "test.server".to_string();
        config.listen.address = "127.0.0.1:0".parse()?;
        config.accounts.path = data_dir.path().join("accounts.txt");
        config.limits = limits;

        let accounts = AccountManager::load(&config.accounts.path)?;
        let matrix = Arc::new(Matrix::new(&config, accounts));
        let gateway = Gateway::bind(config.listen.address, Arc::clone(&matrix)).await?;
        let addr = gateway.local_addr()?;

        let task = tokio::spawn(async move {
            let _ = gateway.run().await;
        });

        Ok(Self {
            addr,
            matrix,
            task,
            data_dir,
        })
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Shared state of the running server.
    #[allow(dead_code)]
    pub fn matrix(&self) -> &Arc<Matrix> {
        &self.matrix
    }

    /// Path of the credential file this server would save to.
    #[allow(dead_code)]
    pub fn accounts_path(&self) -> PathBuf {
        self.data_dir.path().join("accounts.txt")
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address()).await
    }

    /// Connect and log in, consuming the login broadcast.
    #[allow(dead_code)]
    pub async fn login(
        &self,
        login_id: &str,
        password: &str,
    ) -> anyhow::Result<super::client::TestClient> {
        let mut client = self.connect().await?;
        client.login(login_id, password).await?;
        Ok(client)
    }

    /// Wait until the server has no more than `count` live connections.
    #[allow(dead_code)]
    pub async fn wait_for_clients(&self, count: usize) -> anyhow::Result<()> {
        for _ in 0..100 {
            if self.matrix.clients.count() <= count {
                return Ok(());
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        anyhow::bail!(
            "expected at most {} clients, still have {}",
            count,
            self.matrix.clients.count()
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
