//! Test helpers for integration tests
//!
//! Provides a gateway running on an ephemeral port with in-memory lookups and
//! a small PBX client speaking the app service protocol.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use presence_gateway::connection::ConnectionManager;
use presence_gateway::server::{create_app, spawn_directory_sync, GatewayState};
use presence_service::{PbxDirectory, PresencePipeline, ServiceContext};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fixtures::{app_login, test_app_service, MapParticipants, MapUsers, TEST_PASSWORD};

/// Time to wait for a frame from the gateway
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Test gateway instance that manages lifecycle
pub struct TestGateway {
    pub addr: SocketAddr,
    pub path: String,
    pub pipeline: PresencePipeline,
    pub directory: Arc<PbxDirectory>,
    pub connections: Arc<ConnectionManager>,
    _server: JoinHandle<()>,
    _sync: JoinHandle<()>,
}

impl TestGateway {
    /// Start a gateway answering identity lookups from the given maps
    pub async fn start(participants: MapParticipants, users: MapUsers) -> Result<Self> {
        let directory = Arc::new(PbxDirectory::new());
        let connections = ConnectionManager::new_shared();

        let context = ServiceContext::builder()
            .participants(Arc::new(participants))
            .users(Arc::new(users))
            .directory(directory.clone())
            .registry(connections.clone())
            .busy_note("In a meeting")
            .build()?;

        let (replication_tx, sync) = spawn_directory_sync(directory.clone(), 16);
        let app_service = test_app_service();
        let path = app_service.path();
        let state = GatewayState::new(connections.clone(), replication_tx, app_service);
        let app = create_app(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            path,
            pipeline: PresencePipeline::new(context),
            directory,
            connections,
            _server: server,
            _sync: sync,
        })
    }

    /// WebSocket URL of the app service
    pub fn ws_url(&self) -> String {
        format!("ws://{}{}", self.addr, self.path)
    }

    /// Connect a PBX client
    pub async fn connect(&self) -> Result<PbxClient> {
        PbxClient::connect(&self.ws_url()).await
    }

    /// Wait until the directory holds `count` records
    pub async fn wait_for_directory(&self, count: usize) -> Result<()> {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        while self.directory.len() != count {
            if tokio::time::Instant::now() > deadline {
                bail!(
                    "directory has {} records, expected {count}",
                    self.directory.len()
                );
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(())
    }
}

/// Frame received by the PBX client
#[derive(Debug)]
pub enum Received {
    Json(Value),
    Closed(Option<u16>),
}

/// Minimal PBX speaking the app service protocol
pub struct PbxClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl PbxClient {
    /// Connect to the app service
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws, _) = connect_async(url)
            .await
            .with_context(|| format!("connect to {url}"))?;
        Ok(Self { ws })
    }

    /// Send a JSON message
    pub async fn send(&mut self, value: Value) -> Result<()> {
        self.ws.send(Message::Text(value.to_string())).await?;
        Ok(())
    }

    /// Receive the next text or close frame
    pub async fn recv(&mut self) -> Result<Received> {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .map_err(|_| anyhow!("timed out waiting for a frame"))?;

            match frame {
                Some(Ok(Message::Text(text))) => return Ok(Received::Json(serde_json::from_str(&text)?)),
                Some(Ok(Message::Close(frame))) => {
                    return Ok(Received::Closed(frame.map(|f| u16::from(f.code))))
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(Received::Closed(None)),
            }
        }
    }

    /// Receive the next JSON message
    pub async fn recv_json(&mut self) -> Result<Value> {
        match self.recv().await? {
            Received::Json(value) => Ok(value),
            Received::Closed(code) => bail!("connection closed with {code:?}"),
        }
    }

    /// Receive the next JSON message and check its type
    pub async fn expect(&mut self, mt: &str) -> Result<Value> {
        let value = self.recv_json().await?;
        if value["mt"] != mt {
            bail!("expected {mt}, got {value}");
        }
        Ok(value)
    }

    /// Run the challenge/login handshake with `password`
    pub async fn login_with(&mut self, password: &str) -> Result<bool> {
        self.send(serde_json::json!({"mt": "AppChallenge"})).await?;
        let challenge = self.expect("AppChallengeResult").await?;
        let challenge = challenge["challenge"]
            .as_str()
            .ok_or_else(|| anyhow!("challenge missing"))?
            .to_string();

        self.send(app_login(&challenge, password)).await?;
        let result = self.expect("AppLoginResult").await?;
        Ok(result["ok"] == true)
    }

    /// Log in with the shared test password
    pub async fn login(&mut self) -> Result<()> {
        if !self.login_with(TEST_PASSWORD).await? {
            bail!("login rejected");
        }
        Ok(())
    }
}
