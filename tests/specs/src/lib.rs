// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `catena-server` binary as a subprocess and exercises it
//! over HTTP and gRPC.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Once;
use std::time::Duration;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times — only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Resolve the path to the compiled `catena-server` binary.
pub fn server_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs -> tests -> workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("catena-server")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Base64url-encode a `{scope, exp}` claims object into a fake three-segment
/// JWS (`header.payload.signature`) that `Authorizer::new` accepts — the
/// transport never verifies the signature, only the claims.
pub fn make_token(scope: &str, exp: u64) -> String {
    let payload = serde_json::json!({ "scope": scope, "exp": exp });
    let encoded = base64::Engine::encode(
        &base64::engine::general_purpose::URL_SAFE_NO_PAD,
        serde_json::to_vec(&payload).expect("serialize claims"),
    );
    format!("header.{encoded}.sig")
}

/// A running `catena-server` process that is killed on drop.
pub struct CatenaProcess {
    child: Child,
    http_port: u16,
    grpc_port: u16,
}

/// Builder for configuring how a [`CatenaProcess`] is launched.
pub struct CatenaBuilder {
    auth: bool,
    max_connections: usize,
}

impl Default for CatenaBuilder {
    fn default() -> Self {
        Self { auth: false, max_connections: 64 }
    }
}

impl CatenaBuilder {
    /// Require a bearer token on every request (`--auth`).
    pub fn auth(mut self) -> Self {
        self.auth = true;
        self
    }

    /// Cap concurrent `Connect` sessions (`--max-connections`).
    pub fn max_connections(mut self, n: usize) -> Self {
        self.max_connections = n;
        self
    }

    pub fn spawn(self) -> anyhow::Result<CatenaProcess> {
        ensure_crypto();
        let binary = server_binary();
        anyhow::ensure!(binary.exists(), "catena-server binary not found at {}", binary.display());

        let http_port = free_port()?;
        let grpc_port = free_port()?;

        let mut args: Vec<String> = vec![
            "--host".into(),
            "127.0.0.1".into(),
            "--http-port".into(),
            http_port.to_string(),
            "--grpc-port".into(),
            grpc_port.to_string(),
            "--max-connections".into(),
            self.max_connections.to_string(),
            "--log-format".into(),
            "text".into(),
            "--log-level".into(),
            "warn".into(),
        ];
        if self.auth {
            args.push("--auth".into());
        }

        let child =
            Command::new(&binary).args(&args).stdout(Stdio::null()).stderr(Stdio::null()).spawn()?;

        Ok(CatenaProcess { child, http_port, grpc_port })
    }
}

impl CatenaProcess {
    pub fn build() -> CatenaBuilder {
        CatenaBuilder::default()
    }

    /// Spawn with authorization disabled and default connection limits.
    pub fn start() -> anyhow::Result<Self> {
        Self::build().spawn()
    }

    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub fn grpc_port(&self) -> u16 {
        self.grpc_port
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.http_port)
    }

    pub fn grpc_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.grpc_port)
    }

    /// Poll `GetPopulatedSlots` over HTTP until it responds, or fail after
    /// `timeout`. `GetPopulatedSlots` needs no authorization, so this works
    /// regardless of whether the process was built with `.auth()`.
    pub async fn wait_healthy(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/api/v1/slots", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("catena-server did not become healthy within {timeout:?}");
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Connect a gRPC client channel to this process.
    pub async fn grpc_client(
        &self,
    ) -> anyhow::Result<catena_transport::grpc::proto::catena_client::CatenaClient<tonic::transport::Channel>>
    {
        let endpoint = tonic::transport::Channel::from_shared(self.grpc_url())?;
        let channel = endpoint.connect().await?;
        Ok(catena_transport::grpc::proto::catena_client::CatenaClient::new(channel))
    }
}

impl Drop for CatenaProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
