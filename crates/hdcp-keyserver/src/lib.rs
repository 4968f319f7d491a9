//! HDCP key issuing service.
//!
//! Thin HTTP layer over [`hdcp_keys`]. The master matrix is loaded exactly
//! once in [`Server::bind`] and shared read-only with every request through
//! [`AppState`]; handlers only parse the request, call the derivation, and
//! serialize the result.
//!
//! # Security
//!
//! The service has no authentication or transport security. Anyone who can
//! reach it can mint device keys. Put it behind access control before
//! exposing it anywhere.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod routes;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

pub use error::{ApiError, ServerError};
use hdcp_keys::MasterMatrix;
pub use routes::router;
use tokio::net::TcpListener;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (e.g., "127.0.0.1:8080")
    pub bind_address: String,
    /// Path to the master key file
    pub master_key_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            master_key_path: PathBuf::from("master-key.txt"),
        }
    }
}

/// State shared by all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    matrix: Arc<MasterMatrix>,
}

impl AppState {
    /// Wrap a loaded matrix for sharing across requests.
    pub fn new(matrix: MasterMatrix) -> Self {
        Self { matrix: Arc::new(matrix) }
    }

    /// The master matrix.
    pub fn matrix(&self) -> &MasterMatrix {
        &self.matrix
    }
}

/// Key service bound to a local address.
pub struct Server {
    listener: TcpListener,
    state: AppState,
}

impl Server {
    /// Load the master key and bind the listener.
    ///
    /// Key file problems surface here, before any request is accepted.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let matrix = MasterMatrix::load(&config.master_key_path)?;
        tracing::info!("Loaded master key from {}", config.master_key_path.display());

        let listener = TcpListener::bind(&config.bind_address).await?;

        Ok(Self { listener, state: AppState::new(matrix) })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests until the process is stopped or the listener fails.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Server starting on {}", self.local_addr()?);
        axum::serve(self.listener, router(self.state)).await?;
        Ok(())
    }
}
