//! HTTP surface over one in-process vote chain.
//!
//! The chain is built once at startup and lives until the process exits; it is
//! never written to disk. Every chain access runs on the blocking pool under a
//! `RwLock`: appends (which mine) take the write lock, everything else reads.

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use ballot_core::Chain;
use std::sync::{Arc, RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    chain: Arc<RwLock<Chain>>,
}

impl AppState {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain: Arc::new(RwLock::new(chain)),
        }
    }

    /// Shared handle on the chain, for embedding and audit tooling.
    pub fn chain(&self) -> Arc<RwLock<Chain>> {
        Arc::clone(&self.chain)
    }

    pub async fn read<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Chain) -> T + Send + 'static,
        T: Send + 'static,
    {
        let chain = self.chain();
        tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
            let guard = chain.read().map_err(|_| ApiError::Poisoned)?;
            Ok(f(&*guard))
        })
        .await?
    }

    /// Runs `f` with exclusive access; at most one append is in flight.
    pub async fn write<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Chain) -> T + Send + 'static,
        T: Send + 'static,
    {
        let chain = self.chain();
        tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
            let mut guard = chain.write().map_err(|_| ApiError::Poisoned)?;
            Ok(f(&mut *guard))
        })
        .await?
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/healthz", get(routes::health))
        .route("/votes", post(routes::cast_vote))
        .route("/votes/{voter_id}", get(routes::verify_vote))
        .route("/chain", get(routes::export_chain))
        .route("/chain/latest", get(routes::latest_block))
        .route("/chain/stats", get(routes::chain_stats))
        .route("/chain/validate", get(routes::validate_chain))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
