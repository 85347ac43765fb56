//! HTTP surface and background poller for roster.
//!
//! Exposes an axum [`Router`] serving monthly join/leave statistics as JSON,
//! backed by any [`StoreProvider`]. A handle is acquired per request so a
//! store failure affects only that request.

pub mod config;
pub mod error;
pub mod logging;
pub mod poller;
pub mod routes;

pub use config::ServerConfig;
pub use error::ApiError;

use std::sync::Arc;

use axum::{Router, routing::get};
use roster_core::store::StoreProvider;
use tower_http::trace::TraceLayer;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<P> {
  pub provider: Arc<P>,
}

impl<P> AppState<P> {
  pub fn new(provider: P) -> Self { Self { provider: Arc::new(provider) } }
}

impl<P> Clone for AppState<P> {
  fn clone(&self) -> Self { Self { provider: Arc::clone(&self.provider) } }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the stats [`Router`].
///
/// | Method | Path | Notes |
/// |--------|------|-------|
/// | `GET`  | `/health` | Does not touch the store |
/// | `GET`  | `/` | Current UTC month |
/// | `GET`  | `/{period}` | `YYYY-MM`; 400 if malformed |
pub fn router<P>(state: AppState<P>) -> Router
where
  P: StoreProvider + 'static,
{
  Router::new()
    .route("/health", get(routes::health))
    .route("/", get(routes::current_month::<P>))
    .route("/{period}", get(routes::for_period::<P>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
