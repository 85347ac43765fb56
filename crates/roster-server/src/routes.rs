//! Stats handlers.

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use roster_core::{
  stats::{StatsResult, build_stats},
  store::StoreProvider,
};

use crate::{AppState, error::ApiError};

/// `GET /health`
pub async fn health() -> &'static str { "ok" }

/// `GET /` — stats for the current UTC month.
pub async fn current_month<P>(
  State(state): State<AppState<P>>,
) -> Result<Json<StatsResult>, ApiError>
where
  P: StoreProvider,
{
  let stats = build_stats(state.provider.as_ref(), "", Utc::now()).await?;
  Ok(Json(stats))
}

/// `GET /{period}` — stats for a `YYYY-MM` month.
pub async fn for_period<P>(
  State(state): State<AppState<P>>,
  Path(period): Path<String>,
) -> Result<Json<StatsResult>, ApiError>
where
  P: StoreProvider,
{
  let stats = build_stats(state.provider.as_ref(), &period, Utc::now()).await?;
  Ok(Json(stats))
}
