//! Handlers for `/metrics` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/metrics` | Status counts, average score, completion |
//! | `GET`  | `/metrics/activity` | Optional `?date=YYYY-MM-DD` (defaults to today, UTC) |
//! | `GET`  | `/metrics/countries` | Pending by country plus the region board |

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use dedupe_core::{
  metrics::{
    ActivityMetrics, CountryCount, DashboardMetrics, ReportingPeriods, region_board,
  },
  store::ReviewStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
  #[serde(flatten)]
  pub metrics:        DashboardMetrics,
  pub completion_pct: f64,
}

/// `GET /metrics`
pub async fn summary<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<SummaryResponse>, ApiError>
where
  S: ReviewStore,
{
  let metrics = state
    .store
    .dashboard_metrics()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(SummaryResponse { completion_pct: metrics.completion_pct(), metrics }))
}

// ─── Activity ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ActivityParams {
  pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
  pub periods:  ReportingPeriods,
  #[serde(flatten)]
  pub activity: ActivityMetrics,
}

/// `GET /metrics/activity[?date=YYYY-MM-DD]`
pub async fn activity<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ActivityParams>,
) -> Result<Json<ActivityResponse>, ApiError>
where
  S: ReviewStore,
{
  let periods = params
    .date
    .map(ReportingPeriods::for_date)
    .unwrap_or_else(ReportingPeriods::now);
  let activity = state
    .store
    .activity_metrics(periods)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(ActivityResponse { periods, activity }))
}

// ─── Countries ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RegionCount {
  pub code:  String,
  pub name:  String,
  pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct CountriesResponse {
  pub countries: Vec<CountryCount>,
  pub regions:   Vec<RegionCount>,
}

/// `GET /metrics/countries`
pub async fn countries<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<CountriesResponse>, ApiError>
where
  S: ReviewStore,
{
  let countries = state
    .store
    .country_breakdown()
    .await
    .map_err(ApiError::from_store)?;
  let regions = region_board(&state.settings.regions, &countries)
    .into_iter()
    .map(|(region, count)| RegionCount { code: region.code, name: region.name, count })
    .collect();
  Ok(Json(CountriesResponse { countries, regions }))
}
