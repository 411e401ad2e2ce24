//! Handlers for `/candidates` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/candidates/pending` | `?priority=&cluster_id=&customer=&country=&sort=match_score\|created_date` |
//! | `GET`  | `/candidates` | Any status; `?priority=&cluster_id=&customer=&country=&consultant=` |
//! | `GET`  | `/candidates/{id}` | 404 if not found |
//! | `GET`  | `/candidates/{id}/compare` | Both customers and the field diff |
//! | `POST` | `/candidates/{id}/decision` | Body: `{"agent_name":"..","decision":"MATCHED"}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use dedupe_core::{
  Error as Domain,
  candidate::{
    CandidateFilter, CandidateSummary, DuplicateCandidate, PendingSort, Priority, ScoreTier,
  },
  customer::Customer,
  decision::{Decision, NewDecision},
  diff::{FieldDiff, agreement, diff_customers},
  store::ReviewStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Query string shared by both list endpoints. Empty values mean "any".
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
  pub priority:   Option<String>,
  pub cluster_id: Option<String>,
  pub customer:   Option<String>,
  pub country:    Option<String>,
  pub consultant: Option<String>,
  pub sort:       Option<String>,
}

impl FilterParams {
  fn filter(&self) -> Result<CandidateFilter, ApiError> {
    let priority = match self.priority.as_deref().map(str::trim) {
      None | Some("") => None,
      Some(p) => Some(Priority::parse(p).map_err(|e| ApiError::BadRequest(e.to_string()))?),
    };
    Ok(
      CandidateFilter {
        priority,
        cluster_id: self.cluster_id.clone(),
        customer: self.customer.clone(),
        country: self.country.clone(),
        consultant: self.consultant.clone(),
      }
      .normalized(),
    )
  }

  fn sort(&self) -> Result<PendingSort, ApiError> {
    match self.sort.as_deref().map(str::trim) {
      None | Some("") => Ok(PendingSort::default()),
      Some(s) => s
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown sort: {s:?}"))),
    }
  }
}

// ─── Lists ───────────────────────────────────────────────────────────────────

/// `GET /candidates/pending`
pub async fn pending<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<FilterParams>,
) -> Result<Json<Vec<CandidateSummary>>, ApiError>
where
  S: ReviewStore,
{
  let filter = params.filter()?;
  let sort = params.sort()?;
  let rows = state
    .store
    .pending_candidates(&filter, sort)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(rows))
}

/// `GET /candidates`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<FilterParams>,
) -> Result<Json<Vec<CandidateSummary>>, ApiError>
where
  S: ReviewStore,
{
  let filter = params.filter()?;
  let rows = state
    .store
    .all_candidates(&filter)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(rows))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /candidates/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<DuplicateCandidate>, ApiError>
where
  S: ReviewStore,
{
  let candidate = state
    .store
    .get_candidate(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| Domain::CandidateNotFound(id.to_owned()))?;
  Ok(Json(candidate))
}

// ─── Compare ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CompareResponse {
  pub candidate:  DuplicateCandidate,
  pub score_tier: ScoreTier,
  pub customer_1: Customer,
  pub customer_2: Customer,
  pub fields:     Vec<FieldDiff>,
  pub matching:   usize,
  pub compared:   usize,
}

/// `GET /candidates/{id}/compare`
pub async fn compare<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<CompareResponse>, ApiError>
where
  S: ReviewStore,
{
  let candidate = state
    .store
    .get_candidate(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| Domain::CandidateNotFound(id.to_owned()))?;
  let customer_1 = load_customer(&state, &candidate.customer_id_1).await?;
  let customer_2 = load_customer(&state, &candidate.customer_id_2).await?;

  let fields = diff_customers(&customer_1, &customer_2);
  let (matching, compared) = agreement(&fields);
  Ok(Json(CompareResponse {
    score_tier: candidate.score_tier(),
    candidate,
    customer_1,
    customer_2,
    fields,
    matching,
    compared,
  }))
}

async fn load_customer<S>(state: &ApiState<S>, id: &str) -> Result<Customer, ApiError>
where
  S: ReviewStore,
{
  let customer = state
    .store
    .get_customer(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| Domain::CustomerNotFound(id.to_owned()))?;
  Ok(customer)
}

// ─── Decide ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /candidates/{id}/decision`.
#[derive(Debug, Deserialize)]
pub struct DecisionBody {
  pub agent_name:      String,
  pub decision:        Decision,
  pub decision_reason: Option<String>,
  pub notes:           Option<String>,
  pub session_id:      Option<Uuid>,
}

/// `POST /candidates/{id}/decision` returns 201 with the
/// [`DecisionReceipt`](dedupe_core::decision::DecisionReceipt).
pub async fn decide<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  Json(body): Json<DecisionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore,
{
  let input = NewDecision {
    candidate_id:    id,
    agent_name:      body.agent_name,
    decision:        body.decision,
    decision_reason: body.decision_reason,
    notes:           body.notes,
    session_id:      body.session_id,
  };
  let receipt = state
    .store
    .record_decision(input, state.settings.redecision_policy)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(receipt)))
}
