//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.
//! Extractor rejections are mapped onto `GradeError::Validation` so every
//! malformed request gets the same error body.

use std::sync::Arc;
use axum::{
  extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument, warn};

use crate::domain::GradeResult;
use crate::error::GradeError;
use crate::logic::*;
use crate::progress::ProgressRecord;
use crate::protocol::*;
use crate::state::AppState;

fn rejected(detail: String) -> GradeError {
  warn!(target: "relief_trainer", %detail, "Request rejected before grading");
  GradeError::validation(detail)
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_scenarios(State(state): State<Arc<AppState>>) -> Json<Vec<ScenarioOut>> {
  let scenarios = list_scenarios(&state);
  info!(target: "relief_trainer", count = scenarios.len(), "HTTP scenarios listed");
  Json(scenarios)
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_get_scenario(
  State(state): State<Arc<AppState>>,
  q: Result<Query<ScenarioQuery>, QueryRejection>,
) -> Result<Json<ScenarioOut>, GradeError> {
  let Query(q) = q.map_err(|e| rejected(e.body_text()))?;
  let out = scenario_view(&state, &q.scenario_id)?;
  info!(target: "relief_trainer", id = %out.id, "HTTP scenario served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_grade(
  State(state): State<Arc<AppState>>,
  body: Result<Json<GradeRequest>, JsonRejection>,
) -> Result<Json<GradeResult>, GradeError> {
  let Json(req) = body.map_err(|e| rejected(e.body_text()))?;
  let scenario_id = req.scenario_id.clone();
  let result = grade_submission(&state, req).await?;
  info!(target: "grading", id = %scenario_id, score = result.score, xp = result.xp, passed = result.passed, "HTTP grade evaluated");
  Ok(Json(result))
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  q: Result<Query<ProgressQuery>, QueryRejection>,
) -> Result<Json<ProgressRecord>, GradeError> {
  let Query(q) = q.map_err(|e| rejected(e.body_text()))?;
  let rec = progress_for(&state, &q.player_id, &q.scenario_id).await?;
  Ok(Json(rec))
}
