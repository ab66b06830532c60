//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Grading a submission (validate, look up scenario + key, run the engine, record progress)
//!   - Scenario listing and lookup (public views only)
//!   - Progress lookup

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::domain::{GradeResult, PlayMode};
use crate::error::GradeError;
use crate::grading::{grade, GradeInput};
use crate::progress::ProgressRecord;
use crate::protocol::{to_out, GradeRequest, ScenarioOut};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state, req), fields(scenario_id = %req.scenario_id, mode = ?req.mode))]
pub async fn grade_submission(state: &AppState, req: GradeRequest) -> Result<GradeResult, GradeError> {
  req.validate()?;
  let (scenario, key) = state.lookup(&req.scenario_id)?;
  let telemetry = req.telemetry.unwrap_or_default();

  if let Some(text) = &req.explanation_text {
    debug!(target: "grading", explanation = %trunc_for_log(text, 80), "Explanation received");
  }

  let input = GradeInput {
    scenario,
    key,
    datasheet: &req.datasheet,
    answers: &req.answers,
    mode: req.mode,
    explanation: req.explanation_text.as_deref(),
    telemetry: &telemetry,
  };
  let result = grade(&input, &state.policy)?;

  match (&req.player_id, req.mode) {
    (Some(player), mode) if mode != PlayMode::Practice && !player.trim().is_empty() => {
      let rec = state
        .progress
        .record_attempt(player, &scenario.id, &result, Utc::now())
        .await;
      info!(target: "relief_trainer", player = %player, scenario = %scenario.id, attempts = rec.attempts, best = rec.best_score, "Attempt recorded");
    }
    _ => debug!(target: "relief_trainer", scenario = %scenario.id, "Attempt not recorded"),
  }

  Ok(result)
}

pub fn list_scenarios(state: &AppState) -> Vec<ScenarioOut> {
  state.list_scenarios().into_iter().map(to_out).collect()
}

#[instrument(level = "debug", skip(state))]
pub fn scenario_view(state: &AppState, scenario_id: &str) -> Result<ScenarioOut, GradeError> {
  state
    .get_scenario(scenario_id)
    .map(to_out)
    .ok_or_else(|| GradeError::NotFound(format!("scenario '{}'", scenario_id)))
}

#[instrument(level = "debug", skip(state))]
pub async fn progress_for(state: &AppState, player_id: &str, scenario_id: &str) -> Result<ProgressRecord, GradeError> {
  state
    .progress
    .get(player_id, scenario_id)
    .await
    .ok_or_else(|| GradeError::NotFound(format!("progress for '{}' on '{}'", player_id, scenario_id)))
}
