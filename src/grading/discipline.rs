//! Discipline Evaluator: the hard-mode gate, and the discipline subscore derived
//! from hints, retries and attachment use.

use tracing::{debug, instrument, warn};

use crate::domain::{GradeTelemetry, PlayMode, Scenario, Subscore};
use crate::error::EligibilityError;
use crate::grading::policy::GradingPolicy;

/// Behaviour worth mentioning in feedback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisciplineFinding {
  Hints(u32),
  Retries(u32),
  /// In `practice` this is informational only.
  Attachments,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisciplineReport {
  pub subscore: Subscore,
  pub findings: Vec<DisciplineFinding>,
}

/// Reject `hard` mode unless the scenario allows it and the explanation is long enough.
/// Other modes always pass.
#[instrument(level = "debug", skip(scenario, explanation, policy), fields(scenario = %scenario.id))]
pub fn check_eligibility(
  scenario: &Scenario,
  mode: PlayMode,
  explanation: Option<&str>,
  policy: &GradingPolicy,
) -> Result<(), EligibilityError> {
  if mode != PlayMode::Hard {
    return Ok(());
  }
  if !scenario.hard_eligible {
    warn!(target: "grading", scenario = %scenario.id, "Hard mode refused: scenario not eligible");
    return Err(EligibilityError::NotHardEligible { scenario_id: scenario.id.clone() });
  }
  let actual = explanation.map(|s| s.trim().chars().count()).unwrap_or(0);
  if actual < policy.min_explanation_chars {
    warn!(target: "grading", scenario = %scenario.id, actual, "Hard mode refused: explanation too short");
    return Err(EligibilityError::ExplanationTooShort { min: policy.min_explanation_chars, actual });
  }
  Ok(())
}

/// Escalating retry penalty: attempt 2 costs one step, attempt 3 two more, and so on.
fn retry_deduction(attempt_number: u32, step: u32) -> u64 {
  let extra = attempt_number.saturating_sub(1) as u64;
  (step as u64).saturating_mul(extra.saturating_mul(extra + 1) / 2)
}

#[instrument(level = "debug", skip(policy))]
pub fn evaluate_discipline(
  telemetry: &GradeTelemetry,
  mode: PlayMode,
  policy: &GradingPolicy,
) -> DisciplineReport {
  let max = policy.discipline_max;
  let mut findings = Vec::new();

  if mode == PlayMode::Practice {
    if telemetry.attachments_opened {
      findings.push(DisciplineFinding::Attachments);
    }
    return DisciplineReport { subscore: Subscore { score: max, max }, findings };
  }

  let mut deduction: u64 = 0;
  if telemetry.hints_used > 0 {
    deduction += (policy.hint_penalty as u64) * (telemetry.hints_used as u64);
    findings.push(DisciplineFinding::Hints(telemetry.hints_used));
  }
  if telemetry.attempt_number > 1 {
    deduction = deduction.saturating_add(retry_deduction(telemetry.attempt_number, policy.attempt_step));
    findings.push(DisciplineFinding::Retries(telemetry.attempt_number - 1));
  }
  if telemetry.attachments_opened {
    deduction = deduction.saturating_add(policy.attachment_penalty as u64);
    findings.push(DisciplineFinding::Attachments);
  }

  let score = (max as u64).saturating_sub(deduction) as u32;
  debug!(target: "grading", ?mode, deduction, score, max, "Discipline evaluated");

  DisciplineReport { subscore: Subscore { score, max }, findings }
}
