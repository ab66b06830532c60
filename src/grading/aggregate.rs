//! Score Aggregator: final score, XP award and pass flag.

use tracing::{debug, instrument};

use crate::domain::{PlayMode, ScoreBreakdown, Subscore};
use crate::error::GradeError;
use crate::grading::policy::GradingPolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aggregate {
  pub score: u32,
  pub xp: u32,
  pub passed: bool,
}

/// XP multiplier for a play mode. Practice awards nothing persistable.
pub fn mode_factor(mode: PlayMode, policy: &GradingPolicy) -> u32 {
  match mode {
    PlayMode::Practice => 0,
    PlayMode::Standard => 1,
    PlayMode::Hard => policy.hard_xp_factor,
  }
}

/// Base XP before the mode factor.
pub fn base_xp(score: u32, policy: &GradingPolicy) -> u32 {
  score.saturating_mul(policy.xp_per_point)
}

fn check_subscore(name: &str, s: Subscore) -> Result<(), GradeError> {
  if s.score > s.max {
    return Err(GradeError::Internal(format!("{} subscore {} exceeds max {}", name, s.score, s.max)));
  }
  Ok(())
}

#[instrument(level = "debug", skip(policy))]
pub fn aggregate(
  breakdown: &ScoreBreakdown,
  mode: PlayMode,
  policy: &GradingPolicy,
) -> Result<Aggregate, GradeError> {
  check_subscore("datasheet", breakdown.datasheet)?;
  check_subscore("decisions", breakdown.decisions)?;
  check_subscore("discipline", breakdown.discipline)?;
  let max_total = breakdown.datasheet.max as u64 + breakdown.decisions.max as u64 + breakdown.discipline.max as u64;
  if max_total != 100 {
    return Err(GradeError::Internal(format!("subscore maxima sum to {}, not 100", max_total)));
  }

  let sum = breakdown.datasheet.score as u64 + breakdown.decisions.score as u64 + breakdown.discipline.score as u64;
  let score = sum.min(100) as u32;
  let xp = base_xp(score, policy).saturating_mul(mode_factor(mode, policy));
  let passed = score >= policy.pass_threshold;

  debug!(target: "grading", score, xp, passed, ?mode, "Aggregated");
  Ok(Aggregate { score, xp, passed })
}
