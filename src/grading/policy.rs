use serde::{Deserialize, Serialize};

/// Grading policy constants.
///
/// Every value can be overridden from the `[policy]` table of the TOML config;
/// missing keys keep their default.
///
/// Example TOML:
/// ```toml
/// [policy]
/// datasheet_max = 40
/// decision_max = 35
/// discipline_max = 25
/// tolerance = 0.05
/// hint_penalty = 3
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GradingPolicy {
  pub datasheet_max: u32,
  pub decision_max: u32,
  pub discipline_max: u32,

  /// Relative tolerance for `approx` expectations.
  pub tolerance: f64,
  /// Scale floor for relative tolerance, so near-zero expected values
  /// (e.g. 0 psig backpressure) still have a usable band.
  pub absolute_floor: f64,
  /// Credit for a present but out-of-tolerance field (0..=1).
  pub partial_credit: f64,

  pub relieving_case_weight: u32,
  pub valve_style_weight: u32,
  pub orifice_weight: u32,

  pub hint_penalty: u32,
  pub attachment_penalty: u32,
  /// Retry penalty grows by this much for every extra attempt.
  pub attempt_step: u32,
  pub min_explanation_chars: usize,

  pub xp_per_point: u32,
  pub hard_xp_factor: u32,
  pub pass_threshold: u32,
}

impl Default for GradingPolicy {
  fn default() -> Self {
    Self {
      datasheet_max: 40,
      decision_max: 35,
      discipline_max: 25,
      tolerance: 0.05,
      absolute_floor: 1.0,
      partial_credit: 0.5,
      relieving_case_weight: 15,
      valve_style_weight: 12,
      orifice_weight: 8,
      hint_penalty: 3,
      attachment_penalty: 2,
      attempt_step: 2,
      min_explanation_chars: 20,
      xp_per_point: 1,
      hard_xp_factor: 2,
      pass_threshold: 80,
    }
  }
}

/// Validate a policy at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_policy(p: &GradingPolicy) -> Result<(), Vec<String>> {
  let mut errors = Vec::new();

  for (name, max) in [
    ("datasheet_max", p.datasheet_max),
    ("decision_max", p.decision_max),
    ("discipline_max", p.discipline_max),
  ] {
    if max > 100 {
      errors.push(format!("policy.{}: must be <= 100, got {}", name, max));
    }
  }

  let total = p.datasheet_max as u64 + p.decision_max as u64 + p.discipline_max as u64;
  if total != 100 {
    errors.push(format!(
      "policy: datasheet_max + decision_max + discipline_max must be 100, got {}",
      total
    ));
  }

  let weights = p.relieving_case_weight as u64 + p.valve_style_weight as u64 + p.orifice_weight as u64;
  if weights != p.decision_max as u64 {
    errors.push(format!(
      "policy: decision weights must sum to decision_max ({}), got {}",
      p.decision_max, weights
    ));
  }
  if !(p.relieving_case_weight > p.valve_style_weight && p.valve_style_weight > p.orifice_weight) {
    errors.push("policy: weights must rank relieving case > valve style > orifice".to_string());
  }

  if !(p.tolerance > 0.0 && p.tolerance < 1.0) {
    errors.push(format!("policy.tolerance: must be in (0, 1), got {}", p.tolerance));
  }
  if !(p.absolute_floor > 0.0) {
    errors.push(format!("policy.absolute_floor: must be positive, got {}", p.absolute_floor));
  }
  if !(0.0..=1.0).contains(&p.partial_credit) {
    errors.push(format!("policy.partial_credit: must be in [0, 1], got {}", p.partial_credit));
  }
  if p.hard_xp_factor < 1 {
    errors.push("policy.hard_xp_factor: must be at least 1".to_string());
  }
  if p.pass_threshold > 100 {
    errors.push(format!("policy.pass_threshold: must be <= 100, got {}", p.pass_threshold));
  }

  if errors.is_empty() {
    Ok(())
  } else {
    Err(errors)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_policy_is_valid() {
    assert!(validate_policy(&GradingPolicy::default()).is_ok());
  }

  #[test]
  fn test_maxima_must_sum_to_hundred() {
    let p = GradingPolicy { datasheet_max: 50, ..GradingPolicy::default() };
    let errors = validate_policy(&p).unwrap_err();
    assert!(errors[0].contains("must be 100"));
  }

  #[test]
  fn test_collects_multiple_errors() {
    let p = GradingPolicy {
      tolerance: 0.0,
      partial_credit: 1.5,
      orifice_weight: 20,
      ..GradingPolicy::default()
    };
    let errors = validate_policy(&p).unwrap_err();
    // weights sum + ranking + tolerance + partial credit
    assert_eq!(errors.len(), 4);
  }

  #[test]
  fn test_huge_maxima_reported_not_wrapped() {
    let p = GradingPolicy { datasheet_max: u32::MAX, decision_max: 1, discipline_max: 100, ..GradingPolicy::default() };
    let errors = validate_policy(&p).unwrap_err();
    assert!(errors.iter().any(|e| e.starts_with("policy.datasheet_max")));
    assert!(errors.iter().any(|e| e.contains("must be 100")));
  }

  #[test]
  fn test_huge_weights_reported_not_wrapped() {
    let p = GradingPolicy {
      relieving_case_weight: u32::MAX,
      valve_style_weight: 1,
      orifice_weight: 35,
      ..GradingPolicy::default()
    };
    let errors = validate_policy(&p).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("decision weights")));
  }

  #[test]
  fn test_tied_weights_rejected() {
    let p = GradingPolicy {
      relieving_case_weight: 12,
      valve_style_weight: 12,
      orifice_weight: 11,
      ..GradingPolicy::default()
    };
    let errors = validate_policy(&p).unwrap_err();
    assert_eq!(errors, vec!["policy: weights must rank relieving case > valve style > orifice".to_string()]);
  }

  #[test]
  fn test_partial_toml_keeps_defaults() {
    let p: GradingPolicy = toml::from_str("tolerance = 0.1\nhint_penalty = 4").unwrap();
    assert_eq!(p.tolerance, 0.1);
    assert_eq!(p.hint_penalty, 4);
    assert_eq!(p.datasheet_max, 40);
  }

  #[test]
  fn test_unknown_key_rejected() {
    assert!(toml::from_str::<GradingPolicy>("tolerence = 0.1").is_err());
  }
}
