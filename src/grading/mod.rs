//! The grading engine: a pure, synchronous pipeline from one submission to one `GradeResult`.
//!
//! Order:
//!   1. hard-mode gate (fails before any scoring)
//!   2. field validator + decision comparator (independent)
//!   3. discipline evaluator
//!   4. score aggregator
//!   5. feedback composer
//!
//! No I/O, no shared mutable state. Safe to call from any number of tasks at once.

pub mod aggregate;
pub mod decisions;
pub mod discipline;
pub mod feedback;
pub mod fields;
pub mod policy;

use tracing::{info, instrument};

use crate::domain::{
  AnswerKey, Datasheet, GradeResult, GradeTelemetry, PlayMode, PlayerAnswers, Scenario, ScoreBreakdown,
};
use crate::error::GradeError;

pub use policy::GradingPolicy;

/// Everything one grading call needs. All borrowed; the engine never mutates its inputs.
#[derive(Debug, Clone, Copy)]
pub struct GradeInput<'a> {
  pub scenario: &'a Scenario,
  pub key: &'a AnswerKey,
  pub datasheet: &'a Datasheet,
  pub answers: &'a PlayerAnswers,
  pub mode: PlayMode,
  pub explanation: Option<&'a str>,
  pub telemetry: &'a GradeTelemetry,
}

#[instrument(level = "info", skip_all, fields(scenario = %input.scenario.id, mode = ?input.mode))]
pub fn grade(input: &GradeInput<'_>, policy: &GradingPolicy) -> Result<GradeResult, GradeError> {
  if input.key.scenario_id != input.scenario.id {
    return Err(GradeError::Internal(format!(
      "answer key '{}' paired with scenario '{}'",
      input.key.scenario_id, input.scenario.id
    )));
  }

  discipline::check_eligibility(input.scenario, input.mode, input.explanation, policy)?;

  let field_report = fields::validate_fields(input.scenario, input.key, input.datasheet, policy)?;
  let decision_report = decisions::compare_decisions(input.scenario, input.answers, input.key, policy);
  let discipline_report = discipline::evaluate_discipline(input.telemetry, input.mode, policy);

  let breakdown = ScoreBreakdown {
    datasheet: field_report.subscore,
    decisions: decision_report.subscore,
    discipline: discipline_report.subscore,
  };
  let totals = aggregate::aggregate(&breakdown, input.mode, policy)?;
  let fb = feedback::compose_feedback(input.scenario, &field_report, &decision_report, &discipline_report);

  info!(
    target: "grading",
    scenario = %input.scenario.id,
    score = totals.score,
    xp = totals.xp,
    passed = totals.passed,
    mistakes = fb.mistakes.len(),
    missing = fb.missing_fields.len(),
    "Submission graded"
  );

  Ok(GradeResult {
    score: totals.score,
    xp: totals.xp,
    passed: totals.passed,
    mode: input.mode,
    breakdown,
    mistakes: fb.mistakes,
    missing_fields: fb.missing_fields,
    remediation: fb.remediation,
    correct_answers: input.key.correct_answers(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{
    DischargeDestination, Expectation, ExpectedField, FieldId, OrificeLetter, RelievingCase, ServiceType,
    ValveStyle,
  };
  use crate::error::EligibilityError;

  fn gas_scenario(hard_eligible: bool) -> Scenario {
    Scenario {
      id: "gas-fire".into(),
      title: "Fire on a gas separator".into(),
      service: ServiceType::Gas,
      discharge: DischargeDestination::Flare,
      plausible_cases: vec![RelievingCase::FireCase, RelievingCase::BlockedOutlet],
      hard_eligible,
      required_inputs: vec![],
      constraints: vec![],
    }
  }

  fn gas_key() -> AnswerKey {
    AnswerKey {
      scenario_id: "gas-fire".into(),
      relieving_case: RelievingCase::FireCase,
      valve_style: ValveStyle::Bellows,
      orifice_letter: OrificeLetter::J,
      expected: vec![
        ExpectedField { field: FieldId::SetPressure, expect: Expectation::Approx { value: 150.0 } },
        ExpectedField { field: FieldId::MolecularWeight, expect: Expectation::Approx { value: 28.0 } },
        ExpectedField { field: FieldId::CompressibilityFactor, expect: Expectation::Range { min: 0.9, max: 1.0 } },
        ExpectedField {
          field: FieldId::DischargeDestination,
          expect: Expectation::Destination { value: DischargeDestination::Flare },
        },
      ],
    }
  }

  fn full_sheet() -> Datasheet {
    Datasheet {
      set_pressure: Some(151.0),
      relieving_temperature: Some(400.0),
      required_flow: Some(25000.0),
      molecular_weight: Some(28.2),
      compressibility_factor: Some(0.95),
      specific_heat_ratio: Some(1.3),
      discharge_destination: Some(DischargeDestination::Flare),
      superimposed_backpressure: Some(15.0),
      built_up_backpressure: Some(20.0),
      ..Datasheet::default()
    }
  }

  fn run(
    scenario: &Scenario,
    sheet: &Datasheet,
    answers: &PlayerAnswers,
    mode: PlayMode,
    explanation: Option<&str>,
    telemetry: &GradeTelemetry,
  ) -> Result<GradeResult, GradeError> {
    let key = gas_key();
    let input = GradeInput { scenario, key: &key, datasheet: sheet, answers, mode, explanation, telemetry };
    grade(&input, &GradingPolicy::default())
  }

  const EXPLANATION: &str = "Fire governs; flare backpressure requires a bellows valve.";

  #[test]
  fn test_perfect_standard_submission() {
    let r = run(
      &gas_scenario(true),
      &full_sheet(),
      &gas_key().correct_answers(),
      PlayMode::Standard,
      None,
      &GradeTelemetry::default(),
    )
    .unwrap();
    assert_eq!(r.score, 100);
    assert_eq!(r.xp, aggregate::base_xp(100, &GradingPolicy::default()));
    assert!(r.passed);
    assert!(r.mistakes.is_empty());
    assert!(r.missing_fields.is_empty());
    assert!(r.remediation.is_empty());
    assert_eq!(r.correct_answers.valve_style, ValveStyle::Bellows);
  }

  #[test]
  fn test_wrong_style_missing_fields_hints_retry() {
    let mut sheet = full_sheet();
    sheet.specific_heat_ratio = None;
    sheet.built_up_backpressure = None;
    let mut answers = gas_key().correct_answers();
    answers.valve_style = ValveStyle::Conventional;
    let telemetry = GradeTelemetry { hints_used: 3, attachments_opened: false, attempt_number: 2 };

    let r = run(&gas_scenario(true), &sheet, &answers, PlayMode::Standard, None, &telemetry).unwrap();

    assert_eq!(r.breakdown.decisions.score, 35 - 12);
    assert_eq!(r.breakdown.datasheet.score, 31);
    assert_eq!(r.breakdown.discipline.score, 25 - 9 - 2);
    assert_eq!(r.score, 31 + 23 + 14);
    assert!(!r.passed);
    assert_eq!(r.mistakes.len(), 1);
    assert!(r.mistakes[0].contains("conventional"));
    assert_eq!(r.missing_fields, vec![FieldId::SpecificHeatRatio, FieldId::BuiltUpBackpressure]);
    // style (closed discharge), missing fluid, missing discharge, hints, retries
    assert_eq!(r.remediation.len(), 5);
    assert_eq!(r.correct_answers.valve_style, ValveStyle::Bellows);
  }

  #[test]
  fn test_hard_on_ineligible_scenario_rejected() {
    let err = run(
      &gas_scenario(false),
      &full_sheet(),
      &gas_key().correct_answers(),
      PlayMode::Hard,
      Some(EXPLANATION),
      &GradeTelemetry::default(),
    )
    .unwrap_err();
    assert!(matches!(err, GradeError::Eligibility(EligibilityError::NotHardEligible { .. })));
  }

  #[test]
  fn test_hard_with_short_explanation_rejected_even_with_bad_sheet() {
    // gate runs before the field validator would see anything
    let err = run(
      &gas_scenario(true),
      &Datasheet::default(),
      &gas_key().correct_answers(),
      PlayMode::Hard,
      Some("too short"),
      &GradeTelemetry::default(),
    )
    .unwrap_err();
    assert!(matches!(err, GradeError::Eligibility(EligibilityError::ExplanationTooShort { .. })));
  }

  #[test]
  fn test_hard_doubles_standard_xp_and_practice_zero() {
    let s = gas_scenario(true);
    let answers = gas_key().correct_answers();
    let t = GradeTelemetry::default();
    let standard = run(&s, &full_sheet(), &answers, PlayMode::Standard, None, &t).unwrap();
    let hard = run(&s, &full_sheet(), &answers, PlayMode::Hard, Some(EXPLANATION), &t).unwrap();
    let practice = run(&s, &full_sheet(), &answers, PlayMode::Practice, None, &t).unwrap();
    assert_eq!(hard.xp, standard.xp * 2);
    assert_eq!(practice.xp, 0);
    assert_eq!(practice.score, 100);
  }

  #[test]
  fn test_idempotent_serialization() {
    let mut sheet = full_sheet();
    sheet.molecular_weight = Some(44.0);
    sheet.viscosity = Some(0.01);
    let answers = PlayerAnswers {
      relieving_case: RelievingCase::TubeRupture,
      valve_style: ValveStyle::Conventional,
      orifice_letter: OrificeLetter::K,
    };
    let t = GradeTelemetry { hints_used: 1, attachments_opened: true, attempt_number: 3 };
    let a = run(&gas_scenario(true), &sheet, &answers, PlayMode::Standard, None, &t).unwrap();
    let b = run(&gas_scenario(true), &sheet, &answers, PlayMode::Standard, None, &t).unwrap();
    assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
  }

  #[test]
  fn test_score_invariants_over_many_inputs() {
    let s = gas_scenario(true);
    let cases = [RelievingCase::FireCase, RelievingCase::BlockedOutlet, RelievingCase::TubeRupture];
    let styles = [ValveStyle::Conventional, ValveStyle::Bellows, ValveStyle::PilotOperated];
    let orifices = [OrificeLetter::D, OrificeLetter::J];
    let sheets = [Datasheet::default(), full_sheet(), Datasheet { molecular_weight: Some(2.0), ..full_sheet() }];
    for relieving_case in cases {
      for valve_style in styles {
        for orifice_letter in orifices {
          for sheet in &sheets {
            for hints in [0, 4, 20] {
              let answers = PlayerAnswers { relieving_case, valve_style, orifice_letter };
              let t = GradeTelemetry { hints_used: hints, attachments_opened: hints > 0, attempt_number: 1 + hints };
              let r = run(&s, sheet, &answers, PlayMode::Standard, None, &t).unwrap();
              let b = r.breakdown;
              assert!(r.score <= 100);
              assert_eq!(r.score, (b.datasheet.score + b.decisions.score + b.discipline.score).min(100));
              assert!(b.datasheet.score <= b.datasheet.max);
              assert!(b.decisions.score <= b.decisions.max);
              assert!(b.discipline.score <= b.discipline.max);
              assert_eq!(b.datasheet.max + b.decisions.max + b.discipline.max, 100);
            }
          }
        }
      }
    }
  }

  #[test]
  fn test_missing_fields_exactly_absent_required() {
    let s = gas_scenario(true);
    let required = fields::required_fields(&s);
    let sheet = Datasheet {
      set_pressure: Some(150.0),
      molecular_weight: Some(28.0),
      viscosity: Some(1.0),
      ..Datasheet::default()
    };
    let r = run(&s, &sheet, &gas_key().correct_answers(), PlayMode::Standard, None, &GradeTelemetry::default())
      .unwrap();
    let expected: Vec<FieldId> = required.into_iter().filter(|f| sheet.value(*f).is_none()).collect();
    assert_eq!(r.missing_fields, expected);
    assert!(!r.missing_fields.contains(&FieldId::Viscosity));
  }

  #[test]
  fn test_mismatched_key_is_internal() {
    let s = gas_scenario(true);
    let mut key = gas_key();
    key.scenario_id = "other".into();
    let sheet = full_sheet();
    let answers = key.correct_answers();
    let t = GradeTelemetry::default();
    let input = GradeInput {
      scenario: &s,
      key: &key,
      datasheet: &sheet,
      answers: &answers,
      mode: PlayMode::Standard,
      explanation: None,
      telemetry: &t,
    };
    assert!(matches!(grade(&input, &GradingPolicy::default()), Err(GradeError::Internal(_))));
  }
}
