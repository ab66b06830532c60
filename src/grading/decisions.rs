//! Decision Comparator: exact-match scoring of the three categorical answers.

use tracing::{debug, instrument};

use crate::domain::{AnswerKey, PlayerAnswers, Scenario, Subscore};
use crate::grading::policy::GradingPolicy;

/// Which categorical answer a mismatch belongs to. Order is slot order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DecisionSlot {
  RelievingCase,
  ValveStyle,
  Orifice,
}

impl DecisionSlot {
  pub fn label(self) -> &'static str {
    match self {
      DecisionSlot::RelievingCase => "Relieving case",
      DecisionSlot::ValveStyle => "Valve style",
      DecisionSlot::Orifice => "Orifice letter",
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mismatch {
  pub slot: DecisionSlot,
  pub submitted: &'static str,
  pub correct: &'static str,
  /// Relieving case only: was the submitted case at least plausible for the scenario?
  pub plausible: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecisionReport {
  pub subscore: Subscore,
  /// In slot order.
  pub mismatches: Vec<Mismatch>,
}

impl GradingPolicy {
  pub fn slot_weight(&self, slot: DecisionSlot) -> u32 {
    match slot {
      DecisionSlot::RelievingCase => self.relieving_case_weight,
      DecisionSlot::ValveStyle => self.valve_style_weight,
      DecisionSlot::Orifice => self.orifice_weight,
    }
  }
}

#[instrument(level = "debug", skip_all, fields(scenario = %scenario.id))]
pub fn compare_decisions(
  scenario: &Scenario,
  answers: &PlayerAnswers,
  key: &AnswerKey,
  policy: &GradingPolicy,
) -> DecisionReport {
  let mut mismatches = Vec::new();

  if answers.relieving_case != key.relieving_case {
    mismatches.push(Mismatch {
      slot: DecisionSlot::RelievingCase,
      submitted: answers.relieving_case.as_str(),
      correct: key.relieving_case.as_str(),
      plausible: scenario.plausible_cases.contains(&answers.relieving_case),
    });
  }
  if answers.valve_style != key.valve_style {
    mismatches.push(Mismatch {
      slot: DecisionSlot::ValveStyle,
      submitted: answers.valve_style.as_str(),
      correct: key.valve_style.as_str(),
      plausible: true,
    });
  }
  if answers.orifice_letter != key.orifice_letter {
    mismatches.push(Mismatch {
      slot: DecisionSlot::Orifice,
      submitted: answers.orifice_letter.as_str(),
      correct: key.orifice_letter.as_str(),
      plausible: true,
    });
  }

  let lost: u32 = mismatches.iter().map(|m| policy.slot_weight(m.slot)).sum();
  let max = policy.decision_max;
  let score = max.saturating_sub(lost);

  debug!(target: "grading", mismatches = mismatches.len(), score, max, "Decisions compared");

  DecisionReport { subscore: Subscore { score, max }, mismatches }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{
    DischargeDestination, OrificeLetter, RelievingCase, ServiceType, ValveStyle,
  };

  fn scenario() -> Scenario {
    Scenario {
      id: "gas".into(),
      title: "gas".into(),
      service: ServiceType::Gas,
      discharge: DischargeDestination::Flare,
      plausible_cases: vec![RelievingCase::FireCase, RelievingCase::BlockedOutlet],
      hard_eligible: true,
      required_inputs: vec![],
      constraints: vec![],
    }
  }

  fn key() -> AnswerKey {
    AnswerKey {
      scenario_id: "gas".into(),
      relieving_case: RelievingCase::FireCase,
      valve_style: ValveStyle::Bellows,
      orifice_letter: OrificeLetter::J,
      expected: vec![],
    }
  }

  #[test]
  fn test_all_correct_full_credit() {
    let r = compare_decisions(&scenario(), &key().correct_answers(), &key(), &GradingPolicy::default());
    assert_eq!(r.subscore, Subscore { score: 35, max: 35 });
    assert!(r.mismatches.is_empty());
  }

  #[test]
  fn test_wrong_style_loses_style_weight() {
    let mut answers = key().correct_answers();
    answers.valve_style = ValveStyle::Conventional;
    let r = compare_decisions(&scenario(), &answers, &key(), &GradingPolicy::default());
    assert_eq!(r.subscore.score, 35 - 12);
    assert_eq!(r.mismatches.len(), 1);
    assert_eq!(r.mismatches[0].submitted, "conventional");
    assert_eq!(r.mismatches[0].correct, "bellows");
  }

  #[test]
  fn test_all_wrong_zero_and_slot_order() {
    let answers = PlayerAnswers {
      relieving_case: RelievingCase::TubeRupture,
      valve_style: ValveStyle::PilotOperated,
      orifice_letter: OrificeLetter::D,
    };
    let r = compare_decisions(&scenario(), &answers, &key(), &GradingPolicy::default());
    assert_eq!(r.subscore.score, 0);
    let slots: Vec<_> = r.mismatches.iter().map(|m| m.slot).collect();
    assert_eq!(
      slots,
      vec![DecisionSlot::RelievingCase, DecisionSlot::ValveStyle, DecisionSlot::Orifice]
    );
    assert!(!r.mismatches[0].plausible);
  }

  #[test]
  fn test_plausible_case_flagged() {
    let mut answers = key().correct_answers();
    answers.relieving_case = RelievingCase::BlockedOutlet;
    let r = compare_decisions(&scenario(), &answers, &key(), &GradingPolicy::default());
    assert!(r.mismatches[0].plausible);
    assert_eq!(r.subscore.score, 20);
  }

  #[test]
  fn test_weights_are_ranked() {
    let p = GradingPolicy::default();
    assert!(p.slot_weight(DecisionSlot::RelievingCase) > p.slot_weight(DecisionSlot::ValveStyle));
    assert!(p.slot_weight(DecisionSlot::ValveStyle) > p.slot_weight(DecisionSlot::Orifice));
  }
}
