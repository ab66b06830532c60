//! Feedback Composer: deterministic mistake, missing-field and remediation lists.
//!
//! Nothing here is generated prose. Remediation text comes from a fixed table keyed
//! by the rule that was violated, so identical submissions always render identically.

use crate::domain::{DischargeDestination, FieldGroup, FieldId, Scenario};
use crate::grading::decisions::{DecisionReport, DecisionSlot};
use crate::grading::discipline::{DisciplineFinding, DisciplineReport};
use crate::grading::fields::FieldReport;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemediationRule {
  RelievingCaseImplausible,
  RelievingCaseMisjudged,
  ValveStyleBackpressure,
  ValveStyleSelection,
  OrificeSelection,
  MissingProcessData,
  MissingFluidProperties,
  MissingDischargeData,
  MissingNotes,
  ProcessOutOfTolerance,
  FluidOutOfTolerance,
  DischargeOutOfTolerance,
  HintReliance,
  RetryReliance,
  AttachmentReliance,
}

/// Guidance text for a violated rule.
pub fn remediation_text(rule: RemediationRule) -> &'static str {
  match rule {
    RemediationRule::RelievingCaseImplausible =>
      "Re-read the upset narrative: the case you chose cannot occur in this scenario. List the credible upsets first, then pick the one with the largest relieving load.",
    RemediationRule::RelievingCaseMisjudged =>
      "Your case is credible but does not govern. Compare relieving loads across all credible upsets and size for the largest.",
    RemediationRule::ValveStyleBackpressure =>
      "The valve discharges into a closed system. Check superimposed and built-up backpressure against the conventional valve limit (about 10% of set) before choosing a style.",
    RemediationRule::ValveStyleSelection =>
      "Review valve style selection: conventional, balanced bellows and pilot-operated valves differ in backpressure tolerance, seat tightness and service limits.",
    RemediationRule::OrificeSelection =>
      "Recompute the required effective area and select the smallest standard orifice letter whose area meets or exceeds it.",
    RemediationRule::MissingProcessData =>
      "Complete the process conditions: set pressure, relieving temperature and required relieving flow are needed for every sizing.",
    RemediationRule::MissingFluidProperties =>
      "Fill in the fluid properties the service type needs (molecular weight, Z and k for gas; density and viscosity for liquid).",
    RemediationRule::MissingDischargeData =>
      "Record where the valve discharges and, for closed systems, both superimposed and built-up backpressure.",
    RemediationRule::MissingNotes =>
      "Add notes explaining the assumptions behind your datasheet.",
    RemediationRule::ProcessOutOfTolerance =>
      "Recheck the process conditions against the scenario narrative, including accumulation and unit conversions.",
    RemediationRule::FluidOutOfTolerance =>
      "Recheck fluid properties at relieving conditions, not at normal operating conditions.",
    RemediationRule::DischargeOutOfTolerance =>
      "Recheck the discharge routing and backpressure values against the header description.",
    RemediationRule::HintReliance =>
      "Try the next scenario with fewer hints; work the relieving case and datasheet before asking for help.",
    RemediationRule::RetryReliance =>
      "Repeated attempts reduce credit. Review the feedback fully before resubmitting.",
    RemediationRule::AttachmentReliance =>
      "You opened the reference attachments. Aim to identify the governing data from the scenario text alone.",
  }
}

fn missing_rule(group: FieldGroup) -> RemediationRule {
  match group {
    FieldGroup::Process => RemediationRule::MissingProcessData,
    FieldGroup::Fluid => RemediationRule::MissingFluidProperties,
    FieldGroup::Discharge => RemediationRule::MissingDischargeData,
    FieldGroup::Notes => RemediationRule::MissingNotes,
  }
}

fn tolerance_rule(group: FieldGroup) -> RemediationRule {
  match group {
    FieldGroup::Process => RemediationRule::ProcessOutOfTolerance,
    FieldGroup::Fluid => RemediationRule::FluidOutOfTolerance,
    FieldGroup::Discharge | FieldGroup::Notes => RemediationRule::DischargeOutOfTolerance,
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Feedback {
  pub mistakes: Vec<String>,
  pub missing_fields: Vec<FieldId>,
  pub remediation: Vec<String>,
  pub rules: Vec<RemediationRule>,
}

pub fn compose_feedback(
  scenario: &Scenario,
  fields: &FieldReport,
  decisions: &DecisionReport,
  discipline: &DisciplineReport,
) -> Feedback {
  let mut mistakes = Vec::new();
  let mut rules: Vec<RemediationRule> = Vec::new();
  fn push_rule(rules: &mut Vec<RemediationRule>, r: RemediationRule) {
    if !rules.contains(&r) {
      rules.push(r);
    }
  }

  // Categorical mismatches first, in slot order.
  let mut mismatches = decisions.mismatches.clone();
  mismatches.sort_by_key(|m| m.slot);
  for m in &mismatches {
    mistakes.push(format!("{}: submitted '{}', correct '{}'.", m.slot.label(), m.submitted, m.correct));
    let rule = match m.slot {
      DecisionSlot::RelievingCase if m.plausible => RemediationRule::RelievingCaseMisjudged,
      DecisionSlot::RelievingCase => RemediationRule::RelievingCaseImplausible,
      DecisionSlot::ValveStyle if scenario.discharge != DischargeDestination::Atmosphere =>
        RemediationRule::ValveStyleBackpressure,
      DecisionSlot::ValveStyle => RemediationRule::ValveStyleSelection,
      DecisionSlot::Orifice => RemediationRule::OrificeSelection,
    };
    push_rule(&mut rules, rule);
  }

  // Then out-of-tolerance values, canonical field order.
  let mut misses = fields.out_of_tolerance.clone();
  misses.sort_by_key(|m| m.field);
  for m in &misses {
    mistakes.push(format!("{}: submitted {}, expected {}.", m.field.label(), m.submitted, m.expected));
  }

  // Missing fields keep the scenario's required order.
  let missing_fields: Vec<FieldId> = fields
    .required
    .iter()
    .filter(|f| fields.missing.contains(f))
    .copied()
    .collect();

  for f in &missing_fields {
    push_rule(&mut rules, missing_rule(f.group()));
  }
  for m in &misses {
    push_rule(&mut rules, tolerance_rule(m.field.group()));
  }
  for finding in &discipline.findings {
    let rule = match finding {
      DisciplineFinding::Hints(_) => RemediationRule::HintReliance,
      DisciplineFinding::Retries(_) => RemediationRule::RetryReliance,
      DisciplineFinding::Attachments => RemediationRule::AttachmentReliance,
    };
    push_rule(&mut rules, rule);
  }

  let remediation = rules.iter().map(|r| remediation_text(*r).to_string()).collect();
  Feedback { mistakes, missing_fields, remediation, rules }
}
