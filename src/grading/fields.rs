//! Field Validator: which datasheet fields a scenario requires, and whether the
//! submitted values are present and within tolerance of the answer key.

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::domain::{
  AnswerKey, Datasheet, DischargeDestination, Expectation, FieldId, FieldValue, Scenario, ServiceType,
  Subscore,
};
use crate::error::GradeError;
use crate::grading::policy::GradingPolicy;

/// Required for every scenario regardless of service or routing.
const ALWAYS_REQUIRED: &[FieldId] = &[
  FieldId::SetPressure,
  FieldId::RelievingTemperature,
  FieldId::RequiredFlow,
  FieldId::DischargeDestination,
];

fn service_fields(service: ServiceType) -> &'static [FieldId] {
  match service {
    ServiceType::Gas => &[
      FieldId::MolecularWeight,
      FieldId::CompressibilityFactor,
      FieldId::SpecificHeatRatio,
    ],
    ServiceType::Steam => &[],
    ServiceType::Liquid => &[FieldId::LiquidDensity, FieldId::Viscosity],
    ServiceType::TwoPhase => &[
      FieldId::MolecularWeight,
      FieldId::LiquidDensity,
      FieldId::VaporFraction,
    ],
  }
}

fn discharge_fields(discharge: DischargeDestination) -> &'static [FieldId] {
  match discharge {
    DischargeDestination::Atmosphere => &[],
    DischargeDestination::Flare | DischargeDestination::ClosedHeader => &[
      FieldId::SuperimposedBackpressure,
      FieldId::BuiltUpBackpressure,
    ],
  }
}

/// Required fields for a scenario, in canonical field order.
pub fn required_fields(scenario: &Scenario) -> Vec<FieldId> {
  let set: BTreeSet<FieldId> = ALWAYS_REQUIRED
    .iter()
    .chain(service_fields(scenario.service))
    .chain(discharge_fields(scenario.discharge))
    .chain(scenario.required_inputs.iter())
    .copied()
    .collect();
  set.into_iter().collect()
}

/// A required field that was submitted but does not match the key.
#[derive(Clone, Debug, PartialEq)]
pub struct ToleranceMiss {
  pub field: FieldId,
  pub submitted: String,
  pub expected: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldReport {
  pub subscore: Subscore,
  pub required: Vec<FieldId>,
  /// Absent required fields, canonical order.
  pub missing: Vec<FieldId>,
  /// Present-but-wrong required fields, canonical order.
  pub out_of_tolerance: Vec<ToleranceMiss>,
}

enum Check {
  Within,
  Outside { submitted: String, expected: String },
}

/// Check a datasheet against the scenario's required fields and the key's expectations.
#[instrument(level = "debug", skip_all, fields(scenario = %scenario.id))]
pub fn validate_fields(
  scenario: &Scenario,
  key: &AnswerKey,
  sheet: &Datasheet,
  policy: &GradingPolicy,
) -> Result<FieldReport, GradeError> {
  let required = required_fields(scenario);
  let mut missing = Vec::new();
  let mut out_of_tolerance = Vec::new();
  let mut earned = 0.0_f64;

  for &field in &required {
    let Some(value) = sheet.value(field) else {
      missing.push(field);
      continue;
    };
    match key.expectation_for(field) {
      None => earned += 1.0,
      Some(expect) => match check_value(field, &value, expect, policy)? {
        Check::Within => earned += 1.0,
        Check::Outside { submitted, expected } => {
          earned += policy.partial_credit;
          out_of_tolerance.push(ToleranceMiss { field, submitted, expected });
        }
      },
    }
  }

  let max = policy.datasheet_max;
  let score = if required.is_empty() {
    max
  } else {
    ((earned / required.len() as f64) * max as f64).round().min(max as f64) as u32
  };

  debug!(
    target: "grading",
    required = required.len(),
    missing = missing.len(),
    out_of_tolerance = out_of_tolerance.len(),
    score,
    max,
    "Datasheet checked"
  );

  Ok(FieldReport {
    subscore: Subscore { score, max },
    required,
    missing,
    out_of_tolerance,
  })
}

fn check_value(
  field: FieldId,
  value: &FieldValue<'_>,
  expect: &Expectation,
  policy: &GradingPolicy,
) -> Result<Check, GradeError> {
  let check = match (value, expect) {
    (FieldValue::Number(v), Expectation::Approx { value: e }) => {
      let band = policy.tolerance * e.abs().max(policy.absolute_floor);
      if (v - e).abs() <= band {
        Check::Within
      } else {
        Check::Outside {
          submitted: format!("{}", v),
          expected: format!("{} (within {:.0}%)", e, policy.tolerance * 100.0),
        }
      }
    }
    (FieldValue::Number(v), Expectation::Range { min, max }) => {
      if *min <= *v && *v <= *max {
        Check::Within
      } else {
        Check::Outside {
          submitted: format!("{}", v),
          expected: format!("between {} and {}", min, max),
        }
      }
    }
    (FieldValue::Destination(d), Expectation::Destination { value: e }) => {
      if d == e {
        Check::Within
      } else {
        Check::Outside {
          submitted: d.as_str().to_string(),
          expected: e.as_str().to_string(),
        }
      }
    }
    _ => {
      return Err(GradeError::Internal(format!(
        "answer key expectation {:?} does not fit field {:?}",
        expect, field
      )))
    }
  };
  Ok(check)
}

/// True if an expectation kind can be applied to `field`. Used when loading keys.
pub fn expectation_fits(field: FieldId, expect: &Expectation) -> bool {
  match (field, expect) {
    (FieldId::Notes, _) => false,
    (FieldId::DischargeDestination, Expectation::Destination { .. }) => true,
    (FieldId::DischargeDestination, _) | (_, Expectation::Destination { .. }) => false,
    (_, Expectation::Range { min, max }) => min <= max,
    (_, Expectation::Approx { .. }) => true,
  }
}
