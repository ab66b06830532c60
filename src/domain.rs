//! Domain models used by the backend: closed enumerations for services, cases,
//! valve styles and orifices, plus the scenario, answer key, datasheet and grade result.

use serde::{Deserialize, Serialize};

/// Fluid service a scenario relieves.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
  Gas,
  Steam,
  Liquid,
  TwoPhase,
}

/// Upset condition that sets the required relief capacity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RelievingCase {
  FireCase,
  BlockedOutlet,
  ControlValveFailure,
  TubeRupture,
  ThermalExpansion,
  PowerFailure,
  CoolingWaterFailure,
}

/// Construction category of the relief valve.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValveStyle {
  Conventional,
  Bellows,
  PilotOperated,
}

/// Standard effective-area orifice letters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrificeLetter {
  D, E, F, G, H, J, K, L, M, N, P, Q, R, T,
}

/// Where the relief discharge is routed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DischargeDestination {
  Atmosphere,
  Flare,
  ClosedHeader,
}

/// How an attempt is played. Fixed for the lifetime of one grading call.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
  Practice,
  #[default]
  Standard,
  Hard,
}

impl RelievingCase {
  pub fn as_str(self) -> &'static str {
    match self {
      RelievingCase::FireCase => "fire_case",
      RelievingCase::BlockedOutlet => "blocked_outlet",
      RelievingCase::ControlValveFailure => "control_valve_failure",
      RelievingCase::TubeRupture => "tube_rupture",
      RelievingCase::ThermalExpansion => "thermal_expansion",
      RelievingCase::PowerFailure => "power_failure",
      RelievingCase::CoolingWaterFailure => "cooling_water_failure",
    }
  }
}

impl ValveStyle {
  pub fn as_str(self) -> &'static str {
    match self {
      ValveStyle::Conventional => "conventional",
      ValveStyle::Bellows => "bellows",
      ValveStyle::PilotOperated => "pilot_operated",
    }
  }
}

impl OrificeLetter {
  pub fn as_str(self) -> &'static str {
    match self {
      OrificeLetter::D => "D", OrificeLetter::E => "E", OrificeLetter::F => "F",
      OrificeLetter::G => "G", OrificeLetter::H => "H", OrificeLetter::J => "J",
      OrificeLetter::K => "K", OrificeLetter::L => "L", OrificeLetter::M => "M",
      OrificeLetter::N => "N", OrificeLetter::P => "P", OrificeLetter::Q => "Q",
      OrificeLetter::R => "R", OrificeLetter::T => "T",
    }
  }
}

impl DischargeDestination {
  pub fn as_str(self) -> &'static str {
    match self {
      DischargeDestination::Atmosphere => "atmosphere",
      DischargeDestination::Flare => "flare",
      DischargeDestination::ClosedHeader => "closed_header",
    }
  }
}

/// Datasheet field identifiers. Declaration order is the canonical field order
/// used for required-field lists and feedback.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
  SetPressure,
  RelievingTemperature,
  RequiredFlow,
  MolecularWeight,
  CompressibilityFactor,
  SpecificHeatRatio,
  LiquidDensity,
  Viscosity,
  VaporFraction,
  DischargeDestination,
  SuperimposedBackpressure,
  BuiltUpBackpressure,
  Notes,
}

/// Coarse grouping of fields, used to key remediation guidance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldGroup {
  Process,
  Fluid,
  Discharge,
  Notes,
}

impl FieldId {
  pub const ALL: [FieldId; 13] = [
    FieldId::SetPressure,
    FieldId::RelievingTemperature,
    FieldId::RequiredFlow,
    FieldId::MolecularWeight,
    FieldId::CompressibilityFactor,
    FieldId::SpecificHeatRatio,
    FieldId::LiquidDensity,
    FieldId::Viscosity,
    FieldId::VaporFraction,
    FieldId::DischargeDestination,
    FieldId::SuperimposedBackpressure,
    FieldId::BuiltUpBackpressure,
    FieldId::Notes,
  ];

  pub fn group(self) -> FieldGroup {
    match self {
      FieldId::SetPressure | FieldId::RelievingTemperature | FieldId::RequiredFlow => FieldGroup::Process,
      FieldId::MolecularWeight
      | FieldId::CompressibilityFactor
      | FieldId::SpecificHeatRatio
      | FieldId::LiquidDensity
      | FieldId::Viscosity
      | FieldId::VaporFraction => FieldGroup::Fluid,
      FieldId::DischargeDestination
      | FieldId::SuperimposedBackpressure
      | FieldId::BuiltUpBackpressure => FieldGroup::Discharge,
      FieldId::Notes => FieldGroup::Notes,
    }
  }

  /// Wire name, as used in datasheet keys and `missingFields`.
  pub fn as_str(self) -> &'static str {
    match self {
      FieldId::SetPressure => "setPressure",
      FieldId::RelievingTemperature => "relievingTemperature",
      FieldId::RequiredFlow => "requiredFlow",
      FieldId::MolecularWeight => "molecularWeight",
      FieldId::CompressibilityFactor => "compressibilityFactor",
      FieldId::SpecificHeatRatio => "specificHeatRatio",
      FieldId::LiquidDensity => "liquidDensity",
      FieldId::Viscosity => "viscosity",
      FieldId::VaporFraction => "vaporFraction",
      FieldId::DischargeDestination => "dischargeDestination",
      FieldId::SuperimposedBackpressure => "superimposedBackpressure",
      FieldId::BuiltUpBackpressure => "builtUpBackpressure",
      FieldId::Notes => "notes",
    }
  }

  /// Human label used in feedback text.
  pub fn label(self) -> &'static str {
    match self {
      FieldId::SetPressure => "Set pressure",
      FieldId::RelievingTemperature => "Relieving temperature",
      FieldId::RequiredFlow => "Required relieving flow",
      FieldId::MolecularWeight => "Molecular weight",
      FieldId::CompressibilityFactor => "Compressibility factor (Z)",
      FieldId::SpecificHeatRatio => "Specific heat ratio (k)",
      FieldId::LiquidDensity => "Liquid density",
      FieldId::Viscosity => "Viscosity",
      FieldId::VaporFraction => "Vapor mass fraction",
      FieldId::DischargeDestination => "Discharge destination",
      FieldId::SuperimposedBackpressure => "Superimposed backpressure",
      FieldId::BuiltUpBackpressure => "Built-up backpressure",
      FieldId::Notes => "Notes",
    }
  }
}

/// Immutable scenario reference data. Built once at startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
  pub id: String,
  pub title: String,
  pub service: ServiceType,
  pub discharge: DischargeDestination,
  #[serde(default)] pub plausible_cases: Vec<RelievingCase>,
  #[serde(default)] pub hard_eligible: bool,
  /// Extra author-declared required fields on top of the service/discharge table.
  #[serde(default)] pub required_inputs: Vec<FieldId>,
  #[serde(default)] pub constraints: Vec<String>,
}

/// How a submitted value is compared against the key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
  /// Within the policy's relative tolerance of `value`.
  Approx { value: f64 },
  /// Inclusive band.
  Range { min: f64, max: f64 },
  /// Discharge routing must match exactly.
  Destination { value: DischargeDestination },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExpectedField {
  pub field: FieldId,
  pub expect: Expectation,
}

/// Correct outcome for one scenario. Read-only for the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerKey {
  pub scenario_id: String,
  pub relieving_case: RelievingCase,
  pub valve_style: ValveStyle,
  pub orifice_letter: OrificeLetter,
  #[serde(default)] pub expected: Vec<ExpectedField>,
}

impl AnswerKey {
  pub fn expectation_for(&self, field: FieldId) -> Option<&Expectation> {
    self.expected.iter().find(|e| e.field == field).map(|e| &e.expect)
  }

  pub fn correct_answers(&self) -> PlayerAnswers {
    PlayerAnswers {
      relieving_case: self.relieving_case,
      valve_style: self.valve_style,
      orifice_letter: self.orifice_letter,
    }
  }
}

/// Submitted datasheet snapshot. Every field is optional at the type level.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Datasheet {
  #[serde(default)] pub set_pressure: Option<f64>,
  #[serde(default)] pub relieving_temperature: Option<f64>,
  #[serde(default)] pub required_flow: Option<f64>,
  #[serde(default)] pub molecular_weight: Option<f64>,
  #[serde(default)] pub compressibility_factor: Option<f64>,
  #[serde(default)] pub specific_heat_ratio: Option<f64>,
  #[serde(default)] pub liquid_density: Option<f64>,
  #[serde(default)] pub viscosity: Option<f64>,
  #[serde(default)] pub vapor_fraction: Option<f64>,
  #[serde(default)] pub discharge_destination: Option<DischargeDestination>,
  #[serde(default)] pub superimposed_backpressure: Option<f64>,
  #[serde(default)] pub built_up_backpressure: Option<f64>,
  #[serde(default)] pub notes: Option<String>,
}

/// A single submitted datasheet value, typed by what the field holds.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue<'a> {
  Number(f64),
  Destination(DischargeDestination),
  Text(&'a str),
}

impl Datasheet {
  /// Value of `field`, or `None` when absent. Blank notes count as absent.
  pub fn value(&self, field: FieldId) -> Option<FieldValue<'_>> {
    let num = |v: Option<f64>| v.map(FieldValue::Number);
    match field {
      FieldId::SetPressure => num(self.set_pressure),
      FieldId::RelievingTemperature => num(self.relieving_temperature),
      FieldId::RequiredFlow => num(self.required_flow),
      FieldId::MolecularWeight => num(self.molecular_weight),
      FieldId::CompressibilityFactor => num(self.compressibility_factor),
      FieldId::SpecificHeatRatio => num(self.specific_heat_ratio),
      FieldId::LiquidDensity => num(self.liquid_density),
      FieldId::Viscosity => num(self.viscosity),
      FieldId::VaporFraction => num(self.vapor_fraction),
      FieldId::DischargeDestination => self.discharge_destination.map(FieldValue::Destination),
      FieldId::SuperimposedBackpressure => num(self.superimposed_backpressure),
      FieldId::BuiltUpBackpressure => num(self.built_up_backpressure),
      FieldId::Notes => self
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(FieldValue::Text),
    }
  }
}

/// The trainee's three categorical selections.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAnswers {
  pub relieving_case: RelievingCase,
  pub valve_style: ValveStyle,
  pub orifice_letter: OrificeLetter,
}

/// How the attempt was made.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GradeTelemetry {
  pub hints_used: u32,
  pub attachments_opened: bool,
  pub attempt_number: u32,
}

impl Default for GradeTelemetry {
  fn default() -> Self {
    Self { hints_used: 0, attachments_opened: false, attempt_number: 1 }
  }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Subscore {
  pub score: u32,
  pub max: u32,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct ScoreBreakdown {
  pub datasheet: Subscore,
  pub decisions: Subscore,
  pub discipline: Subscore,
}

/// The engine's sole output.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
  pub score: u32,
  pub xp: u32,
  pub passed: bool,
  pub mode: PlayMode,
  pub breakdown: ScoreBreakdown,
  pub mistakes: Vec<String>,
  pub missing_fields: Vec<FieldId>,
  pub remediation: Vec<String>,
  pub correct_answers: PlayerAnswers,
}
