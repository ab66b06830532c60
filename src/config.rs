//! Loading trainer configuration (grading policy + optional scenario bank) from TOML.
//!
//! See `TrainerConfig` and `ScenarioCfg` for expected schema:
//!
//! ```toml
//! [policy]
//! tolerance = 0.05
//!
//! [[scenarios]]
//! id = "hx-tube-rupture"
//! title = "Exchanger tube rupture"
//! service = "gas"
//! discharge = "flare"
//! plausible_cases = ["tube_rupture", "fire_case"]
//! hard_eligible = true
//!
//! [scenarios.answer]
//! relieving_case = "tube_rupture"
//! valve_style = "pilot_operated"
//! orifice_letter = "L"
//! expected = [
//!   { field = "setPressure", expect = { kind = "approx", value = 250.0 } },
//! ]
//! ```

use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{
  AnswerKey, DischargeDestination, ExpectedField, FieldId, OrificeLetter, RelievingCase, Scenario, ServiceType,
  ValveStyle,
};
use crate::grading::fields::expectation_fits;
use crate::grading::policy::{validate_policy, GradingPolicy};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TrainerConfig {
  #[serde(default)]
  pub policy: GradingPolicy,
  #[serde(default)]
  pub scenarios: Vec<ScenarioCfg>,
}

/// Scenario entry accepted in TOML configuration. The answer key lives inline.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  pub service: ServiceType,
  pub discharge: DischargeDestination,
  #[serde(default)] pub plausible_cases: Vec<RelievingCase>,
  #[serde(default)] pub hard_eligible: bool,
  #[serde(default)] pub required_inputs: Vec<FieldId>,
  #[serde(default)] pub constraints: Vec<String>,
  pub answer: AnswerCfg,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerCfg {
  pub relieving_case: RelievingCase,
  pub valve_style: ValveStyle,
  pub orifice_letter: OrificeLetter,
  #[serde(default)] pub expected: Vec<ExpectedField>,
}

impl ScenarioCfg {
  /// Build the scenario and its key. Entries without an id get a fresh UUID.
  /// Returns every problem found with the answer key.
  pub fn build(&self) -> Result<(Scenario, AnswerKey), Vec<String>> {
    let id = self.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut errors = Vec::new();
    for (i, e) in self.answer.expected.iter().enumerate() {
      if !expectation_fits(e.field, &e.expect) {
        errors.push(format!("scenarios[{}].answer.expected[{}]: {:?} cannot be checked as {:?}", id, i, e.field, e.expect));
      }
      if self.answer.expected[..i].iter().any(|prev| prev.field == e.field) {
        errors.push(format!("scenarios[{}].answer.expected[{}]: duplicate field {:?}", id, i, e.field));
      }
    }
    if !errors.is_empty() {
      return Err(errors);
    }

    let scenario = Scenario {
      id: id.clone(),
      title: self.title.clone(),
      service: self.service,
      discharge: self.discharge,
      plausible_cases: self.plausible_cases.clone(),
      hard_eligible: self.hard_eligible,
      required_inputs: self.required_inputs.clone(),
      constraints: self.constraints.clone(),
    };
    let key = AnswerKey {
      scenario_id: id,
      relieving_case: self.answer.relieving_case,
      valve_style: self.answer.valve_style,
      orifice_letter: self.answer.orifice_letter,
      expected: self.answer.expected.clone(),
    };
    Ok((scenario, key))
  }
}

/// Read and parse a config file. On any parsing/IO error, logs and returns None.
/// An invalid policy is replaced by the defaults.
pub fn load_config(path: &str) -> Option<TrainerConfig> {
  let mut cfg = match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<TrainerConfig>(&s) {
      Ok(cfg) => {
        info!(target: "relief_trainer", %path, scenarios = cfg.scenarios.len(), "Loaded trainer config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "relief_trainer", %path, error = %e, "Failed to parse TOML config");
        return None;
      }
    },
    Err(e) => {
      error!(target: "relief_trainer", %path, error = %e, "Failed to read TOML config file");
      return None;
    }
  };

  if let Err(errors) = validate_policy(&cfg.policy) {
    for e in &errors {
      error!(target: "relief_trainer", %path, error = %e, "Invalid grading policy");
    }
    error!(target: "relief_trainer", "Falling back to default grading policy");
    cfg.policy = GradingPolicy::default();
  }
  Some(cfg)
}

/// Load `TrainerConfig` from TRAINER_CONFIG_PATH, if set.
pub fn load_config_from_env() -> Option<TrainerConfig> {
  let path = std::env::var("TRAINER_CONFIG_PATH").ok()?;
  load_config(&path)
}
