//! Application state: the scenario catalog, answer keys, grading policy and progress store.
//!
//! This module owns:
//!   - scenarios and answer keys by id (built once, never mutated, no locking)
//!   - the scenario listing order
//!   - the grading policy (from TOML or defaults)
//!   - the progress store (the only mutable piece)
//!
//! Config-bank scenarios are inserted first; built-in seeds fill in any id the bank did not use.

use std::{collections::HashMap, sync::Arc};
use tracing::{error, info, instrument};

use crate::config::{load_config_from_env, TrainerConfig};
use crate::domain::{AnswerKey, Scenario};
use crate::error::GradeError;
use crate::grading::GradingPolicy;
use crate::progress::ProgressStore;
use crate::seeds::seed_scenarios;

#[derive(Clone)]
pub struct AppState {
    pub scenarios: Arc<HashMap<String, Scenario>>,
    pub keys: Arc<HashMap<String, AnswerKey>>,
    pub order: Arc<Vec<String>>,
    pub policy: Arc<GradingPolicy>,
    pub progress: ProgressStore,
}

impl AppState {
    /// Build state from env: load config, merge bank + seeds, build indices.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(load_config_from_env())
    }

    pub fn from_config(cfg: Option<TrainerConfig>) -> Self {
        let policy = cfg.as_ref().map(|c| c.policy.clone()).unwrap_or_default();

        let mut scenarios = HashMap::<String, Scenario>::new();
        let mut keys = HashMap::<String, AnswerKey>::new();
        let mut order = Vec::<String>::new();

        if let Some(cfg) = &cfg {
            for sc in &cfg.scenarios {
                match sc.build() {
                    Ok((scenario, key)) => {
                        if scenarios.contains_key(&scenario.id) {
                            error!(target: "relief_trainer", id = %scenario.id, "Skipping bank item: duplicate id.");
                            continue;
                        }
                        order.push(scenario.id.clone());
                        keys.insert(scenario.id.clone(), key);
                        scenarios.insert(scenario.id.clone(), scenario);
                    }
                    Err(errors) => {
                        for e in errors {
                            error!(target: "relief_trainer", title = %sc.title, error = %e, "Skipping bank item: invalid answer key.");
                        }
                    }
                }
            }
        }

        // Always insert built-in seeds, but don't overwrite existing ids.
        for (scenario, key) in seed_scenarios() {
            if scenarios.contains_key(&scenario.id) {
                continue;
            }
            order.push(scenario.id.clone());
            keys.insert(scenario.id.clone(), key);
            scenarios.insert(scenario.id.clone(), scenario);
        }

        let hard_eligible = scenarios.values().filter(|s| s.hard_eligible).count();
        info!(
            target: "relief_trainer",
            scenarios = scenarios.len(),
            hard_eligible,
            tolerance = policy.tolerance,
            pass_threshold = policy.pass_threshold,
            "Startup scenario inventory"
        );

        Self {
            scenarios: Arc::new(scenarios),
            keys: Arc::new(keys),
            order: Arc::new(order),
            policy: Arc::new(policy),
            progress: ProgressStore::new(),
        }
    }

    pub fn get_scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.get(id)
    }

    /// Scenarios in listing order: bank first, then seeds.
    pub fn list_scenarios(&self) -> Vec<&Scenario> {
        self.order.iter().filter_map(|id| self.scenarios.get(id)).collect()
    }

    /// Both lookups must succeed before grading proceeds.
    #[instrument(level = "debug", skip(self))]
    pub fn lookup(&self, id: &str) -> Result<(&Scenario, &AnswerKey), GradeError> {
        let scenario = self
            .scenarios
            .get(id)
            .ok_or_else(|| GradeError::NotFound(format!("scenario '{}'", id)))?;
        let key = self
            .keys
            .get(id)
            .ok_or_else(|| GradeError::NotFound(format!("answer key for '{}'", id)))?;
        Ok((scenario, key))
    }
}
