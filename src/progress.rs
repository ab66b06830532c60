//! Per-player progress: best score, attempt count, completion time and unlock flags.
//!
//! Every update is a read-modify-write performed under one write guard, so two
//! attempts racing for the same (player, scenario) can never lose an increment
//! or overwrite a higher best score with a lower one.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::domain::{GradeResult, PlayMode};

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub player_id: String,
    pub scenario_id: String,
    pub best_score: u32,
    pub best_xp: u32,
    pub attempts: u32,
    /// First time the scenario was passed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Set once the scenario is passed outside of practice.
    pub hard_unlocked: bool,
}

impl ProgressRecord {
    fn empty(player_id: &str, scenario_id: &str) -> Self {
        Self {
            player_id: player_id.to_string(),
            scenario_id: scenario_id.to_string(),
            best_score: 0,
            best_xp: 0,
            attempts: 0,
            completed_at: None,
            hard_unlocked: false,
        }
    }

    /// Fold one graded attempt into the record. Monotonic in every field.
    fn absorb(&mut self, result: &GradeResult, now: DateTime<Utc>) {
        self.attempts = self.attempts.saturating_add(1);
        self.best_score = self.best_score.max(result.score);
        self.best_xp = self.best_xp.max(result.xp);
        if result.passed {
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
            if result.mode != PlayMode::Practice {
                self.hard_unlocked = true;
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct ProgressStore {
    records: Arc<RwLock<HashMap<(String, String), ProgressRecord>>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one attempt and return the updated record.
    #[instrument(level = "debug", skip(self, result), fields(score = result.score))]
    pub async fn record_attempt(
        &self,
        player_id: &str,
        scenario_id: &str,
        result: &GradeResult,
        now: DateTime<Utc>,
    ) -> ProgressRecord {
        let mut records = self.records.write().await;
        let record = records
            .entry((player_id.to_string(), scenario_id.to_string()))
            .or_insert_with(|| ProgressRecord::empty(player_id, scenario_id));
        record.absorb(result, now);
        debug!(
            target: "relief_trainer",
            %player_id,
            %scenario_id,
            attempts = record.attempts,
            best_score = record.best_score,
            "Progress updated"
        );
        record.clone()
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, player_id: &str, scenario_id: &str) -> Option<ProgressRecord> {
        let records = self.records.read().await;
        records
            .get(&(player_id.to_string(), scenario_id.to_string()))
            .cloned()
    }
}
