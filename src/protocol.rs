//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Datasheet, DischargeDestination, FieldId, FieldValue, GradeResult, GradeTelemetry, PlayMode, PlayerAnswers,
    RelievingCase, Scenario, ServiceType,
};
use crate::error::GradeError;
use crate::grading::fields::required_fields;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListScenarios,
    GetScenario {
        #[serde(rename = "scenarioId")]
        scenario_id: String,
    },
    SubmitGrade {
        request: GradeRequest,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Scenarios {
        scenarios: Vec<ScenarioOut>,
    },
    Scenario {
        scenario: ScenarioOut,
    },
    GradeResult {
        result: GradeResult,
    },
    Error {
        kind: &'static str,
        message: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        details: Vec<String>,
    },
}

impl From<GradeError> for ServerWsMessage {
    fn from(e: GradeError) -> Self {
        let body = e.to_body();
        ServerWsMessage::Error { kind: body.error, message: body.message, details: body.details }
    }
}

/// Public view of a scenario. The answer key is never part of it.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOut {
    pub id: String,
    pub title: String,
    pub service: ServiceType,
    pub discharge: DischargeDestination,
    pub plausible_cases: Vec<RelievingCase>,
    pub hard_eligible: bool,
    pub required_fields: Vec<FieldId>,
    pub constraints: Vec<String>,
}

/// Convert internal `Scenario` to the public DTO.
pub fn to_out(s: &Scenario) -> ScenarioOut {
    ScenarioOut {
        id: s.id.clone(),
        title: s.title.clone(),
        service: s.service,
        discharge: s.discharge,
        plausible_cases: s.plausible_cases.clone(),
        hard_eligible: s.hard_eligible,
        required_fields: required_fields(s),
        constraints: s.constraints.clone(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GradeRequest {
    pub scenario_id: String,
    pub mode: PlayMode,
    #[serde(default)]
    pub datasheet: Datasheet,
    pub answers: PlayerAnswers,
    #[serde(default)]
    pub explanation_text: Option<String>,
    #[serde(default)]
    pub telemetry: Option<GradeTelemetry>,
    /// When present (and not practice), the attempt is folded into progress.
    #[serde(default)]
    pub player_id: Option<String>,
}

/// Fields whose values must be strictly positive when submitted.
const POSITIVE_FIELDS: &[FieldId] = &[
    FieldId::RequiredFlow,
    FieldId::MolecularWeight,
    FieldId::CompressibilityFactor,
    FieldId::SpecificHeatRatio,
    FieldId::LiquidDensity,
    FieldId::Viscosity,
];

fn number(sheet: &Datasheet, field: FieldId) -> Option<f64> {
    match sheet.value(field) {
        Some(FieldValue::Number(v)) => Some(v),
        _ => None,
    }
}

impl GradeRequest {
    /// Semantic checks serde cannot express. Returns every problem at once.
    pub fn validate(&self) -> Result<(), GradeError> {
        let mut details = Vec::new();

        if self.scenario_id.trim().is_empty() {
            details.push("scenarioId: must not be empty".to_string());
        }
        if let Some(t) = &self.telemetry {
            if t.attempt_number < 1 {
                details.push("telemetry.attemptNumber: must be at least 1".to_string());
            }
        }
        for field in FieldId::ALL {
            let Some(v) = number(&self.datasheet, field) else { continue };
            let name = field.as_str();
            if !v.is_finite() {
                details.push(format!("datasheet.{}: must be a finite number", name));
            } else if POSITIVE_FIELDS.contains(&field) && v <= 0.0 {
                details.push(format!("datasheet.{}: must be greater than 0, got {}", name, v));
            } else if field == FieldId::VaporFraction && !(0.0..=1.0).contains(&v) {
                details.push(format!("datasheet.{}: must be between 0 and 1, got {}", name, v));
            }
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(GradeError::Validation { details })
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScenarioQuery {
    #[serde(rename = "scenarioId")]
    pub scenario_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    #[serde(rename = "playerId")]
    pub player_id: String,
    #[serde(rename = "scenarioId")]
    pub scenario_id: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
