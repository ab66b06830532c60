//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::error::GradeError;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "relief_trainer", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "relief_trainer", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        debug!(target: "relief_trainer", raw = %trunc_for_log(&txt, 200), "WS received");
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => handle_client_ws(incoming, &state).await,
          Err(e) => GradeError::validation(format!("invalid message: {}", e)).into(),
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          error!(target: "relief_trainer", error = %e, "WS serialization error");
          serde_json::json!({ "type": "error", "kind": "internal", "message": "Grading failed. Please try again later." }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "relief_trainer", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "relief_trainer", "WebSocket disconnected");
}

#[instrument(level = "info", skip(msg, state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListScenarios => ServerWsMessage::Scenarios { scenarios: list_scenarios(state) },

    ClientWsMessage::GetScenario { scenario_id } => match scenario_view(state, &scenario_id) {
      Ok(scenario) => ServerWsMessage::Scenario { scenario },
      Err(e) => e.into(),
    },

    ClientWsMessage::SubmitGrade { request } => {
      let scenario_id = request.scenario_id.clone();
      match grade_submission(state, request).await {
        Ok(result) => {
          info!(target: "grading", id = %scenario_id, score = result.score, xp = result.xp, "WS grade evaluated");
          ServerWsMessage::GradeResult { result }
        }
        Err(e) => {
          if let GradeError::Internal(detail) = &e {
            error!(target: "grading", %detail, "Internal grading failure");
          }
          e.into()
        }
      }
    }
  }
}
