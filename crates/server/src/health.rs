use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    commands: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub commands: Vec<String>,
    pub checked_at: String,
}

pub fn router(commands: Vec<String>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { commands })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        commands: state.commands,
        checked_at: Utc::now().to_rfc3339(),
    };
    (StatusCode::OK, Json(payload))
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_reports_registered_commands() {
        let state = HealthState { commands: vec!["hello".to_string(), "point".to_string()] };

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.commands, vec!["hello", "point"]);
        assert!(chrono::DateTime::parse_from_rfc3339(&payload.checked_at).is_ok());
    }
}
