use crate::error::AppError;
use crate::normalizer::NotActionable;
use crate::pipeline::Acknowledgment;
use crate::types::AppState;
use crate::vapi_types::CallEvent;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info_span, trace, Instrument};
use uuid::Uuid;

/// Decode a webhook body.  An empty body, `null`, or a non-object is a missing payload; only
/// invalid JSON is a bad request.  Wrongly typed fields inside the object read as absent.
fn parse_event(body: &str) -> Result<Option<CallEvent>, AppError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str::<Value>(body).map_err(|e| {
        error!(error=%e, "failed to parse webhook body as json");
        AppError::BadRequest
    })?;
    if !value.is_object() {
        return Ok(None);
    }
    serde_json::from_value::<CallEvent>(value)
        .map(Some)
        .map_err(|e| {
            error!(error=%e, "failed to deserialize vapi call event");
            AppError::BadRequest
        })
}

pub async fn vapi_webhook(
    State(app_state): State<Arc<AppState>>,
    body: String,
) -> Result<Response, AppError> {
    trace!(body=%body, "webhook request body");
    let event = parse_event(&body)?;

    let request_id = Uuid::new_v4();
    let ack = app_state
        .pipeline
        .process(event)
        .instrument(info_span!("call_event", %request_id))
        .await;

    match ack {
        Acknowledgment::Ignored(NotActionable::MissingPayload) => {
            Ok((StatusCode::OK, "Ignored").into_response())
        }
        Acknowledgment::Ignored(NotActionable::NonFinalStatus) => {
            Ok((StatusCode::OK, "Non-final status, no insert").into_response())
        }
        Acknowledgment::Stored(_) => Ok((
            StatusCode::OK,
            Json(json!({ "status": "Data stored successfully" })),
        )
            .into_response()),
        Acknowledgment::Failed(e) => {
            error!(error=%e, %request_id, "failed to store call record");
            Err(AppError::Internal(e.to_string()))
        }
    }
}

pub async fn root() -> &'static str {
    "Webhook listener is running"
}
