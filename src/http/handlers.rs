//! Edge handlers, one per relayed operation.
//!
//! # Responsibilities
//! - Construct the demo payload for each operation
//! - Invoke the relay client and write its envelope back as JSON
//! - Mirror the normalized failure code in the HTTP status
//!
//! # Design Decisions
//! - Handlers are thin: all relay semantics live behind RelayClient
//! - Every outcome, including unexpected failures, leaves the edge as a
//!   JSON envelope

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::envelope::Envelope;
use crate::http::server::AppState;
use crate::model::User;
use crate::relay::RelayResult;

pub async fn create_user(State(state): State<AppState>) -> Response {
    let user = User {
        name: Some("test".to_string()),
        age: Some(18),
        ..Default::default()
    };
    tracing::info!(?user, "create user");
    reply(state.relay.create(&user).await)
}

pub async fn retrieve_user(State(state): State<AppState>) -> Response {
    tracing::info!(id = 1, "retrieve user");
    reply(state.relay.retrieve(1).await)
}

pub async fn update_user(State(state): State<AppState>) -> Response {
    let user = User {
        id: Some(1),
        ..Default::default()
    };
    tracing::info!(?user, "update user");
    reply(state.relay.update(&user).await)
}

pub async fn delete_user(State(state): State<AppState>) -> Response {
    tracing::info!(id = 1, "delete user");
    reply(state.relay.delete(1).await)
}

pub async fn extract_users(State(state): State<AppState>) -> Response {
    tracing::info!("extract users");
    reply(state.relay.extract().await)
}

/// Write a relay outcome to the caller. Success passes the upstream
/// envelope through with HTTP 200; failures serialize the normalized
/// envelope and mirror its code in the HTTP status.
fn reply<T: Serialize>(result: RelayResult<Envelope<T>>) -> Response {
    match result {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(failure) => {
            tracing::error!(
                op = failure.call().op,
                error = %failure.error(),
                "relay call failed"
            );
            let status = StatusCode::from_u16(failure.code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(failure.into_envelope::<()>())).into_response()
        }
    }
}
