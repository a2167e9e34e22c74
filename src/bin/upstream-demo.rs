//! Demo backing service for the relay edge.
//!
//! Serves the five `/v1` user operations with synthesized records so the
//! edge can be run end to end. The extract endpoint streams its records as
//! newline-delimited JSON, one object per line.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::Query,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use clap::Parser;
use futures_util::stream;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_relay::envelope::Envelope;
use user_relay::model::User;

#[derive(Parser)]
#[command(name = "upstream-demo")]
#[command(about = "Demo backing user service", long_about = None)]
struct Cli {
    /// Bind address for the demo service.
    #[arg(short, long, default_value = "0.0.0.0:9090")]
    bind: String,
}

#[derive(Deserialize)]
struct IdQuery {
    id: i64,
}

async fn create(Json(mut user): Json<User>) -> Json<Envelope<User>> {
    tracing::info!(?user, "create user");
    user.id = Some(1);
    Json(Envelope::success(user))
}

async fn retrieve(Query(query): Query<IdQuery>) -> Json<Envelope<User>> {
    tracing::info!(id = query.id, "get user info");
    Json(Envelope::success(User {
        id: Some(1),
        name: Some("test".to_string()),
        age: Some(18),
    }))
}

async fn update(Json(mut user): Json<User>) -> Json<Envelope<User>> {
    tracing::info!(?user, "update user info");
    user.id = Some(1);
    user.name = Some("updated".to_string());
    Json(Envelope::success(user))
}

async fn delete(Query(query): Query<IdQuery>) -> Json<Envelope<()>> {
    tracing::info!(id = query.id, "delete user");
    Json(Envelope::success_empty())
}

async fn extract() -> Response {
    tracing::info!("extract user info");
    let mut lines = Vec::new();
    for i in 1..=18i64 {
        let user = User {
            id: Some(i),
            name: Some(format!("test{i}")),
            age: Some(i as i32),
        };
        match serde_json::to_string(&user) {
            Ok(line) => lines.push(Ok::<_, Infallible>(Bytes::from(line + "\n"))),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode user");
                return Json(Envelope::<()>::fail_default(e.to_string())).into_response();
            }
        }
    }
    (
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(stream::iter(lines)),
    )
        .into_response()
}

fn app() -> Router {
    Router::new()
        .route(
            "/v1/user",
            post(create).get(retrieve).put(update).delete(delete),
        )
        .route("/v1/users", get(extract))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upstream_demo=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let listener = TcpListener::bind(&cli.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "upstream demo listening");

    axum::serve(listener, app()).await?;
    Ok(())
}
