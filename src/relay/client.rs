//! Outbound HTTP client for the backing user service.
//!
//! # Responsibilities
//! - Perform the four CRUD calls plus the streaming extract
//! - Decode 2xx bodies into envelopes, hand everything else to the
//!   failure normalizer
//! - Re-buffer the extract stream into one ordered envelope payload
//!
//! # Design Decisions
//! - One inbound request maps to at most one outbound call, no retries
//! - Concurrent calls are independent; the client is cheap to clone
//! - Timeouts come from configuration, not from this module

use futures_util::StreamExt;
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::config::UpstreamConfig;
use crate::envelope::Envelope;
use crate::model::User;
use crate::ndjson::NdjsonDecoder;
use crate::relay::error::{RelayCall, RelayError, RelayFailure};

/// Result of one relay operation.
pub type RelayResult<T> = Result<T, RelayFailure>;

/// HTTP client bound to one backing service base URL.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    /// Build a client from upstream configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Relay a create call: `POST /user` with the record as JSON body.
    pub async fn create(&self, user: &User) -> RelayResult<Envelope<User>> {
        let call = self.describe(Method::POST, "/user", "create");
        tracing::debug!(url = %call.url, "relaying create");
        let request = self.http.post(&call.url).json(user);
        let response = send(request, &call).await?;
        read_envelope(call, response).await
    }

    /// Relay a retrieve call: `GET /user?id=`.
    pub async fn retrieve(&self, id: i64) -> RelayResult<Envelope<User>> {
        let call = self.describe(Method::GET, &format!("/user?id={id}"), "retrieve");
        tracing::debug!(url = %call.url, "relaying retrieve");
        let request = self.http.get(&call.url);
        let response = send(request, &call).await?;
        read_envelope(call, response).await
    }

    /// Relay an update call: `PUT /user` with the record as JSON body.
    pub async fn update(&self, user: &User) -> RelayResult<Envelope<User>> {
        let call = self.describe(Method::PUT, "/user", "update");
        tracing::debug!(url = %call.url, "relaying update");
        let request = self.http.put(&call.url).json(user);
        let response = send(request, &call).await?;
        read_envelope(call, response).await
    }

    /// Relay a delete call: `DELETE /user?id=`. The success envelope
    /// carries no data.
    pub async fn delete(&self, id: i64) -> RelayResult<Envelope<()>> {
        let call = self.describe(Method::DELETE, &format!("/user?id={id}"), "delete");
        tracing::debug!(url = %call.url, "relaying delete");
        let request = self.http.delete(&call.url);
        let response = send(request, &call).await?;
        read_envelope(call, response).await
    }

    /// Relay the streaming extract: `GET /users`, body decoded line by
    /// line and re-buffered into one ordered envelope payload. The edge
    /// contract is a single JSON document, not a streamed response.
    pub async fn extract(&self) -> RelayResult<Envelope<Vec<User>>> {
        let call = self.describe(Method::GET, "/users", "extract");
        tracing::debug!(url = %call.url, "relaying extract");
        let request = self.http.get(&call.url);
        let response = send(request, &call).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(call.fail(RelayError::Upstream {
                status: status.as_u16(),
                body,
            }));
        }

        let mut decoder = NdjsonDecoder::<User>::new(response.bytes_stream());
        let mut users = Vec::new();
        while let Some(item) = decoder.next().await {
            match item {
                Ok(user) => users.push(user),
                Err(e) => return Err(call.fail(RelayError::from(e))),
            }
        }
        tracing::debug!(count = users.len(), "extract stream drained");
        Ok(Envelope::success(users))
    }

    fn describe(&self, method: Method, path_and_query: &str, op: &'static str) -> RelayCall {
        RelayCall::new(method, format!("{}{}", self.base_url, path_and_query), op)
    }
}

async fn send(
    request: reqwest::RequestBuilder,
    call: &RelayCall,
) -> RelayResult<reqwest::Response> {
    request
        .send()
        .await
        .map_err(|e| call.clone().fail(RelayError::Transport(e.to_string())))
}

async fn read_envelope<T: DeserializeOwned + Default>(
    call: RelayCall,
    response: reqwest::Response,
) -> RelayResult<Envelope<T>> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(call.fail(RelayError::Upstream {
            status: status.as_u16(),
            body,
        }));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| call.clone().fail(RelayError::Transport(e.to_string())))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        call.fail(RelayError::Malformed(format!(
            "malformed upstream envelope: {e}"
        )))
    })
}
