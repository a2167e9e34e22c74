//! Relay failure taxonomy and normalization.
//!
//! # Responsibilities
//! - Classify upstream outcomes: HTTP error status, transport failure,
//!   malformed payload
//! - Render every failure into one deterministic envelope message
//!
//! # Design Decisions
//! - The upstream body is embedded character-for-character, nested JSON
//!   included; it is never parsed or reformatted
//! - Transport failures carry no status and normalize to 500
//! - Malformed payloads skip the bracket template and surface the decode
//!   error's own text, matching the generic exception path upstream

use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::envelope::{Envelope, DEFAULT_FAIL_CODE};
use crate::ndjson::NdjsonError;

/// Failure kinds at the relay boundary.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A payload (one NDJSON line or an envelope body) did not decode.
    #[error("{0}")]
    Malformed(String),

    /// Non-2xx response from the backing service, body read verbatim.
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The call never produced a response (connect refused, timeout, DNS).
    #[error("{0}")]
    Transport(String),
}

impl From<NdjsonError> for RelayError {
    fn from(err: NdjsonError) -> Self {
        match err {
            e @ NdjsonError::MalformedRecord { .. } => RelayError::Malformed(e.to_string()),
            NdjsonError::Transport(msg) => RelayError::Transport(msg),
        }
    }
}

/// Descriptor of one outbound relay call, kept only for diagnostics.
#[derive(Debug, Clone)]
pub struct RelayCall {
    pub method: Method,
    pub url: String,
    pub op: &'static str,
}

impl RelayCall {
    pub fn new(method: Method, url: String, op: &'static str) -> Self {
        Self { method, url, op }
    }

    pub fn fail(self, error: RelayError) -> RelayFailure {
        RelayFailure { call: self, error }
    }
}

/// A classified relay failure paired with the call that produced it.
#[derive(Debug)]
pub struct RelayFailure {
    call: RelayCall,
    error: RelayError,
}

impl RelayFailure {
    pub fn call(&self) -> &RelayCall {
        &self.call
    }

    pub fn error(&self) -> &RelayError {
        &self.error
    }

    /// Envelope code: the concrete upstream status, or 500 when the call
    /// never produced one.
    pub fn code(&self) -> u16 {
        match self.error {
            RelayError::Upstream { status, .. } => status,
            _ => DEFAULT_FAIL_CODE,
        }
    }

    /// The normalized failure message:
    ///
    /// ```text
    /// [<status> <reason>] during [<METHOD>] to [<url>] [<op>]: [<detail>]
    /// ```
    ///
    /// Malformed payloads bypass the template and report the decode error
    /// text directly.
    pub fn message(&self) -> String {
        match &self.error {
            RelayError::Malformed(detail) => detail.clone(),
            RelayError::Upstream { status, body } => render(&self.call, *status, body),
            RelayError::Transport(text) => render(&self.call, DEFAULT_FAIL_CODE, text),
        }
    }

    /// Normalize into a failure envelope. `data` is always absent.
    pub fn into_envelope<T>(self) -> Envelope<T> {
        Envelope::fail(self.code(), self.message())
    }
}

fn render(call: &RelayCall, status: u16, detail: &str) -> String {
    format!(
        "[{status} {reason}] during [{method}] to [{url}] [{op}]: [{detail}]",
        reason = reason_phrase(status),
        method = call.method,
        url = call.url,
        op = call.op,
    )
}

/// Reason phrase as the upstream stack spells it: 500 is "Server Error"
/// (asserted byte-for-byte in the failure scenarios), everything else uses
/// the canonical phrase.
fn reason_phrase(status: u16) -> &'static str {
    match status {
        500 => "Server Error",
        s => StatusCode::from_u16(s)
            .ok()
            .and_then(|c| c.canonical_reason())
            .unwrap_or("Unknown Status"),
    }
}
