//! Relay boundary to the backing user service.
//!
//! # Data Flow
//! ```text
//! edge handler
//!     → client.rs (one outbound HTTP call per operation)
//!     → success: envelope decode / ndjson stream decode
//!     → failure: error.rs (classify + normalize into one message shape)
//!     → Envelope back to the edge
//! ```

pub mod client;
pub mod error;

pub use client::{RelayClient, RelayResult};
pub use error::{RelayCall, RelayError, RelayFailure};
