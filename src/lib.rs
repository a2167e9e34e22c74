//! CRUD edge service that relays every request to a backing user service
//! and translates its replies, failures included, into one uniform
//! response envelope.
//!
//! # Architecture Overview
//!
//! ```text
//! client ──▶ http (edge handlers)
//!               │
//!               ▼
//!            relay (one outbound call per operation)
//!               │
//!     ┌─────────┴──────────┐
//!     ▼                    ▼
//!  success             failure
//!  envelope decode /   normalize into
//!  ndjson stream       deterministic message
//!     │                    │
//!     └─────────┬──────────┘
//!               ▼
//!           Envelope ──▶ client
//! ```

pub mod config;
pub mod envelope;
pub mod http;
pub mod model;
pub mod ndjson;
pub mod relay;

pub use config::RelayConfig;
pub use envelope::Envelope;
pub use http::HttpServer;
pub use model::User;
pub use relay::RelayClient;
