//! Edge HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → server.rs (Axum setup, middleware: request ID, timeout, trace)
//!     → handlers.rs (thin controllers, one per operation)
//!     → relay client
//!     → Envelope serialized back to the caller
//! ```

pub mod handlers;
pub mod server;

pub use server::{build_router, AppState, HttpServer};
