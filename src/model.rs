//! Domain record and its JSON codec contract.
//!
//! # Design Decisions
//! - All three fields are independently optional; absence is distinct from
//!   a zero-like value and must round-trip as absent
//! - Absent fields serialize as explicit `null` (scenario payloads assert
//!   the literal bytes), only the envelope omits absent values
//! - Decoding accepts any subset of the fields but rejects type mismatches

use serde::{Deserialize, Serialize};

/// The user record relayed between the edge and the backing service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub age: Option<i32>,
}
