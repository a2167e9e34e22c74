//! Uniform response envelope.
//!
//! # Responsibilities
//! - Wrap every edge response, success or failure, in one shape
//! - Keep the serialized field order stable: success, code, msg, data
//! - Omit `data` entirely when there is nothing to carry
//!
//! # Design Decisions
//! - Envelopes are constructed once per response and never mutated
//! - Field order is load-bearing: failure scenarios assert on the exact
//!   serialized bytes, so the struct declaration order must not change

use serde::{Deserialize, Serialize};

/// Nominal success code.
pub const SUCCESS_CODE: u16 = 200;

/// Nominal success message.
pub const SUCCESS_MSG: &str = "Success";

/// Default failure code when no upstream status exists.
pub const DEFAULT_FAIL_CODE: u16 = 500;

/// Generic success/failure wrapper used on every edge response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub code: u16,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Success envelope with a payload: `{true, 200, "Success", data}`.
    pub fn success(data: T) -> Self {
        Self::success_with(SUCCESS_CODE, SUCCESS_MSG, Some(data))
    }

    /// Success envelope without a payload (`data` absent on the wire).
    pub fn success_empty() -> Self {
        Self::success_with(SUCCESS_CODE, SUCCESS_MSG, None)
    }

    /// Success envelope with explicit code and message.
    ///
    /// None of the in-scope operations override the defaults, but the
    /// contract supports expressing a non-default success.
    pub fn success_with(code: u16, msg: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            code,
            msg: msg.into(),
            data,
        }
    }

    /// Failure envelope. `data` is always absent on failures.
    pub fn fail(code: u16, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            msg: msg.into(),
            data: None,
        }
    }

    /// Failure envelope with the default 500 code.
    pub fn fail_default(msg: impl Into<String>) -> Self {
        Self::fail(DEFAULT_FAIL_CODE, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_defaults() {
        let envelope = Envelope::success(7);
        assert!(envelope.success);
        assert_eq!(envelope.code, 200);
        assert_eq!(envelope.msg, "Success");
        assert_eq!(envelope.data, Some(7));
    }

    #[test]
    fn test_fail_defaults() {
        let envelope = Envelope::<()>::fail_default("boom");
        assert!(!envelope.success);
        assert_eq!(envelope.code, 500);
        assert_eq!(envelope.msg, "boom");
        assert_eq!(envelope.data, None);
    }

    #[test]
    fn test_serialized_field_order() {
        let json = serde_json::to_string(&Envelope::success(1)).unwrap();
        assert_eq!(json, r#"{"success":true,"code":200,"msg":"Success","data":1}"#);
    }

    #[test]
    fn test_failure_omits_data() {
        let json = serde_json::to_string(&Envelope::<i64>::fail(503, "down")).unwrap();
        assert_eq!(json, r#"{"success":false,"code":503,"msg":"down"}"#);
    }

    #[test]
    fn test_empty_success_omits_data() {
        let json = serde_json::to_string(&Envelope::<()>::success_empty()).unwrap();
        assert_eq!(json, r#"{"success":true,"code":200,"msg":"Success"}"#);
    }

    #[test]
    fn test_deserialize_absent_and_null_data() {
        let absent: Envelope<i64> =
            serde_json::from_str(r#"{"success":false,"code":500,"msg":"x"}"#).unwrap();
        assert_eq!(absent.data, None);

        let null: Envelope<i64> =
            serde_json::from_str(r#"{"success":false,"code":500,"msg":"x","data":null}"#).unwrap();
        assert_eq!(null.data, None);
    }
}
