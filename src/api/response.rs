//! Response envelope shared by every endpoint.
//!
//! Success bodies carry `success: true` plus optional `message` and `data`;
//! failure bodies carry `success: false` plus `error`. Fields that are not
//! set are omitted from the wire.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub fn data_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }

    #[must_use]
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_envelope_omits_error() {
        let wire = serde_json::to_value(ApiResponse::data(42)).unwrap();
        assert_eq!(wire["success"], true);
        assert_eq!(wire["data"], 42);
        assert!(wire.get("error").is_none());
        assert!(wire.get("message").is_none());
    }

    #[test]
    fn error_envelope_omits_data() {
        let wire = serde_json::to_value(ApiResponse::error("nope")).unwrap();
        assert_eq!(wire["success"], false);
        assert_eq!(wire["error"], "nope");
        assert!(wire.get("data").is_none());
    }
}
