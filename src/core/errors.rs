use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("{operation}: invalid request: {reason}")]
    Validation {
        operation: &'static str,
        reason: ValidationError,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error: HTTP {status} - {message}")]
    Api {
        status: u16,
        body: Vec<u8>,
        message: String,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),
}

/// Body shape the exchange uses for rejected requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorPayload {
    pub code: i64,
    pub msg: String,
}

impl ExchangeError {
    /// Build an `Api` error, keeping the raw body bytes for diagnostics.
    pub fn api(status: u16, body: Vec<u8>) -> Self {
        let message = String::from_utf8_lossy(&body).into_owned();
        Self::Api {
            status,
            body,
            message,
        }
    }

    /// The exchange's `{code, msg}` payload, if the error body carried one.
    pub fn api_payload(&self) -> Option<ApiErrorPayload> {
        match self {
            Self::Api { body, .. } => serde_json::from_slice(body).ok(),
            _ => None,
        }
    }

    pub fn api_code(&self) -> Option<i64> {
        self.api_payload().map(|payload| payload.code)
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Local, pre-network rejection of a request value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has invalid value `{value}`")]
    InvalidValue { field: &'static str, value: String },

    #[error("field `{field}` must be {rule}")]
    OutOfRange {
        field: &'static str,
        rule: &'static str,
    },

    #[error("{0}")]
    Rule(&'static str),
}

impl ValidationError {
    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_raw_body() {
        let body = br#"{"code":-1121,"msg":"Invalid symbol."}"#.to_vec();
        let err = ExchangeError::api(400, body.clone());

        match &err {
            ExchangeError::Api {
                status,
                body: raw,
                message,
            } => {
                assert_eq!(*status, 400);
                assert_eq!(raw, &body);
                assert!(message.contains("Invalid symbol."));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }

        assert_eq!(err.api_code(), Some(-1121));
        assert_eq!(err.http_status(), Some(400));
        assert!(err.to_string().contains("HTTP 400"));
    }

    #[test]
    fn test_api_payload_absent_for_non_json_body() {
        let err = ExchangeError::api(502, b"<html>Bad Gateway</html>".to_vec());
        assert!(err.api_payload().is_none());
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn test_validation_error_message_names_operation() {
        let err = ExchangeError::Validation {
            operation: "new_order",
            reason: ValidationError::MissingField("symbol"),
        };
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "new_order: invalid request: missing required field `symbol`"
        );
    }
}
