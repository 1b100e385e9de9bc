//! Success/error envelope returned by every knowledge graph endpoint.
//!
//! ```json
//! { "success": bool, "data": <any>?, "error": { "message": string, "code": string? }? }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error descriptor inside a failed envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Some server builds report `error` as a bare string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Detailed(ErrorBody),
    Message(String),
    Other(Value),
}

impl ErrorField {
    fn into_body(self) -> Option<ErrorBody> {
        match self {
            ErrorField::Detailed(body) => Some(body),
            ErrorField::Message(message) => Some(ErrorBody {
                message,
                code: None,
            }),
            ErrorField::Other(_) => None,
        }
    }
}

/// Parsed result of one completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub success: bool,
    pub error: Option<ErrorBody>,
    /// The operation result: `data` when the server sent one, otherwise the
    /// whole response document.
    pub data: Value,
}

impl ResponseEnvelope {
    pub const UNKNOWN_API_ERROR: &'static str = "Unknown API error";

    /// Interpret a JSON document as an envelope.
    ///
    /// Only an absent or `true` `success` counts as success. Non-object
    /// documents are treated as a successful payload.
    pub fn from_value(status: u16, document: Value) -> Self {
        let Some(fields) = document.as_object() else {
            return Self {
                status,
                success: true,
                error: None,
                data: document,
            };
        };

        let success = match fields.get("success") {
            None | Some(Value::Bool(true)) => true,
            Some(_) => false,
        };
        let error = fields
            .get("error")
            .and_then(|e| serde_json::from_value::<ErrorField>(e.clone()).ok())
            .and_then(ErrorField::into_body);
        let data = match fields.get("data").cloned() {
            Some(data) => data,
            None => document,
        };

        Self {
            status,
            success,
            error,
            data,
        }
    }

    /// Parse a raw body. Errors only when the body is not JSON at all.
    pub fn parse(status: u16, body: &[u8]) -> Result<Self, serde_json::Error> {
        let document: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(status, document))
    }

    /// Message to report for a failed envelope.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().and_then(|e| e.code.as_deref())
    }

    pub fn into_data(self) -> Value {
        self.data
    }
}
