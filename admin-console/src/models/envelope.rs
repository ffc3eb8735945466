use serde::Deserialize;
use serde_json::Value;

/// Fallback text when a failure carries no server message.
pub const GENERIC_FAILURE: &str = "API request failed";

/// Uniform response wrapper used by the auth server and gateway.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T = Value> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Split into the payload or the server-reported failure text.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .error
                .or(self.message)
                .unwrap_or_else(|| GENERIC_FAILURE.to_string()))
        }
    }
}

/// Body of a non-2xx response. Services answer either with the envelope's
/// `error`/`message` fields or a framework-style `detail`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub fn message(self) -> Option<String> {
        self.error.or(self.message).or(self.detail.map(|d| match d {
            Value::String(s) => s,
            other => other.to_string(),
        }))
    }
}
