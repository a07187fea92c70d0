use serde::{Deserialize, Serialize};

/// Message resource returned by `POST /Accounts/{sid}/Messages.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub sid: String,
    pub status: String,
    pub to: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl MessageResponse {
    /// Twilio can accept the request but mark the message failed right away
    /// (e.g. unreachable destination).
    pub fn is_failed(&self) -> bool {
        matches!(self.status.as_str(), "failed" | "undelivered" | "canceled")
    }
}

/// Error body returned on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct TwilioApiError {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
    #[serde(default)]
    pub more_info: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}
