use serde::Serialize;

/// Body returned by endpoints that only report an outcome.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body returned by a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
