use serde::{Deserialize, Serialize};

/// Machine-readable error category returned to API clients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    NotAuthenticated,
    NotAuthorized,
    NotFound,
    Invalid,
    Conflict,
    Throttled,
    Exception,
    Upstream,
}

/// JSON error body: `{"error": "<code>", "message": "<text>"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorCode,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated, "Not authenticated")
    }

    pub fn not_authorized() -> Self {
        Self::new(ErrorCode::NotAuthorized, "Not authorized")
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn invalid(message: &str) -> Self {
        Self::new(ErrorCode::Invalid, message)
    }

    pub fn conflict(message: &str) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn throttled() -> Self {
        Self::new(
            ErrorCode::Throttled,
            "Rate limit exceeded. Please try again later.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_code_in_kebab_case() {
        let body = serde_json::to_value(ErrorResponse::not_authenticated()).unwrap();
        assert_eq!(body["error"], "not-authenticated");
        assert_eq!(body["message"], "Not authenticated");
    }
}
