//! Error classification for Jira API failures
//!
//! Every failure is classified once, at the boundary where it is first
//! observed (an HTTP non-2xx, a schema mismatch, a transport error), and the
//! resulting [`JiraError`] travels unchanged up the call chain. Intermediate
//! layers may add context but never re-classify.

use serde_json::Value;

/// Classified failure, created at the service boundary
#[derive(Debug, thiserror::Error)]
pub enum JiraError {
    /// Required credentials are absent from the environment
    #[error("Missing Jira credentials: {0}")]
    AuthMissing(String),

    /// Upstream rejected the credentials; 403 is normalized to 401
    #[error("Authentication with Jira failed [{status}]: check JIRA_EMAIL and JIRA_API_TOKEN")]
    AuthInvalid { status: u16 },

    /// Upstream returned a non-2xx response
    #[error("Jira API error [{status}]: {message}")]
    Api {
        status: u16,
        message: String,
        /// Raw error body, kept for structured detail such as JQL
        /// `errorMessages` arrays
        body: Option<Value>,
    },

    /// A response did not match the expected shape
    #[error("Invalid {context} response: {detail}")]
    Validation { context: String, detail: String },

    /// Transport, parse, or programming failures
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl JiraError {
    pub fn validation(context: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Validation {
            context: context.into(),
            detail: detail.to_string(),
        }
    }

    pub fn unexpected(err: impl std::fmt::Display) -> Self {
        Self::Unexpected(err.to_string())
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::AuthMissing(_) | Self::Unexpected(_) => None,
            Self::AuthInvalid { status } => Some(*status),
            Self::Api { status, .. } => Some(*status),
            Self::Validation { .. } => Some(500),
        }
    }

    /// Render the user-facing message
    ///
    /// A 400 carrying `errorMessages` is the malformed-JQL case end users hit
    /// most often, so it gets its own rendering with each upstream message on
    /// its own line.
    pub fn user_message(&self) -> String {
        if let Self::Api {
            status: 400,
            body: Some(body),
            ..
        } = self
        {
            let messages: Vec<&str> = body
                .get("errorMessages")
                .and_then(|m| m.as_array())
                .map(|arr| arr.iter().filter_map(|m| m.as_str()).collect())
                .unwrap_or_default();

            if !messages.is_empty() {
                return format!("Invalid JQL Query:\n{}", messages.join("\n"));
            }
        }

        self.to_string()
    }
}

/// Classify a non-2xx HTTP response
pub fn classify_status(status: u16, status_text: &str, body: &str) -> JiraError {
    let parsed = serde_json::from_str::<Value>(body).ok();

    match status {
        401 | 403 => JiraError::AuthInvalid { status: 401 },
        404 => JiraError::Api {
            status: 404,
            message: "resource not found".to_string(),
            body: parsed,
        },
        _ => {
            let message = parsed
                .as_ref()
                .and_then(extract_api_message)
                .unwrap_or_else(|| format!("{status} {status_text}"));

            JiraError::Api {
                status,
                message,
                body: parsed,
            }
        }
    }
}

/// Pull the most useful human-readable message out of an API error body
///
/// Priority: `errorMessages` array, `errors` object as field/message pairs,
/// top-level `message`, then `errors[0].title`.
fn extract_api_message(body: &Value) -> Option<String> {
    if let Some(messages) = body.get("errorMessages").and_then(|m| m.as_array()) {
        let texts: Vec<&str> = messages.iter().filter_map(|m| m.as_str()).collect();
        if !texts.is_empty() {
            return Some(texts.join("; "));
        }
    }

    if let Some(errors) = body.get("errors").and_then(|e| e.as_object()) {
        let pairs: Vec<String> = errors
            .iter()
            .filter_map(|(field, msg)| msg.as_str().map(|m| format!("{field}: {m}")))
            .collect();
        if !pairs.is_empty() {
            return Some(pairs.join("; "));
        }
    }

    if let Some(message) = body.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_string());
    }

    if let Some(title) = body
        .get("errors")
        .and_then(|e| e.as_array())
        .and_then(|arr| arr.first())
        .and_then(|e| e.get("title"))
        .and_then(|t| t.as_str())
    {
        return Some(title.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_jql_renders_special_message() {
        // Arrange: The standard Jira 400 shape for a malformed query
        let body = r#"{"errorMessages":["Field 'foo' does not exist."],"errors":{}}"#;

        // Act
        let error = classify_status(400, "Bad Request", body);
        let message = error.user_message();

        // Assert: Special-cased rendering with the upstream text verbatim
        assert!(message.starts_with("Invalid JQL Query"));
        assert!(message.contains("Field 'foo' does not exist."));
    }

    #[test]
    fn test_400_without_error_messages_uses_default_rendering() {
        let body = r#"{"errors":{"summary":"Summary is required."}}"#;
        let error = classify_status(400, "Bad Request", body);
        let message = error.user_message();
        assert!(!message.starts_with("Invalid JQL Query"));
        assert!(message.contains("summary: Summary is required."));
    }

    #[test]
    fn test_404_classifies_as_api_error() {
        let error = classify_status(404, "Not Found", "");
        assert_eq!(error.status_code(), Some(404));
        assert!(matches!(error, JiraError::Api { .. }));
        assert!(error.to_string().contains("resource not found"));
    }

    #[test]
    fn test_401_and_403_normalize_to_401() {
        for status in [401, 403] {
            let error = classify_status(status, "", "");
            assert!(matches!(error, JiraError::AuthInvalid { status: 401 }));
            assert_eq!(error.status_code(), Some(401));
        }
    }

    #[test]
    fn test_error_messages_array_takes_priority() {
        let body = r#"{
            "errorMessages": ["first", "second"],
            "errors": {"field": "ignored"},
            "message": "also ignored"
        }"#;
        let error = classify_status(500, "Internal Server Error", body);
        assert!(error.to_string().contains("first; second"));
    }

    #[test]
    fn test_errors_object_renders_field_pairs() {
        let body = r#"{"errors":{"priority":"Priority name is invalid","assignee":"Unknown user"}}"#;
        let error = classify_status(422, "Unprocessable Entity", body);
        let rendered = error.to_string();
        assert!(rendered.contains("priority: Priority name is invalid"));
        assert!(rendered.contains("assignee: Unknown user"));
    }

    #[test]
    fn test_top_level_message_is_third_choice() {
        let body = r#"{"message":"Service temporarily unavailable"}"#;
        let error = classify_status(503, "Service Unavailable", body);
        assert!(error.to_string().contains("Service temporarily unavailable"));
    }

    #[test]
    fn test_errors_array_title_is_fourth_choice() {
        let body = r#"{"errors":[{"title":"Rate limit exceeded"}]}"#;
        let error = classify_status(429, "Too Many Requests", body);
        assert!(error.to_string().contains("Rate limit exceeded"));
    }

    #[test]
    fn test_unparseable_body_falls_back_to_status_line() {
        let error = classify_status(502, "Bad Gateway", "<html>upstream died</html>");
        assert!(error.to_string().contains("502 Bad Gateway"));
    }

    #[test]
    fn test_validation_carries_context_and_status_500() {
        let error = JiraError::validation("issue", "missing field `key`");
        assert_eq!(error.status_code(), Some(500));
        let rendered = error.to_string();
        assert!(rendered.contains("issue"));
        assert!(rendered.contains("missing field `key`"));
    }

    #[test]
    fn test_auth_missing_has_no_status() {
        let error = JiraError::AuthMissing("JIRA_BASE_URL".to_string());
        assert_eq!(error.status_code(), None);
    }

    #[test]
    fn test_unexpected_preserves_cause_text() {
        let error = JiraError::unexpected("connection reset by peer");
        assert_eq!(error.status_code(), None);
        assert!(error.to_string().contains("connection reset by peer"));
    }
}
