use crate::provider::ProviderId;

/// Errors surfaced by the translation engine and its providers.
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("Unknown translation provider: '{0}' (expected 'fast-cheap' or 'premium')")]
    UnknownProvider(String),

    #[error("Missing credential for {provider} provider: {key} not set")]
    MissingCredential { provider: ProviderId, key: String },

    #[error("{provider} provider unavailable{}: {message}", status_suffix(.status))]
    ProviderUnavailable {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to parse {provider} translation response: {message}")]
    ResponseParseError { provider: String, message: String },

    #[error("No source text: every language entry is missing or blank")]
    NoSourceText,

    #[error("Invalid translation request: {0}")]
    InvalidRequest(String),

    #[error("Unknown language code: '{0}'")]
    UnknownLanguage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TranslationError>;

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl TranslationError {
    /// Whether a caller-side retry has a chance of succeeding.
    ///
    /// Rate limits (429), server errors (5xx), transport failures and
    /// malformed replies are transient. Other 4xx client errors and every
    /// construction or caller error are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::ProviderUnavailable { status, .. } => match status {
                Some(status) => *status == 429 || *status >= 500,
                None => true,
            },
            TranslationError::ResponseParseError { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable(status: Option<u16>) -> TranslationError {
        TranslationError::ProviderUnavailable {
            provider: "openai".to_string(),
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_server_errors_are_retryable() {
        assert!(unavailable(Some(500)).is_retryable());
        assert!(unavailable(Some(503)).is_retryable());
    }

    #[test]
    fn test_rate_limit_is_retryable() {
        assert!(unavailable(Some(429)).is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        assert!(!unavailable(Some(400)).is_retryable());
        assert!(!unavailable(Some(401)).is_retryable());
        assert!(!unavailable(Some(403)).is_retryable());
    }

    #[test]
    fn test_network_errors_are_retryable() {
        assert!(unavailable(None).is_retryable());
    }

    #[test]
    fn test_parse_errors_are_retryable() {
        let error = TranslationError::ResponseParseError {
            provider: "anthropic".to_string(),
            message: "expected object".to_string(),
        };
        assert!(error.is_retryable());
    }

    #[test]
    fn test_caller_errors_are_not_retryable() {
        assert!(!TranslationError::NoSourceText.is_retryable());
        assert!(!TranslationError::UnknownProvider("x".to_string()).is_retryable());
        assert!(!TranslationError::InvalidRequest("x".to_string()).is_retryable());
    }

    #[test]
    fn test_unavailable_message_includes_status() {
        let message = unavailable(Some(503)).to_string();
        assert!(message.contains("503"), "{}", message);
        assert!(message.contains("openai"));
    }

    #[test]
    fn test_unavailable_message_without_status() {
        let message = unavailable(None).to_string();
        assert_eq!(message, "openai provider unavailable: boom");
    }
}
