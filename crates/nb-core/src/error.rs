use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Tool error: {tool} - {message}")]
    Tool { tool: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No articles returned by the news service")]
    NoArticles,

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Map an HTTP failure status to the matching error kind.
    ///
    /// Shared by every outbound client so the news service and the LLM
    /// service report failures the same way.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Error::auth(message),
            429 => Error::rate_limit(message),
            400 | 422 => Error::invalid_request(message),
            _ => Error::api(status, message),
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::api(500, "Internal error");
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("Internal error"));
    }

    #[test]
    fn test_from_status() {
        assert!(Error::from_status(401, "bad key").is_auth_error());
        assert!(Error::from_status(403, "forbidden").is_auth_error());
        assert!(matches!(Error::from_status(429, "slow down"), Error::RateLimit(_)));
        assert!(matches!(Error::from_status(422, "bad country"), Error::InvalidRequest(_)));
        assert!(matches!(
            Error::from_status(502, "gateway"),
            Error::Api { status: 502, .. }
        ));
    }

    #[test]
    fn test_no_articles_display() {
        assert_eq!(
            Error::NoArticles.to_string(),
            "No articles returned by the news service"
        );
    }
}
