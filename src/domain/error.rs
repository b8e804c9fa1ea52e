use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Not an HTTP URL: {0:?}")]
    InvalidInput(String),

    #[error("Malformed URL [{url}]: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{code}, {reason} [{url}]")]
    Status {
        code: u16,
        reason: &'static str,
        url: String,
    },

    #[error("No free connection for {route} within {timeout:?}")]
    PoolTimeout { route: String, timeout: Duration },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unknown charset: {0}")]
    UnknownCharset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FetchError {
    /// Input that was never a candidate for a request. Not worth a log line.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, FetchError::InvalidInput(_))
    }
}

/// Human readable reason for a non-200 status, matching the codes callers
/// most often run into.
pub fn status_reason(code: u16) -> &'static str {
    match code {
        400 => "request has a syntax error",
        401 => "resource requires authentication",
        403 => "resource requires authorization",
        404 => "resource not found",
        502 => "remote server error",
        503 => "service unavailable",
        504 => "gateway timeout",
        _ => "request failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason_known_codes() {
        assert_eq!(status_reason(404), "resource not found");
        assert_eq!(status_reason(504), "gateway timeout");
        assert_eq!(status_reason(418), "request failed");
    }

    #[test]
    fn test_status_display_includes_url() {
        let err = FetchError::Status {
            code: 503,
            reason: status_reason(503),
            url: "http://example.com/".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "503, service unavailable [http://example.com/]"
        );
        assert!(!err.is_invalid_input());
        assert!(FetchError::InvalidInput(String::new()).is_invalid_input());
    }
}
