use http::StatusCode;
use thiserror::Error;

use crate::assertion::AssertionReport;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response: connect failure, timeout, broken body.
    #[error("request `{name}` failed in transport: {source}")]
    Transport {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request could not be built from its configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Assertions(#[from] AssertionReport),

    #[error("{} not observed after {attempts} attempt(s), last status was {last_status}", describe(.expected))]
    StatusNotObserved {
        expected: StatusCode,
        attempts: u32,
        last_status: StatusCode,
    },

    #[error("fixture setup failed: {0}")]
    Fixture(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport { source, .. } if source.is_timeout())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    /// The aggregated report, if this error came out of `assert_all`.
    pub fn report(&self) -> Option<&AssertionReport> {
        match self {
            Error::Assertions(report) => Some(report),
            _ => None,
        }
    }
}

fn describe(status: &StatusCode) -> String {
    if *status == StatusCode::TOO_MANY_REQUESTS {
        return "rate limit (status 429)".to_string();
    }
    format!(
        "status {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_rate_limit_poll_reads_naturally() {
        let err = Error::StatusNotObserved {
            expected: StatusCode::TOO_MANY_REQUESTS,
            attempts: 5,
            last_status: StatusCode::OK,
        };
        assert_eq!(
            err.to_string(),
            "rate limit (status 429) not observed after 5 attempt(s), last status was 200 OK"
        );
    }

    #[test]
    fn other_statuses_use_canonical_reason() {
        let err = Error::StatusNotObserved {
            expected: StatusCode::CREATED,
            attempts: 2,
            last_status: StatusCode::BAD_REQUEST,
        };
        assert!(err.to_string().starts_with("status 201 Created not observed"));
        assert!(!err.is_transport());
        assert!(err.report().is_none());
    }
}
