use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend answered with a non-2xx status.
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid base url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        Self::Api {
            status,
            detail: Some(detail.into()),
        }
    }

    /// Server-provided human-readable message, if the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_api_with_detail() {
        let e = ClientError::api(409, "api_name already exists");
        assert_eq!(e.to_string(), "HTTP 409: api_name already exists");
        assert_eq!(e.detail(), Some("api_name already exists"));
        assert_eq!(e.status(), Some(409));
    }

    #[test]
    fn display_api_without_detail() {
        let e = ClientError::Api {
            status: 500,
            detail: None,
        };
        assert_eq!(e.to_string(), "HTTP 500: no detail");
        assert!(e.detail().is_none());
    }

    #[test]
    fn decode_error_has_no_detail() {
        let e: ClientError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(e.detail().is_none());
        assert!(e.status().is_none());
    }
}
