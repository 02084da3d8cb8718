use thiserror::Error;

/// Network-level failure while dispatching a request.
///
/// A received response, whatever its status, is never a `TransportError`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport error: {url} timed out after {timeout_ms} ms")]
    Timeout {
        url: String,
        timeout_ms: u64,
        #[source]
        source: reqwest::Error,
    },
    #[error("transport error: could not connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("transport error: invalid request url {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("transport error: request to {url} failed")]
    Other {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    pub(crate) fn from_reqwest(url: &str, timeout_ms: u64, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            TransportError::Timeout {
                url,
                timeout_ms,
                source,
            }
        } else if source.is_connect() {
            TransportError::Connect { url, source }
        } else {
            TransportError::Other { url, source }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            TransportError::Timeout { url, .. }
            | TransportError::Connect { url, .. }
            | TransportError::InvalidUrl { url, .. }
            | TransportError::Other { url, .. } => url,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }

    /// One-line description including the underlying cause.
    pub fn detailed(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_reports_transport_prefix() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = TransportError::InvalidUrl {
            url: "not a url".to_string(),
            source,
        };
        assert_eq!(err.url(), "not a url");
        assert!(!err.is_timeout());
        assert!(err.to_string().starts_with("transport error:"));
        assert!(err.detailed().contains("relative URL without a base"));
    }
}
