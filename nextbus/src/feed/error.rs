//! Feed client error types.

use crate::xml::XmlError;

use super::convert::ConversionError;

/// Errors from fetching and mapping the NextBus feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body is not well-formed XML
    #[error("XML parse error: {0}")]
    Xml(#[from] XmlError),

    /// The feed answered with an error document
    #[error("feed error: {message}")]
    Feed { message: String, should_retry: bool },

    /// Response could not be mapped to domain records
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Transport is missing data or configuration for a request
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl FeedError {
    /// Whether the feed marked this error as transient.
    ///
    /// The client never retries on its own; this only reports the feed's
    /// `shouldRetry` hint.
    pub fn should_retry(&self) -> bool {
        matches!(
            self,
            FeedError::Feed {
                should_retry: true,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FeedError::Api {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "API error 503: Service Unavailable");

        let err = FeedError::Feed {
            message: "Agency parameter \"a=nope\" is not valid.".into(),
            should_retry: false,
        };
        assert_eq!(
            err.to_string(),
            "feed error: Agency parameter \"a=nope\" is not valid."
        );
        assert!(!err.should_retry());

        let err = FeedError::from(XmlError::NoRoot);
        assert_eq!(err.to_string(), "XML parse error: document has no root element");

        let err = FeedError::from(ConversionError::UnknownStop {
            route: "N".into(),
            stop: "S9".into(),
        });
        assert_eq!(err.to_string(), "route N references unknown stop S9");
    }

    #[test]
    fn retry_hint() {
        let err = FeedError::Feed {
            message: "try again".into(),
            should_retry: true,
        };
        assert!(err.should_retry());
        assert!(!FeedError::NotConfigured("x".into()).should_retry());
    }
}
