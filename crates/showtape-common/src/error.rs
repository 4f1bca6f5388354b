//! Error taxonomy shared by the resolution, manifest and retrieval stages.
//!
//! Every variant is fatal to the item being processed but never to the whole
//! run; the orchestration layer logs it and moves on to the next item.

/// Error type for showtape pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server answered with a non-success status. Carries the raw status line.
    #[error("{status}")]
    Network { status: String },

    /// The request never produced a response (connect, TLS, body read).
    #[error("transport error: {0}")]
    Transport(String),

    /// A manifest, JSON document or diagnostic text did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The stream-metadata endpoint returned an empty `streamLink`.
    #[error("the api didn't return a stream URL")]
    NoStreamUrl,

    /// None of the probed stream URLs matched a known encoding.
    #[error("the api didn't return any usable formats")]
    NoUsableFormat,

    /// The format fallback chain ran out before a candidate matched.
    #[error("no track format was chosen")]
    NoMatchingFormat,

    /// The resolution fallback chain ran out before a variant matched.
    #[error("no variant was chosen")]
    NoVariantAvailable,

    /// The adaptive audio variant URI carried no bitrate marker.
    #[error("no regex match for manifest bitrate")]
    NoBitrateMatch,

    /// The key server returned fewer than 16 bytes.
    #[error("key response too short: got {got} of 16 bytes")]
    ShortKey { got: usize },

    /// The input uses something this pipeline cannot handle.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a network error from a status line such as `403 Forbidden`.
    pub fn network(status: impl std::fmt::Display) -> Self {
        Self::Network {
            status: status.to_string(),
        }
    }

    /// Create a transport error.
    pub fn transport(msg: impl std::fmt::Display) -> Self {
        Self::Transport(msg.to_string())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Whether this error comes from a resolution policy running out of options.
    pub fn is_policy_exhausted(&self) -> bool {
        matches!(
            self,
            Self::NoUsableFormat
                | Self::NoMatchingFormat
                | Self::NoVariantAvailable
                | Self::NoBitrateMatch
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_is_status_verbatim() {
        let err = Error::network("403 Forbidden");
        assert_eq!(err.to_string(), "403 Forbidden");
    }

    #[test]
    fn test_policy_exhaustion() {
        assert!(Error::NoUsableFormat.is_policy_exhausted());
        assert!(Error::NoMatchingFormat.is_policy_exhausted());
        assert!(Error::NoVariantAvailable.is_policy_exhausted());
        assert!(Error::NoBitrateMatch.is_policy_exhausted());
        assert!(!Error::NoStreamUrl.is_policy_exhausted());
        assert!(!Error::parse("bad").is_policy_exhausted());
    }

    #[test]
    fn test_json_error_becomes_parse() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(json_err);
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_short_key_display() {
        let err = Error::ShortKey { got: 4 };
        assert_eq!(err.to_string(), "key response too short: got 4 of 16 bytes");
    }
}
