//! Typed errors for the fetch layer.

/// Failure modes of a single API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("server returned HTTP {status}")]
    Status { status: u16 },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status code when the server answered, `None` for transport or
    /// decode failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Message shown to the user in place of the raw error.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "The requested item could not be found.",
            Self::Transport(_) => "Could not reach the analysis service. Please try again later.",
            Self::Status { .. } | Self::Decode(_) => {
                "The analysis service returned an unexpected response."
            }
        }
    }

    /// Map a `ureq` error for the given resource.
    pub(crate) fn from_ureq(resource: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(404, _) => Self::NotFound(resource.to_string()),
            ureq::Error::Status(status, _) => Self::Status { status },
            ureq::Error::Transport(t) => Self::Transport(t.to_string()),
        }
    }
}
