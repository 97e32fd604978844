//! Per-page fetch state.
//!
//! Every page goes `Idle -> Loading -> {Error, NotFound, Ready}`. The error
//! variants carry a user-facing message, never the raw transport error.

use std::panic;
use std::thread;

use serde::Serialize;

use crate::activity::logger;
use crate::api::ApiError;

/// Lifecycle of one page (or panel) fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ViewState<T> {
    Idle,
    Loading,
    Error(String),
    NotFound,
    Ready(T),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> ViewState<T> {
    /// State for a failed fetch. A 404 becomes [`ViewState::NotFound`].
    pub fn failed(err: &ApiError) -> Self {
        logger::error(&err.to_string());
        if err.is_not_found() {
            Self::NotFound
        } else {
            Self::Error(err.user_message().to_string())
        }
    }

    /// True when the page should render its error panel.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_) | Self::NotFound)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(view) => Some(view),
            _ => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready(view) => Some(view),
            _ => None,
        }
    }

    /// Message for the error panel, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(msg) => Some(msg),
            Self::NotFound => Some("Not found."),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            Self::Idle => ViewState::Idle,
            Self::Loading => ViewState::Loading,
            Self::Error(msg) => ViewState::Error(msg),
            Self::NotFound => ViewState::NotFound,
            Self::Ready(view) => ViewState::Ready(f(view)),
        }
    }
}

/// Run two fetches on scoped threads and wait for both.
///
/// Neither result is returned until both have settled, so a page never
/// derives its view-model from half of its data.
pub fn fetch_pair<A, B, FA, FB>(first: FA, second: FB) -> (A, B)
where
    A: Send,
    B: Send,
    FA: FnOnce() -> A + Send,
    FB: FnOnce() -> B + Send,
{
    thread::scope(|s| {
        let a = s.spawn(first);
        let b = s.spawn(second);
        let a = a.join().unwrap_or_else(|e| panic::resume_unwind(e));
        let b = b.join().unwrap_or_else(|e| panic::resume_unwind(e));
        (a, b)
    })
}

/// Settle a pair of fetches into a page state.
///
/// Either failure wins over success; a missing primary payload is
/// [`ViewState::NotFound`].
pub fn settle_pair<P, S, T>(
    primary: Result<Option<P>, ApiError>,
    secondary: Result<S, ApiError>,
    derive: impl FnOnce(P, S) -> T,
) -> ViewState<T> {
    match (primary, secondary) {
        (Err(e), _) | (_, Err(e)) => ViewState::failed(&e),
        (Ok(None), Ok(_)) => ViewState::NotFound,
        (Ok(Some(p)), Ok(s)) => ViewState::Ready(derive(p, s)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn failed_maps_not_found() {
        let state: ViewState<()> = ViewState::failed(&ApiError::NotFound("report x".into()));
        assert_eq!(state, ViewState::NotFound);
        assert!(state.is_error());
    }

    #[test]
    fn failed_uses_user_message() {
        let state: ViewState<()> = ViewState::failed(&ApiError::Transport("refused".into()));
        let msg = state.error_message().unwrap();
        assert!(!msg.contains("refused"));
    }

    #[test]
    fn settle_pair_error_iff_failure_or_missing() {
        let ok: ViewState<u32> = settle_pair(Ok(Some(2)), Ok(3), |a, b| a + b);
        assert_eq!(ok, ViewState::Ready(5));
        assert!(!ok.is_error());

        let missing: ViewState<u32> = settle_pair(Ok(None::<u32>), Ok(3), |a, b| a + b);
        assert_eq!(missing, ViewState::NotFound);

        let secondary_failed: ViewState<u32> = settle_pair(
            Ok(Some(2)),
            Err::<u32, _>(ApiError::Status { status: 500 }),
            |a, b| a + b,
        );
        assert!(secondary_failed.is_error());
    }

    #[test]
    fn fetch_pair_runs_concurrently() {
        let start = Instant::now();
        let (a, b) = fetch_pair(
            || {
                thread::sleep(Duration::from_millis(150));
                1
            },
            || {
                thread::sleep(Duration::from_millis(150));
                2
            },
        );
        assert_eq!((a, b), (1, 2));
        assert!(start.elapsed() < Duration::from_millis(290));
    }

    #[test]
    fn serializes_with_state_tag() {
        let json = serde_json::to_value(ViewState::Ready(7)).unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["data"], 7);
        let json = serde_json::to_value(ViewState::<u8>::NotFound).unwrap();
        assert_eq!(json["state"], "not_found");
    }
}
