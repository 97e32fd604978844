//! Auto-dismissing status message for exports.

use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub generation: u64,
    set_at: Instant,
}

/// Holds at most one notice.
///
/// A notice is visible for exactly `ttl` after it is set. Setting a new one
/// replaces the old one and restarts the clock; the generation number lets a
/// pending dismissal tell whether it still owns the current notice.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    ttl: Duration,
    generation: u64,
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            generation: 0,
            current: None,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Replace any current notice. Returns the new generation.
    pub fn set(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) -> u64 {
        self.generation += 1;
        self.current = Some(Notice {
            kind,
            message: message.into(),
            generation: self.generation,
            set_at: now,
        });
        self.generation
    }

    /// The notice as seen at `now`, if it has not yet expired.
    pub fn visible_at(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.set_at) < self.ttl)
    }

    /// Time left before the current notice disappears.
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        self.visible_at(now)
            .map(|n| self.ttl - now.saturating_duration_since(n.set_at))
    }

    /// Drop the notice once its time is up. Returns true if one was dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.current.is_some() && self.visible_at(now).is_none() {
            self.current = None;
            return true;
        }
        false
    }

    /// Dismiss the notice only if `generation` is still current.
    pub fn dismiss(&mut self, generation: u64) -> bool {
        if self.current.as_ref().is_some_and(|n| n.generation == generation) {
            self.current = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(4000);

    #[test]
    fn cleared_exactly_at_ttl() {
        let t0 = Instant::now();
        let mut board = NoticeBoard::new(TTL);
        board.set(NoticeKind::Error, "Export failed", t0);

        assert!(board.visible_at(t0).is_some());
        assert!(board.visible_at(t0 + Duration::from_millis(3999)).is_some());
        assert!(board.visible_at(t0 + TTL).is_none());
        assert_eq!(
            board.remaining_at(t0 + Duration::from_millis(1500)),
            Some(Duration::from_millis(2500))
        );
    }

    #[test]
    fn replacement_restarts_clock() {
        let t0 = Instant::now();
        let mut board = NoticeBoard::new(TTL);
        let first = board.set(NoticeKind::Error, "Export failed", t0);
        let t1 = t0 + Duration::from_millis(3000);
        let second = board.set(NoticeKind::Success, "Exported", t1);

        let at = t0 + TTL;
        let notice = board.visible_at(at).unwrap();
        assert_eq!(notice.message, "Exported");
        assert!(board.visible_at(t1 + TTL).is_none());

        // The first notice's dismissal no longer applies.
        assert!(!board.dismiss(first));
        assert!(board.dismiss(second));
        assert!(board.visible_at(t1).is_none());
    }

    #[test]
    fn expire_drops_only_stale_notice() {
        let t0 = Instant::now();
        let mut board = NoticeBoard::new(TTL);
        assert!(!board.expire(t0));
        board.set(NoticeKind::Success, "ok", t0);
        assert!(!board.expire(t0 + Duration::from_millis(10)));
        assert!(board.expire(t0 + TTL));
        assert!(board.visible_at(t0).is_none());
    }
}
