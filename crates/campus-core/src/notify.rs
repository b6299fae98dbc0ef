//! Transient user notifications.
//!
//! Dashboards post a success or error notice for each action; notices
//! expire after a fixed delay and are never shown again.

use std::time::{Duration, Instant};

/// How long a notice stays visible.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    posted_at: Instant,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// A queue of notices with a fixed time-to-live.
#[derive(Debug, Clone)]
pub struct Notices {
    ttl: Duration,
    items: Vec<Notice>,
}

impl Notices {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            items: Vec::new(),
        }
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(NoticeKind::Success, text.into(), Instant::now());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(%text, "error notice");
        self.push(NoticeKind::Error, text, Instant::now());
    }

    fn push(&mut self, kind: NoticeKind, text: String, posted_at: Instant) {
        self.items.push(Notice {
            kind,
            text,
            posted_at,
        });
    }

    /// Drop every notice older than the TTL as of `now`.
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|n| now.saturating_duration_since(n.posted_at) < ttl);
    }

    /// Notices still visible at `now`.
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Notice> {
        let ttl = self.ttl;
        self.items
            .iter()
            .filter(move |n| now.saturating_duration_since(n.posted_at) < ttl)
    }

    /// Take every pending notice, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.items)
    }

    /// Most recent error text, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.items
            .iter()
            .rev()
            .find(|n| n.is_error())
            .map(|n| n.text.as_str())
    }

    /// Most recent notice text of either kind.
    pub fn last(&self) -> Option<&str> {
        self.items.last().map(|n| n.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}
