//! User-facing transient notices.
//!
//! Components raise notices through the `NoticeSink` trait. `LogNotices`
//! forwards them to tracing for headless runs; `NoticeBoard` keeps them in
//! memory with a visibility window so a front end (or a test) can read them.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// How long a notice stays visible
pub const NOTICE_TTL_SECS: i64 = 3;

const DEFAULT_BOARD_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.raised_at + Duration::seconds(NOTICE_TTL_SECS)
    }
}

/// Destination for notices. Implementations must not block.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes every notice to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotices;

impl NoticeSink for LogNotices {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::error!(notice = %notice.message, "Notice"),
            NoticeLevel::Warning => tracing::warn!(notice = %notice.message, "Notice"),
            NoticeLevel::Info | NoticeLevel::Success => {
                tracing::info!(level = %notice.level, notice = %notice.message, "Notice")
            }
        }
    }
}

/// Bounded in-memory notice history.
///
/// The oldest notice is dropped once `capacity` is reached.
pub struct NoticeBoard {
    capacity: usize,
    notices: Mutex<VecDeque<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BOARD_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            notices: Mutex::new(VecDeque::new()),
        }
    }

    /// Notices still inside their visibility window
    pub fn visible(&self) -> Vec<Notice> {
        self.visible_at(Utc::now())
    }

    pub fn visible_at(&self, now: DateTime<Utc>) -> Vec<Notice> {
        self.lock()
            .iter()
            .filter(|n| n.raised_at <= now && now < n.expires_at())
            .cloned()
            .collect()
    }

    /// Full retained history, oldest first
    pub fn all(&self) -> Vec<Notice> {
        self.lock().iter().cloned().collect()
    }

    /// Drain the history
    pub fn take(&self) -> Vec<Notice> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notice>> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeSink for NoticeBoard {
    fn notify(&self, notice: Notice) {
        tracing::debug!(level = %notice.level, notice = %notice.message, "Notice raised");
        let mut notices = self.lock();
        if notices.len() >= self.capacity {
            notices.pop_front();
        }
        notices.push_back(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_visibility_window() {
        let board = NoticeBoard::new();
        board.notify(Notice::warning("Low stock alert: Hammer (2 remaining)"));

        let raised = board.all()[0].raised_at;
        assert_eq!(board.visible_at(raised).len(), 1);
        assert_eq!(board.visible_at(raised + Duration::milliseconds(2999)).len(), 1);
        assert!(board.visible_at(raised + Duration::seconds(3)).is_empty());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_board_capacity_drops_oldest() {
        let board = NoticeBoard::with_capacity(2);
        board.notify(Notice::info("one"));
        board.notify(Notice::success("two"));
        board.notify(Notice::error("three"));

        let messages: Vec<_> = board.take().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
        assert!(board.is_empty());
    }

    #[test]
    fn test_levels() {
        assert_eq!(Notice::warning("x").level, NoticeLevel::Warning);
        assert_eq!(NoticeLevel::Success.to_string(), "success");
        LogNotices.notify(Notice::error("logged only"));
    }
}
