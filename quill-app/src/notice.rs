//! Transient user-facing notifications.
//!
//! Views never fail loudly: every outcome worth telling the user about is
//! sent through a [`Notifier`] and rendered by whoever holds the receiver.

use std::fmt::{Display, Formatter};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

#[derive(Clone, Debug)]
pub struct Notifier {
    sender: UnboundedSender<Notice>,
}

pub type Notices = UnboundedReceiver<Notice>;

impl Notifier {
    #[must_use]
    pub fn channel() -> (Self, Notices) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice {
            level,
            message: message.into(),
        };

        if let Err(err) = self.sender.send(notice) {
            debug!(notice = %err.0, "Nobody is listening for notices");
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// Collects everything currently queued without waiting.
pub fn drain(notices: &mut Notices) -> Vec<Notice> {
    let mut drained = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        drained.push(notice);
    }
    drained
}
