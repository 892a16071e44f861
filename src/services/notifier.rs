use crate::models::{Notice, NoticeKind};
use crate::utils::lock;
use std::sync::{Arc, Mutex};

/// Sink for transient user-facing messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn info(&self, message: &str) {
        self.notify(Notice::info(message));
    }

    fn confirm(&self, message: &str) {
        self.notify(Notice::confirm(message));
    }

    fn alert(&self, message: &str) {
        self.notify(Notice::alert(message));
    }

    fn error(&self, message: &str) {
        self.notify(Notice::error(message));
    }
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => log::error!("{}", notice.message),
            NoticeKind::Alert => log::warn!("{}", notice.message),
            NoticeKind::Info | NoticeKind::Confirm => log::info!("{}", notice.message),
        }
    }
}

/// Keeps notices until the host drains them into its pop-up widget.
#[derive(Debug, Default, Clone)]
pub struct NoticeQueue {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        lock(&self.notices).drain(..).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|n| n.message).collect()
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.snapshot().pop()
    }
}

impl Notifier for NoticeQueue {
    fn notify(&self, notice: Notice) {
        log::debug!("Queued {:?} notice: {}", notice.kind, notice.message);
        lock(&self.notices).push(notice);
    }
}
