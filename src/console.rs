//! Notification-console sink: fire-and-forget human-readable progress and
//! error messages. Never consulted for control flow.

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMessageKind {
    Info,
    Error,
    InProgress,
}

pub trait ConsoleSink {
    /// Record a message; the returned id can later clear an in-progress entry.
    fn log(&self, kind: ConsoleMessageKind, message: &str) -> Uuid;

    /// Remove a previously logged in-progress message.
    fn clear(&self, id: Uuid);
}

/// Default sink backed by the `log` facade. In-progress entries have nothing
/// to clear, so `clear` is a no-op.
#[derive(Default)]
pub struct LogConsole;

impl LogConsole {
    pub fn new() -> Self {
        Self
    }
}

impl ConsoleSink for LogConsole {
    fn log(&self, kind: ConsoleMessageKind, message: &str) -> Uuid {
        match kind {
            ConsoleMessageKind::Info => log::info!("{}", message),
            ConsoleMessageKind::Error => log::error!("{}", message),
            ConsoleMessageKind::InProgress => log::info!("[in progress] {}", message),
        }
        Uuid::new_v4()
    }

    fn clear(&self, _id: Uuid) {}
}
