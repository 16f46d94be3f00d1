use tokio::sync::mpsc;

use crate::core::poller::PollEvent;

/// Events flowing through the Elm-architecture event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// Periodic tick for notification TTLs and async data polling.
    Tick,
    /// Raw terminal input (keyboard/mouse).
    Input(crossterm::event::Event),
    /// A status poller reported progress for an uploaded document.
    Poll(PollEvent),
    /// Notification to display to the user.
    Notification(Notification),
    /// Request to quit the application.
    Quit,
}

/// High-level actions dispatched by the input mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Navigation
    FocusHome,
    FocusDocuments,
    FocusSearch,
    FocusUpload,
    FocusFolders,
    TabNext,
    TabPrev,
    /// Open the documents view restricted to one category.
    OpenCategory(String),

    // Modals
    ShowHelp,
    CloseHelp,

    // Application
    RefreshActive,
    Quit,
}

/// Which top-level view has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    Home,
    Documents,
    Search,
    Upload,
    Folders,
}

impl Focus {
    pub const ALL: [Focus; 5] = [
        Focus::Home,
        Focus::Documents,
        Focus::Search,
        Focus::Upload,
        Focus::Folders,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Focus::Home => "Home",
            Focus::Documents => "Documents",
            Focus::Search => "Search",
            Focus::Upload => "Upload",
            Focus::Folders => "Folders",
        }
    }

    pub fn next(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + 1) % Focus::ALL.len()]
    }

    pub fn prev(self) -> Focus {
        let idx = Focus::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Focus::ALL[(idx + Focus::ALL.len() - 1) % Focus::ALL.len()]
    }
}

/// Notification level for the overlay system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Ticks a notification stays visible (~4 s at the default tick rate).
pub const NOTIFICATION_TTL_TICKS: u32 = 80;

/// A timed notification shown in the overlay. Each entry owns its own TTL
/// counter, so stacked notifications dismiss independently.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub level: NotificationLevel,
    /// Ticks remaining before auto-dismiss.
    pub ttl_ticks: u32,
}

/// Send a notification into the event loop from a spawned task. The final
/// id is assigned by the app state when the event is handled.
pub fn notify(
    tx: &mpsc::UnboundedSender<AppEvent>,
    level: NotificationLevel,
    message: impl Into<String>,
) {
    let _ = tx.send(AppEvent::Notification(Notification {
        id: 0,
        message: message.into(),
        level,
        ttl_ticks: NOTIFICATION_TTL_TICKS,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_next_cycles() {
        let mut f = Focus::Home;
        for _ in 0..Focus::ALL.len() {
            f = f.next();
        }
        assert_eq!(f, Focus::Home);
    }

    #[test]
    fn test_focus_prev_cycles() {
        let mut f = Focus::Home;
        for _ in 0..Focus::ALL.len() {
            f = f.prev();
        }
        assert_eq!(f, Focus::Home);
    }

    #[test]
    fn test_focus_next_prev_inverse() {
        for f in Focus::ALL {
            assert_eq!(f.next().prev(), f);
        }
    }

    #[test]
    fn test_focus_labels_nonempty() {
        for f in Focus::ALL {
            assert!(!f.label().is_empty());
        }
    }

    #[test]
    fn test_notify_carries_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        notify(&tx, NotificationLevel::Error, "boom");
        match rx.try_recv() {
            Ok(AppEvent::Notification(n)) => {
                assert_eq!(n.message, "boom");
                assert_eq!(n.level, NotificationLevel::Error);
                assert_eq!(n.ttl_ticks, NOTIFICATION_TTL_TICKS);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
