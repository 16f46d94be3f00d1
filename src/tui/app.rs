use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::api::types::UploadStatus;
use crate::core::poller::PollEvent;

use super::events::{Action, AppEvent, Focus, Notification, NotificationLevel};
use super::services::Services;
use super::theme;
use super::views::centered_fixed;
use super::views::documents::DocumentsState;
use super::views::folders::{FolderResult, FoldersState};
use super::views::home::HomeState;
use super::views::search::SearchState;
use super::views::upload::UploadState;

/// Central application state (Elm architecture).
pub struct AppState {
    /// Whether the app is still running.
    pub running: bool,
    /// Currently focused top-level view.
    pub focus: Focus,
    /// Home / recent activity view state.
    pub home: HomeState,
    /// Document collection view state.
    pub documents: DocumentsState,
    /// Remote search view state.
    pub search: SearchState,
    /// Upload view state.
    pub upload: UploadState,
    /// Folder overview state.
    pub folders: FoldersState,
    /// Active notifications (max 3 visible, each with its own TTL).
    pub notifications: Vec<Notification>,
    /// Monotonic counter for notification IDs.
    notification_counter: u64,
    /// Whether the help modal is open.
    pub show_help: bool,
    /// Receiver for backend events.
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Receiver for status poller events.
    poll_rx: mpsc::UnboundedReceiver<PollEvent>,
    /// Backend services handle.
    services: Services,
}

impl AppState {
    pub fn new(
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        poll_rx: mpsc::UnboundedReceiver<PollEvent>,
        services: Services,
    ) -> Self {
        Self {
            running: true,
            focus: Focus::Home,
            home: HomeState::new(),
            documents: DocumentsState::new(),
            search: SearchState::new(),
            upload: UploadState::new(),
            folders: FoldersState::new(),
            notifications: Vec::new(),
            notification_counter: 0,
            show_help: false,
            event_rx,
            poll_rx,
            services,
        }
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        // Load the initial view's data
        self.home.load(&self.services);

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(poll_event) = self.poll_rx.recv() => {
                    self.handle_poll_event(poll_event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        Ok(())
    }

    // ── Event handling ──────────────────────────────────────────────────

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(crossterm_event) => {
                // Priority 1: help modal
                if self.show_help {
                    if let Some(action) = self.map_help_input(&crossterm_event) {
                        self.handle_action(action);
                    }
                    return;
                }

                // Priority 2: focused view
                if self.dispatch_view_input(&crossterm_event) {
                    return;
                }

                // Priority 3: global keybindings
                if let Some(action) = self.map_input_to_action(crossterm_event) {
                    self.handle_action(action);
                }
            }
            AppEvent::Poll(poll_event) => self.handle_poll_event(poll_event),
            AppEvent::Tick => self.on_tick(),
            AppEvent::Notification(notification) => {
                self.push_notification(notification.message, notification.level);
            }
            AppEvent::Quit => {
                self.running = false;
            }
        }
    }

    /// Route a poller event: update the one affected upload row, surface
    /// terminal transitions, and refresh the folder stats once an item
    /// settles (replacing the old fixed-interval refresh loop).
    fn handle_poll_event(&mut self, event: PollEvent) {
        self.upload.handle_poll_event(&event);

        match &event {
            PollEvent::Status { status, .. } if status.is_terminal() => {
                match status {
                    UploadStatus::Completed => {
                        self.push_notification(
                            "Document processing complete".to_string(),
                            NotificationLevel::Success,
                        );
                    }
                    UploadStatus::Failed => {
                        self.push_notification(
                            "Document processing failed".to_string(),
                            NotificationLevel::Error,
                        );
                    }
                    UploadStatus::TimedOut => {
                        self.push_notification(
                            "Processing status unknown — gave up polling".to_string(),
                            NotificationLevel::Warning,
                        );
                    }
                    _ => {}
                }
                self.folders.load(&self.services);
            }
            PollEvent::TransportFailed { message, .. } => {
                self.push_notification(
                    format!("Status polling stopped: {message}"),
                    NotificationLevel::Error,
                );
            }
            PollEvent::Status { .. } => {}
        }
    }

    /// Dispatch input to the currently focused view. Returns true if consumed.
    fn dispatch_view_input(&mut self, event: &Event) -> bool {
        match self.focus {
            Focus::Home => self.home.handle_input(event, &self.services),
            Focus::Documents => self.documents.handle_input(event, &self.services),
            Focus::Search => self.search.handle_input(event, &self.services),
            Focus::Upload => self.upload.handle_input(event, &self.services),
            Focus::Folders => match self.folders.handle_input(event, &self.services) {
                Some(FolderResult::Consumed) => true,
                Some(FolderResult::OpenCategory(category)) => {
                    self.handle_action(Action::OpenCategory(category));
                    true
                }
                None => false,
            },
        }
    }

    // ── Input mapping ───────────────────────────────────────────────────

    fn map_help_input(&self, event: &Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };
        match code {
            KeyCode::Esc | KeyCode::Char('?') => Some(Action::CloseHelp),
            _ => None,
        }
    }

    fn map_input_to_action(&self, event: Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        match (modifiers, code) {
            // Ctrl+C → quit
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
            // No modifiers
            (KeyModifiers::NONE | KeyModifiers::SHIFT, _) => match code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('?') => Some(Action::ShowHelp),
                KeyCode::Tab => Some(Action::TabNext),
                KeyCode::BackTab => Some(Action::TabPrev),
                KeyCode::Char('1') => Some(Action::FocusHome),
                KeyCode::Char('2') => Some(Action::FocusDocuments),
                KeyCode::Char('3') => Some(Action::FocusSearch),
                KeyCode::Char('4') => Some(Action::FocusUpload),
                KeyCode::Char('5') => Some(Action::FocusFolders),
                _ => None,
            },
            _ => None,
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::FocusHome => {
                self.focus = Focus::Home;
                self.home.load(&self.services);
            }
            Action::FocusDocuments => {
                self.focus = Focus::Documents;
                self.documents.load(&self.services);
            }
            Action::FocusSearch => {
                self.focus = Focus::Search;
            }
            Action::FocusUpload => {
                self.focus = Focus::Upload;
            }
            Action::FocusFolders => {
                self.focus = Focus::Folders;
                self.folders.load(&self.services);
            }
            Action::OpenCategory(category) => {
                self.documents.set_category(Some(category));
                self.focus = Focus::Documents;
                self.documents.load(&self.services);
            }
            Action::TabNext => {
                self.focus = self.focus.next();
                self.on_focus_changed();
            }
            Action::TabPrev => {
                self.focus = self.focus.prev();
                self.on_focus_changed();
            }
            Action::ShowHelp => self.show_help = true,
            Action::CloseHelp => self.show_help = false,
            Action::RefreshActive => self.on_focus_changed(),
        }
    }

    fn on_focus_changed(&mut self) {
        match self.focus {
            Focus::Home => self.home.load(&self.services),
            Focus::Documents => self.documents.load(&self.services),
            Focus::Folders => self.folders.load(&self.services),
            // Search and Upload hold session-local state; nothing to fetch.
            Focus::Search | Focus::Upload => {}
        }
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Push a notification (dedup by message, max 3 visible).
    pub fn push_notification(&mut self, message: String, level: NotificationLevel) {
        if self.notifications.iter().any(|n| n.message == message) {
            return;
        }

        self.notification_counter += 1;
        self.notifications.push(Notification {
            id: self.notification_counter,
            message,
            level,
            ttl_ticks: super::events::NOTIFICATION_TTL_TICKS,
        });

        while self.notifications.len() > 3 {
            self.notifications.remove(0);
        }
    }

    /// Tick: decrement notification TTLs, dismiss expired, poll async data.
    fn on_tick(&mut self) {
        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);

        self.home.poll();
        self.documents.poll();
        self.search.poll();
        self.upload.poll(&self.services);
        self.folders.poll();
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

        self.render_tab_bar(frame, chunks[0]);
        self.render_content(frame, chunks[1]);
        self.render_status_bar(frame, chunks[2]);

        self.render_notifications(frame, area);

        if self.show_help {
            self.render_help_modal(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(" docdeck ", theme::brand_badge()), Span::raw(" ")];
        for (i, focus) in Focus::ALL.iter().enumerate() {
            let style = if *focus == self.focus {
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                theme::muted()
            };
            spans.push(Span::styled(format!(" {} {} ", i + 1, focus.label()), style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_content(&self, frame: &mut Frame, area: Rect) {
        match self.focus {
            Focus::Home => self.home.render(frame, area),
            Focus::Documents => self.documents.render(frame, area),
            Focus::Search => self.search.render(frame, area),
            Focus::Upload => self.upload.render(frame, area),
            Focus::Folders => self.folders.render(frame, area),
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let uploads = if self.upload.has_active_rows() {
            Span::styled("uploads: processing", Style::default().fg(theme::ACCENT))
        } else {
            Span::styled("uploads: idle", theme::muted())
        };

        let status = Line::from(vec![
            Span::raw(" "),
            Span::styled(
                self.focus.label(),
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            uploads,
            Span::raw(" │ "),
            Span::styled("Tab", theme::key_hint()),
            Span::raw(":nav "),
            Span::styled("1-5", theme::key_hint()),
            Span::raw(":jump "),
            Span::styled("?", theme::key_hint()),
            Span::raw(":help "),
            Span::styled("q", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let max_width = 50.min(area.width.saturating_sub(2));
        let height = self.notifications.len() as u16;
        let x = area.width.saturating_sub(max_width + 1);
        let y = 1;

        let notification_area = Rect::new(x, y, max_width, height);

        let lines: Vec<Line> = self
            .notifications
            .iter()
            .map(|n| {
                let (prefix, color) = match n.level {
                    NotificationLevel::Info => ("ℹ", theme::INFO),
                    NotificationLevel::Success => ("✓", theme::SUCCESS),
                    NotificationLevel::Warning => ("⚠", theme::WARNING),
                    NotificationLevel::Error => ("✗", theme::ERROR),
                };
                Line::from(vec![
                    Span::styled(
                        format!(" {prefix} "),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(n.message.clone()),
                ])
            })
            .collect();

        frame.render_widget(Clear, notification_area);
        frame.render_widget(Paragraph::new(lines), notification_area);
    }

    fn render_help_modal(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_fixed(56, 30, area);

        let keybindings: &[(&str, &str)] = &[
            ("Global:", ""),
            ("q / Ctrl+C", "Quit"),
            ("?", "Toggle this help"),
            ("Tab / Shift+Tab", "Next / previous view"),
            ("1-5", "Jump to view"),
            ("", ""),
            ("Documents:", ""),
            ("/", "Filter (type, Enter to commit)"),
            ("s / v", "Cycle sort / toggle grid-list"),
            ("Enter", "Document details"),
            ("d / x", "Download / delete selected"),
            ("r", "Refresh"),
            ("", ""),
            ("Search:", ""),
            ("Enter", "Run search"),
            ("Ctrl+D", "Download selected result"),
            ("", ""),
            ("Upload:", ""),
            ("a / p", "Queue file / unqueue last"),
            ("u", "Upload queue"),
            ("x / c", "Remove row / clear finished"),
            ("", ""),
            ("Folders / Home:", ""),
            ("Enter", "Open folder"),
            ("d / x / C", "Download / dismiss / clear all"),
        ];

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(" Keybindings", theme::title())),
            Line::raw(""),
        ];

        for (key, desc) in keybindings {
            if key.is_empty() {
                lines.push(Line::raw(""));
            } else if desc.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {key}"),
                    theme::title(),
                )));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{key:<18}"),
                        Style::default()
                            .fg(theme::PRIMARY_LIGHT)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(*desc),
                ]));
            }
        }

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        frame.render_widget(Clear, modal);
        frame.render_widget(Paragraph::new(lines).block(block), modal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (poll_tx, poll_rx) = mpsc::unbounded_channel();
        let services = Services::init(&crate::config::AppConfig::default(), event_tx, poll_tx)
            .expect("client init");
        AppState::new(event_rx, poll_rx, services)
    }

    #[tokio::test]
    async fn test_push_notification_dedups_by_message() {
        let mut app = test_state();
        app.push_notification("same".to_string(), NotificationLevel::Info);
        app.push_notification("same".to_string(), NotificationLevel::Info);
        assert_eq!(app.notifications.len(), 1);
    }

    #[tokio::test]
    async fn test_push_notification_caps_at_three() {
        let mut app = test_state();
        for i in 0..5 {
            app.push_notification(format!("message {i}"), NotificationLevel::Info);
        }
        assert_eq!(app.notifications.len(), 3);
        // Oldest evicted first
        assert_eq!(app.notifications[0].message, "message 2");
    }

    #[tokio::test]
    async fn test_tick_expires_each_notification_independently() {
        let mut app = test_state();
        app.push_notification("first".to_string(), NotificationLevel::Info);
        // Age the first notification most of the way
        for _ in 0..(super::super::events::NOTIFICATION_TTL_TICKS - 1) {
            app.on_tick();
        }
        app.push_notification("second".to_string(), NotificationLevel::Info);
        assert_eq!(app.notifications.len(), 2);

        // One more tick expires only the first
        app.on_tick();
        assert_eq!(app.notifications.len(), 1);
        assert_eq!(app.notifications[0].message, "second");
    }

    #[tokio::test]
    async fn test_tab_next_cycles_focus() {
        let mut app = test_state();
        assert_eq!(app.focus, Focus::Home);
        app.handle_action(Action::TabNext);
        assert_eq!(app.focus, Focus::Documents);
        app.handle_action(Action::TabPrev);
        assert_eq!(app.focus, Focus::Home);
    }

    #[tokio::test]
    async fn test_open_category_switches_and_scopes() {
        let mut app = test_state();
        app.handle_action(Action::OpenCategory("others".to_string()));
        assert_eq!(app.focus, Focus::Documents);
        assert_eq!(app.documents.category(), Some("others"));
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_notification() {
        let mut app = test_state();
        app.handle_poll_event(PollEvent::TransportFailed {
            document_id: "d1".to_string(),
            message: "connection reset".to_string(),
        });
        assert_eq!(app.notifications.len(), 1);
        assert_eq!(app.notifications[0].level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_quit_action_stops_loop() {
        let mut app = test_state();
        app.handle_action(Action::Quit);
        assert!(!app.running);
    }
}
