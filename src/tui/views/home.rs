//! Home view — recent document activity.
//!
//! Shows the session's recently viewed/downloaded documents. Entries can be
//! dismissed locally, re-downloaded, or cleared server-side (with confirm).

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tokio::sync::mpsc;

use crate::api::types::RecentView;
use crate::core::format;
use crate::tui::events::{notify, NotificationLevel};
use crate::tui::services::Services;
use crate::tui::theme;

use super::centered_fixed;

/// How many recent entries to request.
const RECENT_LIMIT: usize = 5;

#[derive(Debug)]
enum LoadOutcome {
    Loaded(Vec<RecentView>),
    Failed,
    Cleared,
}

pub struct HomeState {
    views: Vec<RecentView>,
    selected: usize,
    loaded: bool,
    loading: bool,
    confirm_clear: bool,
    rx: mpsc::UnboundedReceiver<LoadOutcome>,
    tx: mpsc::UnboundedSender<LoadOutcome>,
}

impl HomeState {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            views: Vec::new(),
            selected: 0,
            loaded: false,
            loading: false,
            confirm_clear: false,
            rx,
            tx,
        }
    }

    pub fn load(&mut self, services: &Services) {
        if self.loading {
            return;
        }
        self.loading = true;

        let api = services.api.clone();
        let event_tx = services.event_tx.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            match api.recent_views(RECENT_LIMIT).await {
                Ok(views) => {
                    let _ = tx.send(LoadOutcome::Loaded(views));
                }
                Err(error) => {
                    log::warn!("recent views load failed: {error}");
                    notify(
                        &event_tx,
                        NotificationLevel::Error,
                        format!("Failed to load recent views: {error}"),
                    );
                    let _ = tx.send(LoadOutcome::Failed);
                }
            }
        });
    }

    pub fn poll(&mut self) {
        while let Ok(outcome) = self.rx.try_recv() {
            self.loading = false;
            match outcome {
                LoadOutcome::Loaded(views) => {
                    self.views = views;
                    self.loaded = true;
                    if self.selected >= self.views.len() {
                        self.selected = self.views.len().saturating_sub(1);
                    }
                }
                LoadOutcome::Failed => {}
                LoadOutcome::Cleared => {
                    self.views.clear();
                    self.selected = 0;
                    self.loaded = true;
                }
            }
        }
    }

    fn download_selected(&self, services: &Services) {
        let Some(view) = self.views.get(self.selected) else {
            return;
        };
        let id = view.document_id.clone();
        let title = view.document_title.clone();
        let api = services.api.clone();
        let event_tx = services.event_tx.clone();

        tokio::spawn(async move {
            match api.download_document(&id).await {
                Ok(target) => {
                    if open::that(&target.download_url).is_ok() {
                        notify(
                            &event_tx,
                            NotificationLevel::Success,
                            format!("Opening download: {title}"),
                        );
                    } else {
                        notify(
                            &event_tx,
                            NotificationLevel::Error,
                            "Could not open the download",
                        );
                    }
                }
                Err(error) => {
                    log::warn!("download of {id} failed: {error}");
                    notify(
                        &event_tx,
                        NotificationLevel::Error,
                        format!("Failed to download: {title}"),
                    );
                }
            }
        });
    }

    /// Dismiss the selected entry from the widget only; server history is
    /// untouched.
    fn remove_selected(&mut self, services: &Services) {
        if self.views.is_empty() {
            return;
        }
        self.views.remove(self.selected.min(self.views.len() - 1));
        if self.selected >= self.views.len() {
            self.selected = self.views.len().saturating_sub(1);
        }
        services.notify(NotificationLevel::Success, "Removed from recent views");
    }

    /// Clear history server-side after confirmation.
    fn clear_confirmed(&mut self, services: &Services) {
        self.confirm_clear = false;

        let api = services.api.clone();
        let event_tx = services.event_tx.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            match api.clear_recent_views().await {
                Ok(deleted) => {
                    notify(
                        &event_tx,
                        NotificationLevel::Success,
                        format!("Cleared {deleted} recent views"),
                    );
                    let _ = tx.send(LoadOutcome::Cleared);
                }
                Err(error) => {
                    log::warn!("clearing recent views failed: {error}");
                    notify(
                        &event_tx,
                        NotificationLevel::Error,
                        "Error clearing recent views",
                    );
                }
            }
        });
    }

    // ── Input ────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> bool {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        if self.confirm_clear {
            match code {
                KeyCode::Char('y') | KeyCode::Enter => self.clear_confirmed(services),
                KeyCode::Char('n') | KeyCode::Esc => self.confirm_clear = false,
                _ => {}
            }
            return true;
        }

        match (*modifiers, *code) {
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                if self.selected + 1 < self.views.len() {
                    self.selected += 1;
                }
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.selected = self.selected.saturating_sub(1);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                self.load(services);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('d')) => {
                self.download_selected(services);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('x') | KeyCode::Delete) => {
                self.remove_selected(services);
                true
            }
            (KeyModifiers::SHIFT, KeyCode::Char('C')) => {
                if !self.views.is_empty() {
                    self.confirm_clear = true;
                }
                true
            }
            _ => false,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_default("Recent Activity");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if !self.loaded {
            let message = if self.loading {
                "Loading recent views..."
            } else {
                "Not loaded. Press r to load recent activity."
            };
            let lines = vec![
                Line::raw(""),
                Line::from(Span::styled(message.to_string(), theme::muted())),
            ];
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
            return;
        }

        if self.views.is_empty() {
            let lines = vec![
                Line::raw(""),
                Line::from(Span::styled("No recent document activity.", theme::muted())),
                Line::from(Span::styled(
                    "Browse or download documents and they will appear here.",
                    theme::dim(),
                )),
            ];
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        } else {
            let mut lines: Vec<Line<'static>> = vec![Line::raw("")];
            for (i, view) in self.views.iter().enumerate() {
                let selected = i == self.selected;
                let pointer = if selected { " ▸ " } else { "   " };
                let title_style = if selected {
                    theme::highlight()
                } else {
                    Style::default().fg(theme::TEXT)
                };

                lines.push(Line::from(vec![
                    Span::styled(pointer.to_string(), Style::default().fg(theme::ACCENT)),
                    Span::styled(
                        format!("{:<50}", format::truncate(&view.document_title, 48)),
                        title_style,
                    ),
                    Span::styled(
                        format!(
                            "{} {} ago",
                            view.action_type.as_deref().unwrap_or("viewed"),
                            view.time_ago
                        ),
                        theme::muted(),
                    ),
                ]));
            }

            lines.push(Line::raw(""));
            lines.push(Line::from(vec![
                Span::styled(" d", theme::key_hint()),
                Span::raw(":download  "),
                Span::styled("x", theme::key_hint()),
                Span::raw(":dismiss  "),
                Span::styled("C", theme::key_hint()),
                Span::raw(":clear all  "),
                Span::styled("r", theme::key_hint()),
                Span::raw(":refresh"),
            ]));

            frame.render_widget(Paragraph::new(lines), inner);
        }

        if self.confirm_clear {
            self.render_confirm_modal(frame, area);
        }
    }

    fn render_confirm_modal(&self, frame: &mut Frame, area: Rect) {
        let modal_area = centered_fixed(48, 7, area);
        let lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                "  Clear all recent views?",
                Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
            Line::from(vec![
                Span::styled(
                    "  y",
                    Style::default().fg(theme::ERROR).add_modifier(Modifier::BOLD),
                ),
                Span::raw(":clear  "),
                Span::styled("n", theme::key_hint()),
                Span::raw(":cancel"),
            ]),
        ];

        let block = Block::default()
            .title(" Confirm ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ERROR));

        frame.render_widget(Clear, modal_area);
        frame.render_widget(Paragraph::new(lines).block(block), modal_area);
    }
}

impl Default for HomeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: &str, title: &str) -> RecentView {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "document_id": format!("doc-{id}"),
            "document_title": title,
            "time_ago": "5 minutes",
        }))
        .unwrap()
    }

    #[test]
    fn test_loaded_outcome_replaces_views() {
        let mut state = HomeState::new();
        state.loading = true;
        state
            .tx
            .send(LoadOutcome::Loaded(vec![view("1", "Alpha"), view("2", "Beta")]))
            .unwrap();
        state.poll();
        assert!(state.loaded);
        assert_eq!(state.views.len(), 2);
    }

    #[test]
    fn test_cleared_outcome_empties_list() {
        let mut state = HomeState::new();
        state.views = vec![view("1", "Alpha")];
        state.selected = 0;
        state.tx.send(LoadOutcome::Cleared).unwrap();
        state.poll();
        assert!(state.views.is_empty());
        assert!(state.loaded);
    }

    #[test]
    fn test_failed_outcome_keeps_previous() {
        let mut state = HomeState::new();
        state.views = vec![view("1", "Alpha")];
        state.loaded = true;
        state.loading = true;
        state.tx.send(LoadOutcome::Failed).unwrap();
        state.poll();
        assert_eq!(state.views.len(), 1);
        assert!(!state.loading);
    }
}
