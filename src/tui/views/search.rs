//! Search view — server-side semantic search.
//!
//! The query is sent to the remote search endpoint; ranking happens
//! server-side and results arrive with a relevance figure. The view only
//! renders what the server returned — no local scoring.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc;

use crate::api::types::SearchHit;
use crate::core::format;
use crate::tui::events::{notify, NotificationLevel};
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::text_input::TextInput;

/// Server-side result floor; hits under this similarity are not returned.
const MIN_SIMILARITY: f64 = 0.6;

/// Cap on returned hits per query.
const MAX_RESULTS: usize = 5;

#[derive(Debug)]
enum SearchOutcome {
    Results { query: String, hits: Vec<SearchHit> },
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Nothing searched yet.
    Idle,
    /// Request in flight.
    Searching,
    /// Results (possibly empty) for `last_query`.
    Done,
}

pub struct SearchState {
    input: TextInput,
    phase: Phase,
    last_query: String,
    hits: Vec<SearchHit>,
    selected: usize,
    rx: mpsc::UnboundedReceiver<SearchOutcome>,
    tx: mpsc::UnboundedSender<SearchOutcome>,
}

impl SearchState {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            input: TextInput::new(),
            phase: Phase::Idle,
            last_query: String::new(),
            hits: Vec::new(),
            selected: 0,
            rx,
            tx,
        }
    }

    /// Poll for async search completion. Call from on_tick.
    pub fn poll(&mut self) {
        while let Ok(outcome) = self.rx.try_recv() {
            match outcome {
                SearchOutcome::Results { query, hits } => {
                    self.last_query = query;
                    self.hits = hits;
                    self.selected = 0;
                    self.phase = Phase::Done;
                }
                SearchOutcome::Failed => {
                    self.phase = if self.last_query.is_empty() {
                        Phase::Idle
                    } else {
                        Phase::Done
                    };
                }
            }
        }
    }

    fn run_search(&mut self, services: &Services) {
        let query = self.input.text().trim().to_string();
        if query.is_empty() || self.phase == Phase::Searching {
            return;
        }
        self.phase = Phase::Searching;

        let api = services.api.clone();
        let event_tx = services.event_tx.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            match api.search(&query, MIN_SIMILARITY, MAX_RESULTS).await {
                Ok(hits) => {
                    log::info!("search {query:?} returned {} hits", hits.len());
                    let _ = tx.send(SearchOutcome::Results { query, hits });
                }
                Err(error) => {
                    log::warn!("search {query:?} failed: {error}");
                    notify(
                        &event_tx,
                        NotificationLevel::Error,
                        format!("Search failed: {error}"),
                    );
                    let _ = tx.send(SearchOutcome::Failed);
                }
            }
        });
    }

    /// Download a hit through the shared resolve-then-open flow.
    fn download(&self, services: &Services, id: String) {
        let api = services.api.clone();
        let event_tx = services.event_tx.clone();
        services.notify(NotificationLevel::Info, "Starting download...");

        tokio::spawn(async move {
            match api.download_document(&id).await {
                Ok(target) => {
                    if open::that(&target.download_url).is_ok() {
                        notify(&event_tx, NotificationLevel::Success, "Download started");
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
                    notify(&event_tx, NotificationLevel::Error, "Download failed");
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

        match (*modifiers, *code) {
            (KeyModifiers::NONE, KeyCode::Enter) => {
                self.run_search(services);
                true
            }
            (KeyModifiers::NONE, KeyCode::Esc) => {
                if !self.input.is_blank() {
                    self.input.clear();
                    true
                } else {
                    false
                }
            }
            (KeyModifiers::NONE, KeyCode::Down) => {
                if self.selected + 1 < self.hits.len() {
                    self.selected += 1;
                }
                true
            }
            (KeyModifiers::NONE, KeyCode::Up) => {
                self.selected = self.selected.saturating_sub(1);
                true
            }
            (KeyModifiers::CONTROL, KeyCode::Char('d')) => {
                if let Some(hit) = self.hits.get(self.selected) {
                    self.download(services, hit.id.clone());
                }
                true
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.input.insert_char(c);
                true
            }
            (KeyModifiers::NONE, KeyCode::Backspace) => {
                self.input.backspace();
                true
            }
            (KeyModifiers::NONE, KeyCode::Delete) => {
                self.input.delete();
                true
            }
            (KeyModifiers::NONE, KeyCode::Left) => {
                self.input.move_left();
                true
            }
            (KeyModifiers::NONE, KeyCode::Right) => {
                self.input.move_right();
                true
            }
            (KeyModifiers::NONE, KeyCode::Home) => {
                self.input.move_home();
                true
            }
            (KeyModifiers::NONE, KeyCode::End) => {
                self.input.move_end();
                true
            }
            _ => false,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_default("Search");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks =
            Layout::vertical([Constraint::Length(2), Constraint::Min(1)]).split(inner);

        self.render_query_bar(frame, chunks[0]);
        self.render_results(frame, chunks[1]);
    }

    fn render_query_bar(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled(" Query: ", theme::heading()),
                Span::styled(
                    format!("{}_", self.input.text()),
                    Style::default().fg(theme::TEXT),
                ),
            ]),
            Line::from(vec![
                Span::styled(" Enter", theme::key_hint()),
                Span::raw(":search  "),
                Span::styled("Ctrl+D", theme::key_hint()),
                Span::raw(":download selected  "),
                Span::styled("↑/↓", theme::key_hint()),
                Span::raw(":select"),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_results(&self, frame: &mut Frame, area: Rect) {
        match self.phase {
            Phase::Idle => {
                let lines = vec![
                    Line::raw(""),
                    Line::from(Span::styled(
                        "Type a question and press Enter to search the document base.",
                        theme::muted(),
                    )),
                ];
                frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
                return;
            }
            Phase::Searching => {
                let lines = vec![
                    Line::raw(""),
                    Line::from(Span::styled("Searching...", theme::muted())),
                ];
                frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
                return;
            }
            Phase::Done => {}
        }

        if self.hits.is_empty() {
            let lines = vec![
                Line::raw(""),
                Line::from(Span::styled("No documents found", theme::heading())),
                Line::from(Span::styled(
                    format!(
                        "No documents with {}% similarity or higher for \"{}\"",
                        (MIN_SIMILARITY * 100.0) as u32,
                        self.last_query
                    ),
                    theme::muted(),
                )),
            ];
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
            return;
        }

        let mut lines: Vec<Line<'static>> = Vec::new();
        for (i, hit) in self.hits.iter().enumerate() {
            let selected = i == self.selected;
            let pointer = if selected { " ▸ " } else { "   " };
            let title_style = if selected {
                theme::highlight()
            } else {
                Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD)
            };

            let mut header = vec![
                Span::styled(pointer.to_string(), Style::default().fg(theme::ACCENT)),
                Span::styled(
                    format!("Similarity: {}%", hit.relevance_percent()),
                    Style::default().fg(theme::SUCCESS),
                ),
            ];
            if let Some(category) = hit.display_category() {
                header.push(Span::raw("  "));
                header.push(Span::styled(
                    format::category_label(category),
                    Style::default().fg(theme::PRIMARY_LIGHT),
                ));
            }
            lines.push(Line::from(header));

            lines.push(Line::from(Span::styled(
                format!("   {}", format::truncate(&hit.title, 70)),
                title_style,
            )));
            let excerpt = hit
                .excerpt
                .as_deref()
                .filter(|e| !e.is_empty())
                .unwrap_or("No preview available");
            lines.push(Line::from(Span::styled(
                format!("   {}", format::truncate(excerpt, 100)),
                theme::muted(),
            )));
            lines.push(Line::raw(""));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, title: &str, pct: Option<f64>, score: Option<f64>) -> SearchHit {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "similarity_percentage": pct,
            "relevance_score": score,
        }))
        .unwrap()
    }

    #[test]
    fn test_results_outcome_updates_state() {
        let mut state = SearchState::new();
        state.phase = Phase::Searching;
        state
            .tx
            .send(SearchOutcome::Results {
                query: "policy".to_string(),
                hits: vec![hit("1", "Policy Doc", Some(91.0), None)],
            })
            .unwrap();
        state.poll();
        assert_eq!(state.phase, Phase::Done);
        assert_eq!(state.last_query, "policy");
        assert_eq!(state.hits.len(), 1);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_failed_outcome_returns_to_idle_when_never_searched() {
        let mut state = SearchState::new();
        state.phase = Phase::Searching;
        state.tx.send(SearchOutcome::Failed).unwrap();
        state.poll();
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn test_failed_outcome_keeps_previous_results() {
        let mut state = SearchState::new();
        state.last_query = "old".to_string();
        state.hits = vec![hit("1", "Old Result", None, Some(0.7))];
        state.phase = Phase::Searching;
        state.tx.send(SearchOutcome::Failed).unwrap();
        state.poll();
        assert_eq!(state.phase, Phase::Done);
        assert_eq!(state.hits.len(), 1);
    }
}
