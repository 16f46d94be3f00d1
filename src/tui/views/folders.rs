//! Folders view — category overview with per-type file counts.
//!
//! Mirrors the service's folder-structure endpoint: one card per category
//! with total files and a breakdown by file type. Enter opens the selected
//! category in the documents view.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc;

use crate::api::types::FolderInfo;
use crate::core::format;
use crate::tui::events::{notify, NotificationLevel};
use crate::tui::services::Services;
use crate::tui::theme;

/// Result of folder-view input the app must act on.
pub enum FolderResult {
    Consumed,
    /// Open the documents view scoped to this category id.
    OpenCategory(String),
}

#[derive(Debug)]
enum LoadOutcome {
    Loaded {
        folders: Vec<(String, FolderInfo)>,
        total_documents: u64,
    },
    Failed,
}

pub struct FoldersState {
    folders: Vec<(String, FolderInfo)>,
    total_documents: u64,
    selected: usize,
    loaded: bool,
    loading: bool,
    rx: mpsc::UnboundedReceiver<LoadOutcome>,
    tx: mpsc::UnboundedSender<LoadOutcome>,
}

impl FoldersState {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            folders: Vec::new(),
            total_documents: 0,
            selected: 0,
            loaded: false,
            loading: false,
            rx,
            tx,
        }
    }

    /// Trigger an async folder-structure fetch.
    pub fn load(&mut self, services: &Services) {
        if self.loading {
            return;
        }
        self.loading = true;

        let api = services.api.clone();
        let event_tx = services.event_tx.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            match api.folder_structure().await {
                Ok((structure, total_documents)) => {
                    let folders: Vec<(String, FolderInfo)> = structure.into_iter().collect();
                    let _ = tx.send(LoadOutcome::Loaded {
                        folders,
                        total_documents,
                    });
                }
                Err(error) => {
                    log::warn!("folder structure load failed: {error}");
                    notify(
                        &event_tx,
                        NotificationLevel::Error,
                        format!("Failed to load folders: {error}"),
                    );
                    let _ = tx.send(LoadOutcome::Failed);
                }
            }
        });
    }

    /// Poll for async data completion. Call from on_tick.
    pub fn poll(&mut self) {
        while let Ok(outcome) = self.rx.try_recv() {
            self.loading = false;
            match outcome {
                LoadOutcome::Loaded {
                    folders,
                    total_documents,
                } => {
                    self.folders = folders;
                    self.total_documents = total_documents;
                    self.loaded = true;
                    if self.selected >= self.folders.len() {
                        self.selected = self.folders.len().saturating_sub(1);
                    }
                }
                LoadOutcome::Failed => {}
            }
        }
    }

    // ── Input ────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> Option<FolderResult> {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        match (*modifiers, *code) {
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                if self.selected + 1 < self.folders.len() {
                    self.selected += 1;
                }
                Some(FolderResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.selected = self.selected.saturating_sub(1);
                Some(FolderResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                self.load(services);
                Some(FolderResult::Consumed)
            }
            (KeyModifiers::NONE, KeyCode::Enter | KeyCode::Char('l')) => self
                .folders
                .get(self.selected)
                .map(|(id, _)| FolderResult::OpenCategory(id.clone())),
            _ => None,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_default("Folders");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if !self.loaded {
            let message = if self.loading {
                "Loading folder structure..."
            } else {
                "Not loaded. Press r to load folders."
            };
            let lines = vec![
                Line::raw(""),
                Line::from(Span::styled(message.to_string(), theme::muted())),
            ];
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
            return;
        }

        let mut lines: Vec<Line<'static>> = vec![
            Line::from(Span::styled(
                format!(" {} documents across {} folders", self.total_documents, self.folders.len()),
                theme::muted(),
            )),
            Line::raw(""),
        ];

        if self.folders.is_empty() {
            lines.push(Line::from(Span::styled(
                " No folders yet — upload some documents first.",
                theme::muted(),
            )));
        }

        for (i, (id, folder)) in self.folders.iter().enumerate() {
            let selected = i == self.selected;
            let pointer = if selected { " ▸ " } else { "   " };
            let name = if folder.name.is_empty() {
                format::category_label(id)
            } else {
                folder.name.clone()
            };
            let name_style = if selected {
                theme::highlight()
            } else {
                Style::default().fg(theme::TEXT)
            };

            lines.push(Line::from(vec![
                Span::styled(pointer.to_string(), Style::default().fg(theme::ACCENT)),
                Span::styled(format!("{name:<28}"), name_style),
                Span::styled(format!("{} files", folder.total_files), theme::muted()),
            ]));

            let breakdown: Vec<String> = folder
                .file_types
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(kind, count)| format!("{count} {}", type_label(kind)))
                .collect();
            let detail = if folder.total_files == 0 {
                "no files yet".to_string()
            } else if breakdown.is_empty() {
                "—".to_string()
            } else {
                breakdown.join("  ")
            };
            lines.push(Line::from(Span::styled(
                format!("      {detail}"),
                theme::dim(),
            )));
            lines.push(Line::raw(""));
        }

        lines.push(Line::from(vec![
            Span::styled(" Enter", theme::key_hint()),
            Span::raw(":open folder  "),
            Span::styled("r", theme::key_hint()),
            Span::raw(":refresh"),
        ]));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Default for FoldersState {
    fn default() -> Self {
        Self::new()
    }
}

fn type_label(kind: &str) -> &str {
    match kind {
        "pdf" => "PDFs",
        "doc" => "DOCs",
        "image" => "images",
        _ => "others",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(name: &str, total: u64) -> FolderInfo {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "total_files": total,
            "file_types": {"pdf": total, "doc": 0},
        }))
        .unwrap()
    }

    #[test]
    fn test_loaded_outcome_replaces_folders() {
        let mut state = FoldersState::new();
        state.loading = true;
        state
            .tx
            .send(LoadOutcome::Loaded {
                folders: vec![
                    ("others".to_string(), folder("Others", 2)),
                    ("training_knowledge".to_string(), folder("Training & Knowledge", 1)),
                ],
                total_documents: 3,
            })
            .unwrap();
        state.poll();
        assert!(state.loaded);
        assert!(!state.loading);
        assert_eq!(state.folders.len(), 2);
        assert_eq!(state.total_documents, 3);
    }

    #[test]
    fn test_failed_outcome_keeps_previous_data() {
        let mut state = FoldersState::new();
        state.folders = vec![("others".to_string(), folder("Others", 2))];
        state.loaded = true;
        state.loading = true;
        state.tx.send(LoadOutcome::Failed).unwrap();
        state.poll();
        assert!(state.loaded);
        assert_eq!(state.folders.len(), 1);
    }

    #[test]
    fn test_selection_clamped_on_shrink() {
        let mut state = FoldersState::new();
        state.folders = vec![
            ("a".to_string(), folder("A", 1)),
            ("b".to_string(), folder("B", 1)),
        ];
        state.selected = 1;
        state
            .tx
            .send(LoadOutcome::Loaded {
                folders: vec![("a".to_string(), folder("A", 1))],
                total_documents: 1,
            })
            .unwrap();
        state.poll();
        assert_eq!(state.selected, 0);
    }
}
