//! Upload view — queue local files, push them to the service, track
//! per-item processing status.
//!
//! Files are validated locally (type, size, batch limit) before any network
//! call; each violation is reported individually. After the multipart
//! upload is accepted, one status poller per document drives the table —
//! each status change updates only its own row. Dismissing a row drops its
//! poller, which aborts the task.

use std::path::PathBuf;

use chrono::Local;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc;

use crate::api::types::{UploadStatus, UploadedDocument};
use crate::core::poller::{PollEvent, StatusPoller, StatusSource};
use crate::core::validate::{validate_batch, validate_file, MAX_FILES};
use crate::tui::events::{notify, NotificationLevel};
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::text_input::TextInput;

#[derive(Debug)]
enum UploadOutcome {
    Accepted {
        documents: Vec<UploadedDocument>,
        message: String,
    },
    Failed,
}

/// One entry of the uploaded-files table.
#[derive(Debug, Clone)]
struct UploadRow {
    id: String,
    name: String,
    status: UploadStatus,
    category: Option<String>,
    uploaded_at: String,
}

pub struct UploadState {
    /// Path entry prompt (active while typing).
    input: TextInput,
    input_active: bool,
    /// Validated files waiting for upload.
    pending: Vec<PathBuf>,
    /// Files accepted by the server, tracked until terminal status.
    rows: Vec<UploadRow>,
    selected: usize,
    /// Live pollers, one per non-terminal row.
    pollers: Vec<StatusPoller>,
    uploading: bool,
    rx: mpsc::UnboundedReceiver<UploadOutcome>,
    tx: mpsc::UnboundedSender<UploadOutcome>,
}

impl UploadState {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            input: TextInput::new(),
            input_active: false,
            pending: Vec::new(),
            rows: Vec::new(),
            selected: 0,
            pollers: Vec::new(),
            uploading: false,
            rx,
            tx,
        }
    }

    /// Poll async upload completion; reap finished pollers.
    pub fn poll(&mut self, services: &Services) {
        while let Ok(outcome) = self.rx.try_recv() {
            self.uploading = false;
            match outcome {
                UploadOutcome::Accepted { documents, message } => {
                    services.notify(NotificationLevel::Success, message);
                    self.admit_documents(services, documents);
                }
                UploadOutcome::Failed => {}
            }
        }
        self.pollers.retain(|poller| !poller.is_finished());
    }

    /// Append accepted documents to the table and start their pollers.
    fn admit_documents(&mut self, services: &Services, documents: Vec<UploadedDocument>) {
        let uploaded_at = Local::now().format("%Y-%m-%d %H:%M").to_string();
        for doc in documents {
            if !doc.status.is_terminal() {
                let source: std::sync::Arc<dyn StatusSource> = services.api.clone();
                self.pollers.push(StatusPoller::spawn(
                    source,
                    doc.id.clone(),
                    services.poller_config(),
                    services.poll_tx.clone(),
                ));
            }
            self.rows.push(UploadRow {
                id: doc.id,
                name: doc.name,
                status: doc.status,
                category: None,
                uploaded_at: uploaded_at.clone(),
            });
        }
    }

    /// Apply a poller event to the one affected row.
    pub fn handle_poll_event(&mut self, event: &PollEvent) {
        let PollEvent::Status {
            document_id,
            status,
            category,
        } = event
        else {
            // Transport failures stop polling; the row keeps its last
            // status and the app surfaces the notification.
            return;
        };

        if let Some(row) = self.rows.iter_mut().find(|row| row.id == *document_id) {
            row.status = *status;
            if category.is_some() {
                row.category = category.clone();
            }
        }
    }

    /// Whether any tracked row is still waiting on its pipeline.
    pub fn has_active_rows(&self) -> bool {
        self.rows.iter().any(|row| !row.status.is_terminal())
    }

    // ── Queue management ─────────────────────────────────────────────────

    fn add_pending(&mut self, services: &Services) {
        let raw = self.input.take();
        self.input_active = false;

        let path = PathBuf::from(shellexpand_home(raw.trim()));
        if let Some(rejection) = validate_file(&path) {
            services.notify(NotificationLevel::Error, rejection.to_string());
            return;
        }
        if self.pending.len() + 1 > MAX_FILES {
            services.notify(
                NotificationLevel::Error,
                format!("maximum {MAX_FILES} files allowed per upload"),
            );
            return;
        }
        self.pending.push(path);
    }

    fn start_upload(&mut self, services: &Services) {
        if self.uploading || self.pending.is_empty() {
            return;
        }

        let batch = std::mem::take(&mut self.pending);
        let (accepted, rejections) = validate_batch(&batch);
        for rejection in &rejections {
            services.notify(NotificationLevel::Error, rejection.to_string());
        }
        if accepted.is_empty() {
            return;
        }

        self.uploading = true;
        services.notify(
            NotificationLevel::Info,
            format!("Uploading {} files...", accepted.len()),
        );

        let api = services.api.clone();
        let event_tx = services.event_tx.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            match api.upload_files(&accepted).await {
                Ok(receipt) => {
                    log::info!("upload accepted {} documents", receipt.documents.len());
                    let _ = tx.send(UploadOutcome::Accepted {
                        documents: receipt.documents,
                        message: receipt.message,
                    });
                }
                Err(error) => {
                    log::warn!("upload failed: {error}");
                    notify(
                        &event_tx,
                        NotificationLevel::Error,
                        format!("Upload failed: {error}"),
                    );
                    let _ = tx.send(UploadOutcome::Failed);
                }
            }
        });
    }

    /// Dismiss the selected row; its poller (if any) is dropped and aborts.
    fn dismiss_selected(&mut self, services: &Services) {
        if self.rows.is_empty() {
            return;
        }
        let row = self.rows.remove(self.selected.min(self.rows.len() - 1));
        self.pollers.retain(|poller| poller.document_id() != row.id);
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
        services.notify(NotificationLevel::Info, format!("Removed {}", row.name));
    }

    fn clear_settled(&mut self) {
        self.rows.retain(|row| !row.status.is_terminal());
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
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

        if self.input_active {
            return self.handle_prompt_input(*code, services);
        }

        match (*modifiers, *code) {
            (KeyModifiers::NONE, KeyCode::Char('a')) => {
                self.input.clear();
                self.input_active = true;
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('u')) => {
                self.start_upload(services);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('p')) => {
                if self.pending.pop().is_some() && self.pending.is_empty() {
                    services.notify(NotificationLevel::Info, "Upload queue cleared");
                }
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                if self.selected + 1 < self.rows.len() {
                    self.selected += 1;
                }
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.selected = self.selected.saturating_sub(1);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('x') | KeyCode::Delete) => {
                self.dismiss_selected(services);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('c')) => {
                self.clear_settled();
                true
            }
            _ => false,
        }
    }

    fn handle_prompt_input(&mut self, code: KeyCode, services: &Services) -> bool {
        match code {
            KeyCode::Esc => {
                self.input.clear();
                self.input_active = false;
                true
            }
            KeyCode::Enter => {
                if !self.input.is_blank() {
                    self.add_pending(services);
                } else {
                    self.input_active = false;
                }
                true
            }
            KeyCode::Char(c) => {
                self.input.insert_char(c);
                true
            }
            KeyCode::Backspace => {
                self.input.backspace();
                true
            }
            KeyCode::Delete => {
                self.input.delete();
                true
            }
            KeyCode::Left => {
                self.input.move_left();
                true
            }
            KeyCode::Right => {
                self.input.move_right();
                true
            }
            KeyCode::Home => {
                self.input.move_home();
                true
            }
            KeyCode::End => {
                self.input.move_end();
                true
            }
            _ => true, // Consume while the prompt is open
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_default("Upload");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines: Vec<Line<'static>> = Vec::new();

        // Path prompt / hint
        if self.input_active {
            lines.push(Line::from(vec![
                Span::styled(" Path: ", theme::heading()),
                Span::styled(
                    format!("{}_", self.input.text()),
                    Style::default().fg(theme::TEXT),
                ),
            ]));
        } else {
            lines.push(Line::from(vec![
                Span::styled(" a", theme::key_hint()),
                Span::raw(":add file  "),
                Span::styled("u", theme::key_hint()),
                Span::raw(":upload queue  "),
                Span::styled("p", theme::key_hint()),
                Span::raw(":unqueue last  "),
                Span::styled("x", theme::key_hint()),
                Span::raw(":remove row  "),
                Span::styled("c", theme::key_hint()),
                Span::raw(":clear finished"),
            ]));
        }
        lines.push(Line::raw(""));

        // Pending queue
        lines.push(Line::from(Span::styled(
            format!(" Queued ({})", self.pending.len()),
            theme::heading(),
        )));
        if self.pending.is_empty() {
            lines.push(Line::from(Span::styled(
                "   (empty — press a to add PDF, PNG, JPG or DOC files)",
                theme::dim(),
            )));
        }
        for path in &self.pending {
            lines.push(Line::from(Span::styled(
                format!("   {}", path.display()),
                Style::default().fg(theme::TEXT),
            )));
        }
        lines.push(Line::raw(""));

        // Upload in flight
        if self.uploading {
            lines.push(Line::from(Span::styled(
                " Uploading...",
                Style::default().fg(theme::ACCENT),
            )));
            lines.push(Line::raw(""));
        }

        // Uploaded files table
        lines.push(Line::from(Span::styled(
            format!(" Uploaded ({} files)", self.rows.len()),
            theme::heading(),
        )));
        if self.rows.is_empty() {
            lines.push(Line::from(Span::styled(
                "   (nothing uploaded this session)",
                theme::dim(),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                format!("   {:<34}{:<18}{:<12}{}", "Name", "Uploaded", "Status", "Category"),
                theme::dim(),
            )));
        }

        for (i, row) in self.rows.iter().enumerate() {
            let selected = i == self.selected;
            let pointer = if selected { " ▸ " } else { "   " };
            let name_style = if selected {
                theme::highlight()
            } else {
                Style::default().fg(theme::TEXT)
            };

            let category = row
                .category
                .as_deref()
                .map(crate::core::format::category_label)
                .unwrap_or_else(|| "—".to_string());

            lines.push(Line::from(vec![
                Span::styled(pointer.to_string(), Style::default().fg(theme::ACCENT)),
                Span::styled(
                    format!("{:<34}", crate::core::format::truncate(&row.name, 32)),
                    name_style,
                ),
                Span::styled(format!("{:<18}", row.uploaded_at), theme::muted()),
                Span::styled(
                    format!("{:<12}", row.status.label()),
                    Style::default().fg(status_color(row.status)),
                ),
                Span::styled(category, theme::muted()),
            ]));
        }

        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Left),
            inner,
        );
    }
}

impl Default for UploadState {
    fn default() -> Self {
        Self::new()
    }
}

fn status_color(status: UploadStatus) -> Color {
    match status {
        UploadStatus::Uploaded => theme::INFO,
        UploadStatus::Processing => theme::ACCENT,
        UploadStatus::Completed => theme::SUCCESS,
        UploadStatus::Failed => theme::ERROR,
        UploadStatus::TimedOut | UploadStatus::Unknown => theme::WARNING,
    }
}

/// Expand a leading `~/` so pasted shell paths work.
fn shellexpand_home(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).display().to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, status: UploadStatus) -> UploadRow {
        UploadRow {
            id: id.to_string(),
            name: format!("{id}.pdf"),
            status,
            category: None,
            uploaded_at: "2024-01-01 10:00".to_string(),
        }
    }

    #[test]
    fn test_poll_event_updates_only_matching_row() {
        let mut state = UploadState::new();
        state.rows = vec![
            row("a", UploadStatus::Uploaded),
            row("b", UploadStatus::Uploaded),
        ];

        state.handle_poll_event(&PollEvent::Status {
            document_id: "b".to_string(),
            status: UploadStatus::Processing,
            category: Some("others".to_string()),
        });

        assert_eq!(state.rows[0].status, UploadStatus::Uploaded);
        assert_eq!(state.rows[0].category, None);
        assert_eq!(state.rows[1].status, UploadStatus::Processing);
        assert_eq!(state.rows[1].category.as_deref(), Some("others"));
    }

    #[test]
    fn test_transport_failure_keeps_row_status() {
        let mut state = UploadState::new();
        state.rows = vec![row("a", UploadStatus::Processing)];

        state.handle_poll_event(&PollEvent::TransportFailed {
            document_id: "a".to_string(),
            message: "connection reset".to_string(),
        });

        assert_eq!(state.rows[0].status, UploadStatus::Processing);
    }

    #[test]
    fn test_category_not_cleared_by_later_update() {
        let mut state = UploadState::new();
        state.rows = vec![row("a", UploadStatus::Processing)];
        state.handle_poll_event(&PollEvent::Status {
            document_id: "a".to_string(),
            status: UploadStatus::Processing,
            category: Some("others".to_string()),
        });
        state.handle_poll_event(&PollEvent::Status {
            document_id: "a".to_string(),
            status: UploadStatus::Completed,
            category: None,
        });
        assert_eq!(state.rows[0].category.as_deref(), Some("others"));
        assert_eq!(state.rows[0].status, UploadStatus::Completed);
    }

    #[test]
    fn test_has_active_rows() {
        let mut state = UploadState::new();
        assert!(!state.has_active_rows());
        state.rows = vec![row("a", UploadStatus::Completed)];
        assert!(!state.has_active_rows());
        state.rows.push(row("b", UploadStatus::Processing));
        assert!(state.has_active_rows());
    }

    #[test]
    fn test_clear_settled_keeps_active() {
        let mut state = UploadState::new();
        state.rows = vec![
            row("a", UploadStatus::Completed),
            row("b", UploadStatus::Processing),
            row("c", UploadStatus::Failed),
            row("d", UploadStatus::TimedOut),
        ];
        state.selected = 3;
        state.clear_settled();
        assert_eq!(state.rows.len(), 1);
        assert_eq!(state.rows[0].id, "b");
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_shellexpand_home_passthrough() {
        assert_eq!(shellexpand_home("/tmp/a.pdf"), "/tmp/a.pdf");
    }
}
