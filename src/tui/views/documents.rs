//! Documents view — the main collection browser.
//!
//! Holds the collection store for the active scope (all documents or one
//! category), derives the visible subset through the pure filter/sort
//! engine on every input change, and renders it in list or grid mode.
//! Download and delete run as spawned tasks; the store mutates only after
//! the server confirms a deletion.
//!
//! Keys: `/` search (debounced), `s` cycle sort, `v` toggle grid/list,
//! `r` refresh, `Enter` details, `d` download, `x` delete (with confirm).

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tokio::sync::mpsc;

use crate::api::types::Document;
use crate::core::filter::{filter, sort, SortKey};
use crate::core::format;
use crate::core::store::{DocumentStore, LoadState};
use crate::tui::events::{notify, NotificationLevel};
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::text_input::TextInput;

use super::centered_fixed;

/// Minimum interval between filter rebuilds while typing (milliseconds).
const SEARCH_DEBOUNCE_MS: u128 = 300;

// ── Outcome channels ────────────────────────────────────────────────────────

#[derive(Debug)]
enum LoadOutcome {
    Loaded(Vec<Document>),
    Failed,
}

#[derive(Debug)]
enum ActionOutcome {
    /// Server confirmed the deletion; safe to drop from the store.
    Deleted(String),
    /// Server rejected the deletion; the entry stays visible.
    DeleteFailed(String),
}

// ── View modes & focus ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewMode {
    List,
    Grid,
}

impl ViewMode {
    fn toggle(self) -> Self {
        match self {
            Self::List => Self::Grid,
            Self::Grid => Self::List,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Grid => "grid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusZone {
    List,
    Search,
}

#[derive(Debug, Clone)]
enum DocModal {
    Detail(String),
    ConfirmDelete(String),
}

// ── State ───────────────────────────────────────────────────────────────────

pub struct DocumentsState {
    store: DocumentStore,
    /// Filtered + sorted snapshot currently rendered.
    view: Vec<Document>,
    selected: usize,
    mode: ViewMode,
    sort_key: SortKey,
    /// Restrict the collection to one category (set from the folders view).
    category: Option<String>,
    focus: FocusZone,
    search_input: TextInput,
    search_pending: bool,
    last_search_edit: Option<Instant>,
    modal: Option<DocModal>,
    data_rx: mpsc::UnboundedReceiver<LoadOutcome>,
    data_tx: mpsc::UnboundedSender<LoadOutcome>,
    action_rx: mpsc::UnboundedReceiver<ActionOutcome>,
    action_tx: mpsc::UnboundedSender<ActionOutcome>,
}

impl DocumentsState {
    pub fn new() -> Self {
        let (data_tx, data_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            store: DocumentStore::new(),
            view: Vec::new(),
            selected: 0,
            mode: ViewMode::Grid,
            sort_key: SortKey::UploadDateDesc,
            category: None,
            focus: FocusZone::List,
            search_input: TextInput::new(),
            search_pending: false,
            last_search_edit: None,
            modal: None,
            data_rx,
            data_tx,
            action_rx,
            action_tx,
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Rescope the view to a category. The old snapshot belongs to the old
    /// scope, so the store is reset and must be reloaded.
    pub fn set_category(&mut self, category: Option<String>) {
        if self.category == category {
            return;
        }
        self.category = category;
        self.store = DocumentStore::new();
        self.view.clear();
        self.selected = 0;
        self.search_input.clear();
        self.modal = None;
    }

    /// Trigger an async snapshot fetch. No-op while a fetch is in flight.
    pub fn load(&mut self, services: &Services) {
        if self.store.state() == LoadState::Loading {
            return;
        }
        self.store.begin_load();

        let api = services.api.clone();
        let event_tx = services.event_tx.clone();
        let tx = self.data_tx.clone();
        let category = self.category.clone();

        tokio::spawn(async move {
            match api.list_documents(category.as_deref()).await {
                Ok(documents) => {
                    log::info!("loaded {} documents", documents.len());
                    let _ = tx.send(LoadOutcome::Loaded(documents));
                }
                Err(error) => {
                    log::warn!("document load failed: {error}");
                    notify(
                        &event_tx,
                        NotificationLevel::Error,
                        format!("Failed to load documents: {error}"),
                    );
                    let _ = tx.send(LoadOutcome::Failed);
                }
            }
        });
    }

    /// Poll async outcomes and the search debounce. Call from on_tick.
    pub fn poll(&mut self) {
        while let Ok(outcome) = self.data_rx.try_recv() {
            match outcome {
                LoadOutcome::Loaded(documents) => {
                    self.store.replace(documents);
                    self.rebuild_view();
                }
                LoadOutcome::Failed => self.store.load_failed(),
            }
        }

        while let Ok(outcome) = self.action_rx.try_recv() {
            self.handle_outcome(outcome);
        }

        if self.search_pending {
            if let Some(ts) = self.last_search_edit {
                if ts.elapsed().as_millis() >= SEARCH_DEBOUNCE_MS {
                    self.search_pending = false;
                    self.rebuild_view();
                }
            }
        }
    }

    fn handle_outcome(&mut self, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::Deleted(id) => {
                self.store.remove(&id);
                if matches!(&self.modal, Some(DocModal::Detail(open)) if *open == id) {
                    self.modal = None;
                }
                self.rebuild_view();
            }
            // Entry stays visible; the task already notified.
            ActionOutcome::DeleteFailed(_) => {}
        }
    }

    /// Re-derive the visible subset from the store.
    fn rebuild_view(&mut self) {
        let matched = filter(self.store.documents(), self.search_input.text());
        self.view = sort(matched, self.sort_key);
        if self.selected >= self.view.len() {
            self.selected = self.view.len().saturating_sub(1);
        }
    }

    fn selected_doc(&self) -> Option<&Document> {
        self.view.get(self.selected)
    }

    fn mark_search_dirty(&mut self) {
        self.search_pending = true;
        self.last_search_edit = Some(Instant::now());
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Resolve a download URL and hand it to the system opener. The store
    /// is never touched here.
    fn download(&self, services: &Services, id: String) {
        let api = services.api.clone();
        let event_tx = services.event_tx.clone();
        services.notify(NotificationLevel::Info, "Starting download...");

        tokio::spawn(async move {
            match api.download_document(&id).await {
                Ok(target) => {
                    if let Err(error) = open::that(&target.download_url) {
                        log::warn!("opening download url failed: {error}");
                        notify(
                            &event_tx,
                            NotificationLevel::Error,
                            "Could not open the download",
                        );
                    } else {
                        notify(&event_tx, NotificationLevel::Success, "Download started");
                    }
                }
                Err(error) => {
                    log::warn!("download of {id} failed: {error}");
                    notify(&event_tx, NotificationLevel::Error, "Download failed");
                }
            }
        });
    }

    /// Run the confirmed deletion. The store entry is removed only after
    /// the server acknowledges.
    fn delete_confirmed(&mut self, services: &Services, id: String) {
        self.modal = None;

        let api = services.api.clone();
        let event_tx = services.event_tx.clone();
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            match api.delete_document(&id).await {
                Ok(()) => {
                    notify(
                        &event_tx,
                        NotificationLevel::Success,
                        "Document deleted successfully",
                    );
                    let _ = tx.send(ActionOutcome::Deleted(id));
                }
                Err(error) => {
                    log::warn!("delete of {id} failed: {error}");
                    notify(
                        &event_tx,
                        NotificationLevel::Error,
                        "Failed to delete document",
                    );
                    let _ = tx.send(ActionOutcome::DeleteFailed(id));
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

        if self.modal.is_some() {
            return self.handle_modal_input(*code, services);
        }

        match self.focus {
            FocusZone::Search => self.handle_search_input(*code),
            FocusZone::List => self.handle_list_input(*code, *modifiers, services),
        }
    }

    fn handle_list_input(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        services: &Services,
    ) -> bool {
        match (modifiers, code) {
            (KeyModifiers::NONE, KeyCode::Char('/')) => {
                self.focus = FocusZone::Search;
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                if self.selected + 1 < self.view.len() {
                    self.selected += 1;
                }
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
                self.selected = self.selected.saturating_sub(1);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('g')) => {
                self.selected = 0;
                true
            }
            (KeyModifiers::SHIFT, KeyCode::Char('G')) => {
                self.selected = self.view.len().saturating_sub(1);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                self.load(services);
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('s')) => {
                self.sort_key = self.sort_key.next();
                self.rebuild_view();
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('v')) => {
                self.mode = self.mode.toggle();
                true
            }
            (KeyModifiers::NONE, KeyCode::Enter) => {
                if let Some(id) = self.selected_doc().map(|doc| doc.id.clone()) {
                    self.modal = Some(DocModal::Detail(id));
                }
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('d')) => {
                if let Some(doc) = self.selected_doc() {
                    self.download(services, doc.id.clone());
                }
                true
            }
            (KeyModifiers::NONE, KeyCode::Char('x') | KeyCode::Delete) => {
                if let Some(id) = self.selected_doc().map(|doc| doc.id.clone()) {
                    self.modal = Some(DocModal::ConfirmDelete(id));
                }
                true
            }
            _ => false,
        }
    }

    fn handle_search_input(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => {
                self.search_input.clear();
                self.focus = FocusZone::List;
                self.rebuild_view();
                true
            }
            KeyCode::Enter => {
                self.focus = FocusZone::List;
                self.rebuild_view();
                true
            }
            KeyCode::Char(c) => {
                self.search_input.insert_char(c);
                self.mark_search_dirty();
                true
            }
            KeyCode::Backspace => {
                self.search_input.backspace();
                self.mark_search_dirty();
                true
            }
            KeyCode::Delete => {
                self.search_input.delete();
                self.mark_search_dirty();
                true
            }
            KeyCode::Left => {
                self.search_input.move_left();
                true
            }
            KeyCode::Right => {
                self.search_input.move_right();
                true
            }
            KeyCode::Home => {
                self.search_input.move_home();
                true
            }
            KeyCode::End => {
                self.search_input.move_end();
                true
            }
            _ => true, // Consume to avoid pass-through
        }
    }

    fn handle_modal_input(&mut self, code: KeyCode, services: &Services) -> bool {
        let modal = match &self.modal {
            Some(modal) => modal.clone(),
            None => return false,
        };

        match modal {
            DocModal::Detail(id) => match code {
                KeyCode::Esc | KeyCode::Enter => {
                    self.modal = None;
                    true
                }
                KeyCode::Char('d') => {
                    self.download(services, id);
                    true
                }
                KeyCode::Char('x') => {
                    self.modal = Some(DocModal::ConfirmDelete(id));
                    true
                }
                _ => true,
            },
            DocModal::ConfirmDelete(id) => match code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.delete_confirmed(services, id);
                    true
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.modal = None;
                    true
                }
                _ => true,
            },
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = match &self.category {
            Some(category) => format!("Documents — {}", format::category_label(category)),
            None => "Documents".to_string(),
        };
        let block = theme::block_default(&title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

        self.render_search_bar(frame, chunks[0]);
        self.render_status_line(frame, chunks[1]);
        self.render_content(frame, chunks[2]);

        match &self.modal {
            Some(DocModal::Detail(id)) => self.render_detail_modal(frame, area, id),
            Some(DocModal::ConfirmDelete(id)) => self.render_confirm_modal(frame, area, id),
            None => {}
        }
    }

    fn render_search_bar(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == FocusZone::Search;
        let prefix_style = if focused {
            Style::default()
                .fg(theme::PRIMARY_LIGHT)
                .add_modifier(Modifier::BOLD)
        } else {
            theme::dim()
        };

        let query = self.search_input.text();
        let display = if query.is_empty() && !focused {
            "Press / to filter...".to_string()
        } else if focused {
            format!("{query}_")
        } else {
            query.to_string()
        };

        let line = Line::from(vec![
            Span::styled(" [/] Filter: ", prefix_style),
            Span::styled(display, Style::default().fg(theme::TEXT)),
        ]);
        frame.render_widget(Paragraph::new(vec![line]), area);
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(
                format!(" {} of {} documents", self.view.len(), self.store.len()),
                theme::muted(),
            ),
            Span::raw("  │  "),
            Span::styled("s", theme::key_hint()),
            Span::styled(format!(":{}", self.sort_key.label()), theme::muted()),
            Span::raw("  "),
            Span::styled("v", theme::key_hint()),
            Span::styled(format!(":{}", self.mode.label()), theme::muted()),
        ]);
        frame.render_widget(Paragraph::new(vec![line]), area);
    }

    fn render_content(&self, frame: &mut Frame, area: Rect) {
        match self.store.state() {
            LoadState::NotLoaded => {
                self.render_placeholder(frame, area, "Not loaded. Press r to load documents.");
                return;
            }
            LoadState::Loading if self.store.is_empty() => {
                self.render_placeholder(frame, area, "Loading documents...");
                return;
            }
            _ => {}
        }

        if self.store.is_empty() {
            self.render_placeholder(frame, area, "No documents in this collection yet.");
            return;
        }
        if self.view.is_empty() {
            self.render_placeholder(frame, area, "No documents match your search criteria.");
            return;
        }

        match self.mode {
            ViewMode::List => self.render_list(frame, area),
            ViewMode::Grid => self.render_grid(frame, area),
        }
    }

    fn render_placeholder(&self, frame: &mut Frame, area: Rect, message: &str) {
        let lines = vec![
            Line::raw(""),
            Line::from(Span::styled(message.to_string(), theme::muted())),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line<'static>> = self
            .view
            .iter()
            .enumerate()
            .map(|(i, doc)| self.list_row(i, doc))
            .collect();

        let visible = area.height as usize;
        let scroll = self.selected.saturating_sub(visible.saturating_sub(1));
        frame.render_widget(
            Paragraph::new(lines).scroll((scroll as u16, 0)),
            area,
        );
    }

    fn list_row(&self, index: usize, doc: &Document) -> Line<'static> {
        let selected = index == self.selected;
        let pointer = if selected { " ▸ " } else { "   " };
        let title_style = if selected {
            theme::highlight()
        } else {
            Style::default().fg(theme::TEXT)
        };

        Line::from(vec![
            Span::styled(pointer.to_string(), Style::default().fg(theme::ACCENT)),
            Span::styled(format!("{:<42}", format::truncate(&doc.title, 40)), title_style),
            Span::styled(format!("{:<12}", format::short_date(&doc.upload_date)), theme::muted()),
            Span::styled(
                format!("{:>10}  ", format::file_size(doc.file_size)),
                theme::muted(),
            ),
            Span::styled(doc.file_type.clone(), theme::dim()),
        ])
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line<'static>> = Vec::new();
        let column = ((area.width as usize).saturating_sub(4) / 2).max(20);

        for (row_idx, pair) in self.view.chunks(2).enumerate() {
            let mut title_spans = Vec::new();
            let mut meta_spans = Vec::new();

            for (col_idx, doc) in pair.iter().enumerate() {
                let index = row_idx * 2 + col_idx;
                let selected = index == self.selected;
                let pointer = if selected { "▸ " } else { "  " };
                let title_style = if selected {
                    theme::highlight()
                } else {
                    Style::default().fg(theme::TEXT)
                };

                title_spans.push(Span::styled(
                    format!(
                        "{pointer}{:<width$}",
                        format::truncate(&doc.title, column.saturating_sub(4)),
                        width = column
                    ),
                    title_style,
                ));
                meta_spans.push(Span::styled(
                    format!(
                        "  {:<width$}",
                        format!(
                            "{} · {}",
                            format::short_date(&doc.upload_date),
                            format::time_ago(&doc.upload_date)
                        ),
                        width = column
                    ),
                    theme::muted(),
                ));
            }

            lines.push(Line::from(title_spans));
            lines.push(Line::from(meta_spans));
            lines.push(Line::raw(""));
        }

        let visible_rows = (area.height as usize) / 3;
        let selected_row = self.selected / 2;
        let scroll = selected_row.saturating_sub(visible_rows.saturating_sub(1)) * 3;
        frame.render_widget(Paragraph::new(lines).scroll((scroll as u16, 0)), area);
    }

    fn render_detail_modal(&self, frame: &mut Frame, area: Rect, id: &str) {
        let Some(doc) = self.store.get(id) else { return };
        let modal_area = centered_fixed(64, 18, area);

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                format!("  {}", format::truncate(&doc.title, 56)),
                theme::title(),
            )),
            Line::raw(""),
        ];

        let mut field = |label: &str, value: String| {
            lines.push(Line::from(vec![
                Span::styled(format!("  {label:<14}"), theme::muted()),
                Span::styled(value, Style::default().fg(theme::TEXT)),
            ]));
        };

        if let Some(category) = &doc.category {
            field("Category:", format::category_label(category));
        }
        field("Uploaded:", format::short_date(&doc.upload_date));
        field("Size:", format::file_size(doc.file_size));
        if !doc.file_type.is_empty() {
            field("Type:", doc.file_type.clone());
        }
        if let Some(score) = doc.confidence_score {
            field("Confidence:", format!("{}%", (score * 100.0).round() as u32));
        }

        if let Some(summary) = doc.content_summary.as_deref().filter(|s| !s.is_empty()) {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled("  Summary", theme::heading())));
            lines.push(Line::from(Span::styled(
                format!("  {}", format::truncate(summary, 110)),
                theme::muted(),
            )));
        }

        if !doc.keywords.is_empty() {
            lines.push(Line::raw(""));
            lines.push(Line::from(vec![
                Span::styled("  Keywords: ", theme::heading()),
                Span::styled(doc.keywords.join(", "), Style::default().fg(theme::ACCENT_SOFT)),
            ]));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("  d", theme::key_hint()),
            Span::raw(":download  "),
            Span::styled("x", theme::key_hint()),
            Span::raw(":delete  "),
            Span::styled("Esc", theme::key_hint()),
            Span::raw(":close"),
        ]));

        let block = Block::default()
            .title(" Document ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        frame.render_widget(Clear, modal_area);
        frame.render_widget(Paragraph::new(lines).block(block), modal_area);
    }

    fn render_confirm_modal(&self, frame: &mut Frame, area: Rect, id: &str) {
        let title = self
            .store
            .get(id)
            .map(|doc| format::truncate(&doc.title, 40))
            .unwrap_or_else(|| id.to_string());
        let modal_area = centered_fixed(52, 8, area);

        let lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                format!("  Delete \"{title}\"?"),
                Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "  This action cannot be undone.",
                theme::muted(),
            )),
            Line::raw(""),
            Line::from(vec![
                Span::styled("  y", Style::default().fg(theme::ERROR).add_modifier(Modifier::BOLD)),
                Span::raw(":delete  "),
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

impl Default for DocumentsState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str, date: &str, size: u64) -> Document {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "upload_date": date,
            "file_size": size,
        }))
        .unwrap()
    }

    fn loaded_state() -> DocumentsState {
        let mut state = DocumentsState::new();
        state.store.replace(vec![
            doc("1", "Alpha", "2024-01-01", 100),
            doc("2", "Beta", "2024-02-01", 50),
        ]);
        state.rebuild_view();
        state
    }

    #[test]
    fn test_rebuild_applies_sort() {
        let mut state = loaded_state();
        state.sort_key = SortKey::FileSizeAsc;
        state.rebuild_view();
        let ids: Vec<&str> = state.view.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_rebuild_applies_filter() {
        let mut state = loaded_state();
        state.search_input.set_text("beta");
        state.rebuild_view();
        let ids: Vec<&str> = state.view.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_delete_failed_keeps_entry() {
        let mut state = loaded_state();
        state.handle_outcome(ActionOutcome::DeleteFailed("1".to_string()));
        assert!(state.store.get("1").is_some());
        assert_eq!(state.view.len(), 2);
    }

    #[test]
    fn test_delete_confirmed_removes_entry() {
        let mut state = loaded_state();
        state.handle_outcome(ActionOutcome::Deleted("1".to_string()));
        assert!(state.store.get("1").is_none());
        let ids: Vec<&str> = state.view.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_deleted_closes_matching_detail_modal() {
        let mut state = loaded_state();
        state.modal = Some(DocModal::Detail("1".to_string()));
        state.handle_outcome(ActionOutcome::Deleted("1".to_string()));
        assert!(state.modal.is_none());
    }

    #[test]
    fn test_selection_clamped_after_removal() {
        let mut state = loaded_state();
        state.selected = 1;
        state.handle_outcome(ActionOutcome::Deleted("2".to_string()));
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_set_category_resets_store() {
        let mut state = loaded_state();
        state.set_category(Some("others".to_string()));
        assert_eq!(state.store.state(), LoadState::NotLoaded);
        assert!(state.view.is_empty());
        assert_eq!(state.category(), Some("others"));

        // Same category again keeps the snapshot.
        state.store.replace(vec![doc("3", "Gamma", "2024-03-01", 10)]);
        state.set_category(Some("others".to_string()));
        assert_eq!(state.store.len(), 1);
    }
}
