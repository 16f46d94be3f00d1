//! Pure filter/sort derivation of the visible document subset.
//!
//! Both functions are non-mutating and return fresh vectors, so a view can
//! never alias the store's snapshot. Sorting is stable; ties keep the
//! store's original relative order.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::api::types::Document;

// ── Sort keys ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    UploadDateDesc,
    UploadDateAsc,
    TitleAsc,
    TitleDesc,
    FileSizeDesc,
    FileSizeAsc,
    /// Identity order — the defined fallback for unknown key names.
    Unsorted,
}

impl SortKey {
    /// Parse a key name; unknown names fall back to identity order rather
    /// than erroring.
    pub fn from_name(name: &str) -> Self {
        match name {
            "upload_date_desc" => Self::UploadDateDesc,
            "upload_date_asc" => Self::UploadDateAsc,
            "title_asc" | "filename_asc" => Self::TitleAsc,
            "title_desc" | "filename_desc" => Self::TitleDesc,
            "file_size_desc" => Self::FileSizeDesc,
            "file_size_asc" => Self::FileSizeAsc,
            _ => Self::Unsorted,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::UploadDateDesc => "newest first",
            Self::UploadDateAsc => "oldest first",
            Self::TitleAsc => "title A-Z",
            Self::TitleDesc => "title Z-A",
            Self::FileSizeDesc => "largest first",
            Self::FileSizeAsc => "smallest first",
            Self::Unsorted => "unsorted",
        }
    }

    /// Cycle through the user-selectable orders (skips `Unsorted`).
    pub fn next(self) -> Self {
        match self {
            Self::UploadDateDesc => Self::UploadDateAsc,
            Self::UploadDateAsc => Self::TitleAsc,
            Self::TitleAsc => Self::TitleDesc,
            Self::TitleDesc => Self::FileSizeDesc,
            Self::FileSizeDesc => Self::FileSizeAsc,
            Self::FileSizeAsc | Self::Unsorted => Self::UploadDateDesc,
        }
    }
}

// ── Filtering ───────────────────────────────────────────────────────────────

/// Case-insensitive substring match over title, content summary, and
/// keywords. An empty (or whitespace) term yields a stable copy of the full
/// set.
pub fn filter(documents: &[Document], term: &str) -> Vec<Document> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return documents.to_vec();
    }

    documents
        .iter()
        .filter(|doc| matches_term(doc, &needle))
        .cloned()
        .collect()
}

fn matches_term(doc: &Document, needle: &str) -> bool {
    doc.title.to_lowercase().contains(needle)
        || doc
            .content_summary
            .as_deref()
            .is_some_and(|summary| summary.to_lowercase().contains(needle))
        || doc
            .keywords
            .iter()
            .any(|keyword| keyword.to_lowercase().contains(needle))
}

// ── Sorting ─────────────────────────────────────────────────────────────────

/// Stable sort under the given key. `Unsorted` returns the input order
/// unchanged.
pub fn sort(mut documents: Vec<Document>, key: SortKey) -> Vec<Document> {
    match key {
        SortKey::UploadDateDesc => {
            documents.sort_by_key(|doc| std::cmp::Reverse(doc.upload_timestamp()))
        }
        SortKey::UploadDateAsc => documents.sort_by_key(Document::upload_timestamp),
        SortKey::TitleAsc => documents.sort_by_cached_key(|doc| collation_key(&doc.title)),
        SortKey::TitleDesc => {
            documents.sort_by_cached_key(|doc| std::cmp::Reverse(collation_key(&doc.title)))
        }
        SortKey::FileSizeDesc => documents.sort_by_key(|doc| std::cmp::Reverse(doc.file_size)),
        SortKey::FileSizeAsc => documents.sort_by_key(|doc| doc.file_size),
        SortKey::Unsorted => {}
    }
    documents
}

/// Accent- and case-insensitive collation key: NFKD-decompose, drop
/// combining marks, lowercase. "Résumé" and "resume" compare equal.
fn collation_key(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
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
            "content_summary": format!("{title} summary"),
            "keywords": ["report", title.to_lowercase()],
        }))
        .unwrap()
    }

    fn fixture() -> Vec<Document> {
        vec![
            doc("1", "Alpha", "2024-01-01", 100),
            doc("2", "Beta", "2024-02-01", 50),
        ]
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_filter_empty_term_copies_all() {
        let docs = fixture();
        let out = filter(&docs, "   ");
        assert_eq!(ids(&out), vec!["1", "2"]);
    }

    #[test]
    fn test_filter_matches_title_case_insensitive() {
        let out = filter(&fixture(), "BETA");
        assert_eq!(ids(&out), vec!["2"]);
    }

    #[test]
    fn test_filter_matches_summary_and_keywords() {
        let out = filter(&fixture(), "alpha summary");
        assert_eq!(ids(&out), vec!["1"]);
        let out = filter(&fixture(), "report");
        assert_eq!(ids(&out), vec!["1", "2"]);
    }

    #[test]
    fn test_filter_idempotent() {
        let once = filter(&fixture(), "beta");
        let twice = filter(&once, "beta");
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn test_sort_file_size_asc() {
        let out = sort(fixture(), SortKey::FileSizeAsc);
        assert_eq!(ids(&out), vec!["2", "1"]);
    }

    #[test]
    fn test_sort_upload_date_desc() {
        let out = sort(fixture(), SortKey::UploadDateDesc);
        assert_eq!(ids(&out), vec!["2", "1"]);
    }

    #[test]
    fn test_sort_desc_is_reversed_asc() {
        let asc = sort(fixture(), SortKey::UploadDateAsc);
        let mut desc = sort(fixture(), SortKey::UploadDateDesc);
        desc.reverse();
        assert_eq!(ids(&asc), ids(&desc));
    }

    #[test]
    fn test_sort_twice_is_noop() {
        let once = sort(fixture(), SortKey::TitleAsc);
        let twice = sort(once.clone(), SortKey::TitleAsc);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn test_sort_stability_on_ties() {
        let docs = vec![
            doc("1", "Same", "2024-01-01", 10),
            doc("2", "Same", "2024-01-01", 10),
            doc("3", "Same", "2024-01-01", 10),
        ];
        let out = sort(docs, SortKey::TitleAsc);
        assert_eq!(ids(&out), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_unknown_key_is_identity() {
        assert_eq!(SortKey::from_name("definitely_not_a_key"), SortKey::Unsorted);
        let docs = vec![
            doc("9", "Zulu", "2024-03-01", 1),
            doc("1", "Alpha", "2024-01-01", 9),
        ];
        let out = sort(docs, SortKey::Unsorted);
        assert_eq!(ids(&out), vec!["9", "1"]);
    }

    #[test]
    fn test_title_sort_is_accent_insensitive() {
        let docs = vec![
            doc("1", "Zebra", "2024-01-01", 1),
            doc("2", "Éclair", "2024-01-01", 1),
            doc("3", "apple", "2024-01-01", 1),
        ];
        let out = sort(docs, SortKey::TitleAsc);
        assert_eq!(ids(&out), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_sort_key_from_name_known() {
        assert_eq!(SortKey::from_name("file_size_asc"), SortKey::FileSizeAsc);
        assert_eq!(SortKey::from_name("filename_asc"), SortKey::TitleAsc);
    }

    #[test]
    fn test_sort_key_cycle_covers_all_orders() {
        let mut key = SortKey::UploadDateDesc;
        let mut seen = vec![key];
        for _ in 0..5 {
            key = key.next();
            seen.push(key);
        }
        assert_eq!(key.next(), SortKey::UploadDateDesc);
        assert_eq!(seen.len(), 6);
    }
}
