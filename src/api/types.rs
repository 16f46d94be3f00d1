//! Wire types for the document-management service API.
//!
//! Response envelopes follow the server convention of a `status` field that
//! is `"success"` on the happy path and an `error` message otherwise; the
//! client treats anything else as a server error even on HTTP 200.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::format::parse_upload_date;

// ── Documents ───────────────────────────────────────────────────────────────

/// A document as returned by the list endpoint. Read-mostly on the client;
/// the only mutation is whole-snapshot replacement in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub upload_date: String,
    /// Absent or null is treated as zero bytes.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub file_size: u64,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub content_summary: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub file_icon: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Document {
    /// Seconds since epoch for date ordering; unparseable dates sort as 0.
    pub fn upload_timestamp(&self) -> i64 {
        parse_upload_date(&self.upload_date).timestamp()
    }
}

/// The server stores file sizes as either numbers or strings ("1024", "").
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Num(n) => n,
        Raw::Text(s) => s.trim().parse().unwrap_or(0),
        Raw::Null => 0,
    })
}

#[derive(Debug, Deserialize)]
pub struct DocumentListResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Upload & status ─────────────────────────────────────────────────────────

/// Processing status of an uploaded item. `TimedOut` is client-assigned when
/// the polling horizon expires; the server never sends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
    TimedOut,
    Unknown,
}

impl<'de> Deserialize<'de> for UploadStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        // Unrecognized status strings map to Unknown rather than failing the
        // whole response.
        Ok(match raw.as_str() {
            "uploaded" => Self::Uploaded,
            "processing" | "pending" => Self::Processing,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        })
    }
}

impl UploadStatus {
    /// Terminal states end polling; no further transition occurs.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::TimedOut)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed out",
            Self::Unknown => "unknown",
        }
    }
}

/// One entry of the upload receipt.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedDocument {
    pub id: String,
    pub name: String,
    pub status: UploadStatus,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub documents: Vec<UploadedDocument>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Per-item status report from the status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReport {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub status: UploadStatus,
    #[serde(default)]
    pub category: Option<String>,
}

// ── Download ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadTarget {
    pub download_url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub is_text_only: bool,
}

// ── Search ──────────────────────────────────────────────────────────────────

/// A remote search hit. The server reports relevance through either
/// `similarity_percentage` or a fractional `relevance_score` depending on
/// which backend answered; `relevance_percent` applies the precedence.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub similarity_percentage: Option<f64>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
}

impl SearchHit {
    /// `similarity_percentage` wins when present; otherwise the fractional
    /// score is scaled to a percentage. Absent both, zero.
    pub fn relevance_percent(&self) -> u8 {
        let pct = self
            .similarity_percentage
            .or_else(|| self.relevance_score.map(|s| s * 100.0))
            .unwrap_or(0.0);
        pct.round().clamp(0.0, 100.0) as u8
    }

    /// Category suitable for display, hiding the server's "Unknown" filler.
    pub fn display_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != "Unknown")
    }
}

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub min_similarity: f64,
    pub max_results: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Folder structure ────────────────────────────────────────────────────────

/// Per-category stats for the folder overview.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub file_types: BTreeMap<String, u64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FolderStructureResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub folder_structure: BTreeMap<String, FolderInfo>,
    #[serde(default)]
    pub total_documents: u64,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Recent views ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RecentView {
    pub id: String,
    pub document_id: String,
    pub document_title: String,
    #[serde(default)]
    pub document_category: Option<String>,
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub time_ago: String,
    #[serde(default)]
    pub file_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecentViewsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub recent_views: Vec<RecentView>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClearRecentViewsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub deleted_count: u64,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Generic mutation envelope ───────────────────────────────────────────────

/// Shape of delete-style responses: `{status, message?, error?}`.
#[derive(Debug, Deserialize)]
pub struct MutationResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lenient_file_size() {
        let doc: Document = serde_json::from_str(
            r#"{"id":"a","title":"T","upload_date":"2024-01-01","file_size":"2048"}"#,
        )
        .unwrap();
        assert_eq!(doc.file_size, 2048);

        let doc: Document =
            serde_json::from_str(r#"{"id":"a","title":"T","file_size":null}"#).unwrap();
        assert_eq!(doc.file_size, 0);

        let doc: Document = serde_json::from_str(r#"{"id":"a","title":"T"}"#).unwrap();
        assert_eq!(doc.file_size, 0);
    }

    #[test]
    fn test_document_name_alias() {
        let doc: Document = serde_json::from_str(r#"{"id":"a","name":"Report.pdf"}"#).unwrap();
        assert_eq!(doc.title, "Report.pdf");
    }

    #[test]
    fn test_upload_status_parsing() {
        let s: UploadStatus = serde_json::from_str(r#""processing""#).unwrap();
        assert_eq!(s, UploadStatus::Processing);
        let s: UploadStatus = serde_json::from_str(r#""something_new""#).unwrap();
        assert_eq!(s, UploadStatus::Unknown);
    }

    #[test]
    fn test_upload_status_terminal() {
        assert!(UploadStatus::Completed.is_terminal());
        assert!(UploadStatus::Failed.is_terminal());
        assert!(UploadStatus::TimedOut.is_terminal());
        assert!(!UploadStatus::Uploaded.is_terminal());
        assert!(!UploadStatus::Processing.is_terminal());
    }

    #[test]
    fn test_search_hit_relevance_precedence() {
        let hit: SearchHit = serde_json::from_str(
            r#"{"id":"a","title":"T","similarity_percentage":87.4,"relevance_score":0.2}"#,
        )
        .unwrap();
        assert_eq!(hit.relevance_percent(), 87);

        let hit: SearchHit =
            serde_json::from_str(r#"{"id":"a","title":"T","relevance_score":0.655}"#).unwrap();
        assert_eq!(hit.relevance_percent(), 66);

        let hit: SearchHit = serde_json::from_str(r#"{"id":"a","title":"T"}"#).unwrap();
        assert_eq!(hit.relevance_percent(), 0);
    }

    #[test]
    fn test_search_hit_display_category() {
        let hit: SearchHit =
            serde_json::from_str(r#"{"id":"a","title":"T","category":"Unknown"}"#).unwrap();
        assert!(hit.display_category().is_none());

        let hit: SearchHit =
            serde_json::from_str(r#"{"id":"a","title":"T","category":"others"}"#).unwrap();
        assert_eq!(hit.display_category(), Some("others"));
    }

    #[test]
    fn test_folder_structure_response() {
        let raw = r##"{
            "status": "success",
            "folder_structure": {
                "others": {
                    "name": "Others",
                    "total_files": 3,
                    "file_types": {"pdf": 2, "image": 1},
                    "color": "#6c757d"
                }
            },
            "total_documents": 3
        }"##;
        let resp: FolderStructureResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.folder_structure["others"].total_files, 3);
        assert_eq!(resp.folder_structure["others"].file_types["pdf"], 2);
    }
}
