//! HTTP client for the document-management service.
//!
//! One `ApiClient` per app, shared behind an `Arc`. The client harvests the
//! server's `csrftoken` cookie from every response and echoes it as the
//! `X-CSRFToken` header on state-mutating requests (delete, upload, search),
//! mirroring what the service's own web front end does.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use reqwest::header::SET_COOKIE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use super::error::{ApiError, Result};
use super::types::{
    ClearRecentViewsResponse, Document, DocumentListResponse, DownloadTarget,
    FolderInfo, FolderStructureResponse, MutationResponse, RecentView,
    RecentViewsResponse, SearchHit, SearchRequest, SearchResponse, StatusReport,
    UploadResponse,
};
use crate::core::validate::mime_for_path;

/// Header carrying the CSRF token on mutating requests.
const CSRF_HEADER: &str = "X-CSRFToken";

/// Cookie name the server issues the token under.
const CSRF_COOKIE: &str = "csrftoken";

pub struct ApiClient {
    http: Client,
    base_url: String,
    /// Last CSRF token seen in a `Set-Cookie` response header.
    csrf: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf: RwLock::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the CSRF header if a token has been captured.
    fn with_csrf(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.csrf.read().ok().and_then(|guard| guard.clone());
        match token {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        }
    }

    /// Capture a fresh CSRF token from `Set-Cookie` headers, if present.
    fn remember_csrf(&self, response: &Response) {
        for value in response.headers().get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            if let Some(token) = cookie_value(raw, CSRF_COOKIE) {
                if let Ok(mut guard) = self.csrf.write() {
                    *guard = Some(token);
                }
            }
        }
    }

    /// Turn a non-2xx response into an error, preferring the server's own
    /// `{error}` message over the bare status line.
    async fn fail(response: Response) -> ApiError {
        let status = response.status();
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        ApiError::server(status.as_u16(), message)
    }

    /// Reject a 200 whose envelope reports failure.
    fn check_envelope(status_field: &str, error: Option<String>) -> Result<()> {
        if status_field == "success" {
            Ok(())
        } else {
            Err(ApiError::server(
                200,
                error.unwrap_or_else(|| format!("server reported status {status_field:?}")),
            ))
        }
    }

    // ── Documents ───────────────────────────────────────────────────────

    /// Full document listing, optionally restricted to one category.
    pub async fn list_documents(&self, category: Option<&str>) -> Result<Vec<Document>> {
        let mut request = self.http.get(self.endpoint("/api/documents/"));
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }

        let response = request.send().await?;
        self.remember_csrf(&response);
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }

        let body: DocumentListResponse = response.json().await?;
        Self::check_envelope(&body.status, body.error)?;
        Ok(body.documents)
    }

    /// Processing status of a single uploaded document.
    pub async fn document_status(&self, id: &str) -> Result<StatusReport> {
        let response = self
            .http
            .get(self.endpoint(&format!("/api/document-status/{id}/")))
            .send()
            .await?;
        self.remember_csrf(&response);
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(response.json().await?)
    }

    /// Resolve a download target for a document. No store mutation happens
    /// here; the caller opens the returned URL.
    pub async fn download_document(&self, id: &str) -> Result<DownloadTarget> {
        let response = self
            .http
            .get(self.endpoint("/api/documents/download/"))
            .query(&[("id", id)])
            .send()
            .await?;
        self.remember_csrf(&response);
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        Ok(response.json().await?)
    }

    /// Delete a document server-side. Callers remove the entry from their
    /// store only after this returns `Ok`.
    pub async fn delete_document(&self, id: &str) -> Result<()> {
        let request = self
            .http
            .delete(self.endpoint("/api/documents/delete/"))
            .json(&serde_json::json!({ "document_id": id }));

        let response = self.with_csrf(request).send().await?;
        self.remember_csrf(&response);
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }

        let body: MutationResponse = response.json().await?;
        Self::check_envelope(&body.status, body.error)
    }

    // ── Search ──────────────────────────────────────────────────────────

    /// Server-side semantic search.
    pub async fn search(
        &self,
        query: &str,
        min_similarity: f64,
        max_results: usize,
    ) -> Result<Vec<SearchHit>> {
        let request = self.http.post(self.endpoint("/api/ai-search/")).json(
            &SearchRequest {
                query,
                min_similarity,
                max_results,
            },
        );

        let response = self.with_csrf(request).send().await?;
        self.remember_csrf(&response);
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }

        let body: SearchResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(ApiError::server(200, error));
        }
        Ok(body.results)
    }

    // ── Upload ──────────────────────────────────────────────────────────

    /// Multipart upload of an already-validated batch.
    pub async fn upload_files(&self, paths: &[PathBuf]) -> Result<UploadResponse> {
        let mut form = Form::new();
        for path in paths {
            form = form.part("files", file_part(path).await?);
        }

        let request = self
            .http
            .post(self.endpoint("/api/upload-files/"))
            .multipart(form);

        let response = self.with_csrf(request).send().await?;
        self.remember_csrf(&response);
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }

        let body: UploadResponse = response.json().await?;
        Self::check_envelope(&body.status, body.error.clone())?;
        Ok(body)
    }

    // ── Folders ─────────────────────────────────────────────────────────

    /// Category folder overview with per-type file counts.
    pub async fn folder_structure(&self) -> Result<(BTreeMap<String, FolderInfo>, u64)> {
        let response = self
            .http
            .get(self.endpoint("/api/folder-structure/"))
            .send()
            .await?;
        self.remember_csrf(&response);
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }

        let body: FolderStructureResponse = response.json().await?;
        Self::check_envelope(&body.status, body.error)?;
        Ok((body.folder_structure, body.total_documents))
    }

    // ── Recent views ────────────────────────────────────────────────────

    /// Recent document activity for the current session.
    pub async fn recent_views(&self, limit: usize) -> Result<Vec<RecentView>> {
        let response = self
            .http
            .get(self.endpoint("/api/recent-views/"))
            .query(&[("limit", limit.to_string().as_str()), ("user_session_only", "true")])
            .send()
            .await?;
        self.remember_csrf(&response);
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }

        let body: RecentViewsResponse = response.json().await?;
        Self::check_envelope(&body.status, body.error)?;
        Ok(body.recent_views)
    }

    /// Clear recent views; returns how many entries the server dropped.
    pub async fn clear_recent_views(&self) -> Result<u64> {
        let request = self
            .http
            .delete(self.endpoint("/api/recent-views/clear/"))
            .query(&[("user_session_only", "true")]);

        let response = self.with_csrf(request).send().await?;
        self.remember_csrf(&response);
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }

        let body: ClearRecentViewsResponse = response.json().await?;
        Self::check_envelope(&body.status, body.error)?;
        Ok(body.deleted_count)
    }
}

/// Build a multipart part from a file on disk.
async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    Ok(Part::bytes(bytes)
        .file_name(name)
        .mime_str(mime_for_path(path))?)
}

/// Extract a cookie value from one `Set-Cookie` header line.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    let first = header.split(';').next()?.trim();
    let (cookie_name, value) = first.split_once('=')?;
    if cookie_name.trim() == name && !value.is_empty() {
        Some(value.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value_basic() {
        assert_eq!(
            cookie_value("csrftoken=abc123; Path=/; SameSite=Lax", "csrftoken"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_cookie_value_wrong_name() {
        assert_eq!(cookie_value("sessionid=xyz; Path=/", "csrftoken"), None);
    }

    #[test]
    fn test_cookie_value_empty() {
        assert_eq!(cookie_value("csrftoken=; Path=/", "csrftoken"), None);
        assert_eq!(cookie_value("", "csrftoken"), None);
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint("/api/documents/"),
            "http://localhost:8000/api/documents/"
        );
    }

    #[test]
    fn test_check_envelope() {
        assert!(ApiClient::check_envelope("success", None).is_ok());
        let err = ApiClient::check_envelope("error", Some("nope".into())).unwrap_err();
        assert!(err.to_string().contains("nope"));
        let err = ApiClient::check_envelope("partial", None).unwrap_err();
        assert!(err.to_string().contains("partial"));
    }
}
