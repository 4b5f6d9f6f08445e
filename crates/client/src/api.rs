//! HTTP client for the notes API.
//!
//! [`NotesApi`] is the seam the controller talks through; [`HttpNotesApi`]
//! implements it with [`reqwest`] against a running server.

use async_trait::async_trait;
use leafnote_core::share_token;
use leafnote_core::types::DbId;
use leafnote_db::models::folder::{CreateFolder, FolderWithCount, UpdateFolder};
use leafnote_db::models::note::{
    CreateNote, NoteFilter, NoteWithFolder, ShareTokenResponse, SharedNote, UpdateNote,
};
use reqwest::StatusCode;

/// Errors from the notes API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server returned another non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Every operation the notes server exposes.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn list_folders(&self) -> ClientResult<Vec<FolderWithCount>>;
    async fn create_folder(&self, input: &CreateFolder) -> ClientResult<FolderWithCount>;
    async fn rename_folder(&self, id: DbId, input: &UpdateFolder) -> ClientResult<FolderWithCount>;
    async fn delete_folder(&self, id: DbId) -> ClientResult<()>;

    async fn list_notes(&self, filter: &NoteFilter) -> ClientResult<Vec<NoteWithFolder>>;
    async fn get_note(&self, id: DbId) -> ClientResult<NoteWithFolder>;
    async fn create_note(&self, input: &CreateNote) -> ClientResult<NoteWithFolder>;
    async fn update_note(&self, id: DbId, input: &UpdateNote) -> ClientResult<NoteWithFolder>;
    async fn delete_note(&self, id: DbId) -> ClientResult<()>;

    async fn issue_share_token(&self, id: DbId) -> ClientResult<String>;
    async fn revoke_share_token(&self, id: DbId) -> ClientResult<()>;
    async fn resolve_shared_note(&self, token: &str) -> ClientResult<SharedNote>;
}

/// [`NotesApi`] over HTTP.
pub struct HttpNotesApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotesApi {
    /// * `base_url` - Server origin without the `/api` prefix, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] and its connection pool.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    // ---- private helpers ----

    /// Map a non-success status to [`ClientError`], keeping the body text.
    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(body));
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> ClientResult<()> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list_folders(&self) -> ClientResult<Vec<FolderWithCount>> {
        let response = self.client.get(self.url("/folders")).send().await?;
        Self::parse_response(response).await
    }

    async fn create_folder(&self, input: &CreateFolder) -> ClientResult<FolderWithCount> {
        let response = self
            .client
            .post(self.url("/folders"))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn rename_folder(&self, id: DbId, input: &UpdateFolder) -> ClientResult<FolderWithCount> {
        let response = self
            .client
            .patch(self.url(&format!("/folders/{id}")))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete_folder(&self, id: DbId) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/folders/{id}")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn list_notes(&self, filter: &NoteFilter) -> ClientResult<Vec<NoteWithFolder>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(search) = &filter.search {
            query.push(("search", search.clone()));
        }
        if let Some(folder_id) = filter.folder_id {
            query.push(("folderId", folder_id.to_string()));
        }

        let response = self
            .client
            .get(self.url("/notes"))
            .query(&query)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn get_note(&self, id: DbId) -> ClientResult<NoteWithFolder> {
        let response = self
            .client
            .get(self.url(&format!("/notes/{id}")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn create_note(&self, input: &CreateNote) -> ClientResult<NoteWithFolder> {
        let response = self
            .client
            .post(self.url("/notes"))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update_note(&self, id: DbId, input: &UpdateNote) -> ClientResult<NoteWithFolder> {
        let response = self
            .client
            .patch(self.url(&format!("/notes/{id}")))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete_note(&self, id: DbId) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/notes/{id}")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn issue_share_token(&self, id: DbId) -> ClientResult<String> {
        let response = self
            .client
            .post(self.url(&format!("/notes/{id}/share")))
            .send()
            .await?;
        let issued: ShareTokenResponse = Self::parse_response(response).await?;
        Ok(issued.share_token)
    }

    async fn revoke_share_token(&self, id: DbId) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/notes/{id}/share")))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn resolve_shared_note(&self, token: &str) -> ClientResult<SharedNote> {
        // Anything else could rewrite the request path.
        if !share_token::is_well_formed(token) {
            return Err(ClientError::NotFound(token.to_string()));
        }
        let response = self
            .client
            .get(self.url(&format!("/shared/{token}")))
            .send()
            .await?;
        Self::parse_response(response).await
    }
}
