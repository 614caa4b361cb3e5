use chrono::{DateTime, Utc};
use clipvault_service::SnippetView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnippetRequest {
    pub content: String,
    #[serde(default)]
    pub source_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetResponse {
    pub id: i64,
    pub content: String,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SnippetView> for SnippetResponse {
    fn from(view: SnippetView) -> Self {
        Self {
            id: view.id.0,
            content: view.content,
            source_url: view.source_url,
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }
}
