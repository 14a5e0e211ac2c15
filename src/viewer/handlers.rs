//! HTTP handlers for the log API.

use axum::{
    extract::{rejection::FormRejection, Query, State},
    response::Html,
    Extension, Form,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::http::middleware::ClientIp;
use crate::http::response::ApiResponse;
use crate::observability::metrics;
use crate::viewer::page;
use crate::viewer::store::{LogEntry, LogStore, StoreError};

/// State shared by the log handlers.
#[derive(Clone)]
pub struct ViewerState {
    pub store: Arc<LogStore>,
    pub page_size: usize,
}

/// `name` parameter from a query string or form body.
#[derive(Debug, Default, Deserialize)]
pub struct NameParam {
    #[serde(default)]
    pub name: Option<String>,
}

impl NameParam {
    fn as_str(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

fn count_failure<T>(op: &'static str, result: Result<T, StoreError>) -> Result<T, StoreError> {
    if result.is_err() {
        metrics::record_file_operation(op, "error");
    }
    result
}

pub async fn index(State(state): State<ViewerState>) -> Html<String> {
    Html(page::render(state.page_size))
}

pub async fn list_files(
    State(state): State<ViewerState>,
) -> Result<ApiResponse<()>, StoreError> {
    let files = count_failure("list", state.store.list_files().await)?;
    Ok(ApiResponse::files(files))
}

pub async fn file_content(
    State(state): State<ViewerState>,
    Query(param): Query<NameParam>,
) -> Result<ApiResponse<Vec<LogEntry>>, StoreError> {
    let entries = count_failure("read", state.store.read_entries(param.as_str()).await)?;
    Ok(ApiResponse::ok(entries))
}

pub async fn clear_file(
    State(state): State<ViewerState>,
    client: Option<Extension<ClientIp>>,
    form: Result<Form<NameParam>, FormRejection>,
) -> Result<ApiResponse<()>, StoreError> {
    // A missing or unreadable body is an empty name; the store decides
    // whether that matters after checking the switch.
    let param = form.map(|Form(param)| param).unwrap_or_default();
    count_failure("clear", state.store.clear_file(param.as_str()).await)?;
    if let Some(Extension(ClientIp(ip))) = client {
        tracing::info!(client_ip = %ip, file = %param.as_str(), "Clear requested");
    }
    Ok(ApiResponse::empty())
}

pub async fn delete_all(
    State(state): State<ViewerState>,
    client: Option<Extension<ClientIp>>,
) -> Result<ApiResponse<()>, StoreError> {
    let removed = count_failure("delete", state.store.delete_all().await)?;
    if let Some(Extension(ClientIp(ip))) = client {
        tracing::info!(client_ip = %ip, removed, "Delete-all requested");
    }
    Ok(ApiResponse::empty())
}

pub async fn export_file(
    State(state): State<ViewerState>,
    Query(param): Query<NameParam>,
) -> Result<ApiResponse<String>, StoreError> {
    let content = count_failure("export", state.store.export_file(param.as_str()).await)?;
    Ok(ApiResponse::ok(content))
}

pub async fn health() -> ApiResponse<&'static str> {
    ApiResponse::ok("ok")
}
