use axum::extract::{Extension, Query};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{DeleteResponse, ListResponse, MetadataResponse, SaveResponse};
use crate::scope_path;
use crate::services::metadata_service::MetadataOutcome;
use crate::services::{media_service, metadata_service};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub subdir: String,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct MetadataQuery {
    pub filename: String,
    pub key: Option<String>,
}

pub fn router(config: Arc<Config>) -> Router {
    // raw file bytes are served straight off the root by tower-http
    let media_files = ServeDir::new(&config.root);

    Router::new()
        .route("/media-list", get(media_list))
        .route("/delete", delete(delete_media))
        .route("/save", post(save_media))
        .route("/metadata", get(media_metadata))
        .nest_service("/media", media_files)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(config))
}

async fn media_list(
    Query(query): Query<ListQuery>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Json<ListResponse>, AppError> {
    let page = media_service::list_entries(&config, &query.subdir, query.offset, query.limit)?;
    info!(subdir = %query.subdir, total = page.total, "list media");
    Ok(Json(ListResponse {
        total: page.total,
        items: page.items,
        current_path: query.subdir,
    }))
}

async fn delete_media(
    Query(FileQuery { filename }): Query<FileQuery>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Json<DeleteResponse>, AppError> {
    let outcome = media_service::delete_file(&config, &filename)?;
    info!(%filename, preview_removed = outcome.preview_removed, "delete media");
    Ok(Json(DeleteResponse {
        message: format!("{filename} deleted"),
        preview_removed: outcome.preview_removed,
    }))
}

async fn save_media(
    Query(FileQuery { filename }): Query<FileQuery>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Json<SaveResponse>, AppError> {
    let outcome = media_service::save_copy(&config, &filename)?;
    info!(%filename, saved_path = %outcome.saved_path, "save media");
    Ok(Json(SaveResponse {
        message: format!("{filename} saved to {}", outcome.saved_path),
        saved_path: outcome.saved_path,
        preview_saved_path: outcome.preview_saved_path,
    }))
}

async fn media_metadata(
    Query(query): Query<MetadataQuery>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Json<MetadataResponse>, AppError> {
    let resolved = scope_path::resolve_within(&config.root, &query.filename)?;
    let target = scope_path::confirm_within(&config.root, &resolved)?;
    if !target.is_file() {
        return Err(AppError::NotFound);
    }

    let response = match metadata_service::lookup(&target, query.key.as_deref()) {
        MetadataOutcome::Found(value) => MetadataResponse {
            found: true,
            metadata: Some(value),
            message: None,
        },
        MetadataOutcome::NotFound(message) => MetadataResponse {
            found: false,
            metadata: None,
            message: Some(message),
        },
    };
    Ok(Json(response))
}
