//! Contentlet HTTP Routes
//!
//! - `GET /contentlets/all`: every stored document as a JSON array
//! - `PUT /contentlets`: save; 201 on create, 200 on update
//! - `DELETE /contentlets/:id`: 200, including for unknown ids

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use futures_util::TryStreamExt;

use super::errors::ApiResult;
use crate::document::Document;
use crate::service::DocumentService;

/// Shared state for contentlet routes
pub struct ContentletState {
    pub service: Arc<DocumentService>,
}

impl ContentletState {
    pub fn new(service: Arc<DocumentService>) -> Self {
        Self { service }
    }
}

pub fn contentlet_routes(state: Arc<ContentletState>) -> Router {
    Router::new()
        .route("/", put(save_handler))
        .route("/all", get(list_all_handler))
        .route("/:id", delete(delete_handler))
        .with_state(state)
}

async fn list_all_handler(State(state): State<Arc<ContentletState>>) -> ApiResult<Json<Vec<Document>>> {
    let documents: Vec<Document> = state.service.list_all().try_collect().await?;
    Ok(Json(documents))
}

async fn save_handler(
    State(state): State<Arc<ContentletState>>,
    Json(document): Json<Document>,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let (saved, is_new) = state.service.save(document).await?.into_parts();
    let status = if is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(saved)))
}

async fn delete_handler(
    State(state): State<Arc<ContentletState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.service.delete_by_id(&id).await?;
    Ok(StatusCode::OK)
}
