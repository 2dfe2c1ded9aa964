//! List endpoints.
//!
//! Each handler turns one request into one sequencer command tagged with the
//! request's trace ID, then maps the reply (or error) to a response.

use crate::{WebResult, error::AppError, extractors::RequestTrace, state::AppState};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use listkeeper_core::{Item, ItemId, ItemPatch, NewItem, TraceId};
use listkeeper_runtime::SequencerHandle;
use serde::{Deserialize, Serialize};

/// Body of `POST /create`
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    /// Item name; must not be blank
    #[serde(default, alias = "Name")]
    pub name: String,
    /// Due date in `DD-MM-YYYY` form
    #[serde(default, alias = "Due")]
    pub due: String,
}

/// Body of `PATCH /update`
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    /// Item to update
    #[serde(default, alias = "ID")]
    pub id: Option<ItemId>,
    /// New name
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    /// New due date
    #[serde(default, alias = "Due")]
    pub due: Option<String>,
    /// New completion flag
    #[serde(default, alias = "Completed")]
    pub completed: Option<bool>,
}

/// Query of `DELETE /delete`
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    /// Raw `id` parameter, parsed by the handler
    pub id: Option<String>,
}

/// Response carrying one item
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    /// Always `"success"`
    pub status: &'static str,
    /// The stored item
    pub item: Item,
}

/// Response of `DELETE /delete`
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    /// Always `"success"`
    pub status: &'static str,
    /// ID of the removed item
    pub id: ItemId,
}

/// Response without a payload
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always `"success"`
    pub status: &'static str,
}

const SUCCESS: &str = "success";

fn sequencer(state: &AppState, trace_id: TraceId) -> SequencerHandle {
    state.sequencer.clone().with_trace(trace_id)
}

/// Return every item.
///
/// # Endpoint
///
/// ```text
/// GET /get
/// ```
///
/// # Errors
///
/// Returns 503 once the list is shutting down, or 408 on timeout.
pub async fn list_items(
    State(state): State<AppState>,
    RequestTrace(trace_id): RequestTrace,
) -> WebResult<Json<Vec<Item>>> {
    let items = sequencer(&state, trace_id).get().await?;
    tracing::debug!(count = items.len(), "Listed items");
    Ok(Json(items))
}

/// Create an item.
///
/// # Endpoint
///
/// ```text
/// POST /create
/// {"name": "Buy milk", "due": "01-01-2025"}
/// ```
///
/// # Errors
///
/// Returns 400 for a blank name or malformed due date.
pub async fn create_item(
    State(state): State<AppState>,
    RequestTrace(trace_id): RequestTrace,
    Json(request): Json<CreateItemRequest>,
) -> WebResult<(StatusCode, Json<ItemResponse>)> {
    let new_item = NewItem::new(request.name, request.due)?;

    let item = sequencer(&state, trace_id).add(new_item).await?;
    tracing::info!(id = %item.id, name = %item.name, due = %item.due, "Item created");

    Ok((
        StatusCode::CREATED,
        Json(ItemResponse {
            status: SUCCESS,
            item,
        }),
    ))
}

/// Update some fields of an item.
///
/// # Endpoint
///
/// ```text
/// PATCH /update
/// {"id": 1, "completed": true}
/// ```
///
/// # Errors
///
/// Returns 400 for a missing id or invalid fields, 404 for an unknown id.
pub async fn update_item(
    State(state): State<AppState>,
    RequestTrace(trace_id): RequestTrace,
    Json(request): Json<UpdateItemRequest>,
) -> WebResult<Json<ItemResponse>> {
    let id = request
        .id
        .ok_or_else(|| AppError::bad_request("missing id"))?;
    let patch = ItemPatch {
        name: request.name,
        due: request.due,
        completed: request.completed,
    };
    patch.validate()?;

    let item = sequencer(&state, trace_id).update(id, patch).await?;
    tracing::info!(id = %item.id, completed = item.completed, "Item updated");

    Ok(Json(ItemResponse {
        status: SUCCESS,
        item,
    }))
}

/// Delete an item.
///
/// # Endpoint
///
/// ```text
/// DELETE /delete?id=1
/// ```
///
/// # Errors
///
/// Returns 400 for a missing or non-numeric id, 404 for an unknown id.
pub async fn delete_item(
    State(state): State<AppState>,
    RequestTrace(trace_id): RequestTrace,
    Query(query): Query<DeleteQuery>,
) -> WebResult<Json<DeletedResponse>> {
    let raw = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("missing id parameter"))?;
    let id: ItemId = raw
        .parse()
        .map_err(|_| AppError::bad_request(format!("invalid id {raw:?}")))?;

    let id = sequencer(&state, trace_id).remove(id).await?;
    tracing::info!(%id, "Item deleted");

    Ok(Json(DeletedResponse {
        status: SUCCESS,
        id,
    }))
}

/// Persist the list.
///
/// # Endpoint
///
/// ```text
/// POST /save
/// ```
///
/// # Errors
///
/// Returns 500 if the list cannot be written.
pub async fn save_items(
    State(state): State<AppState>,
    RequestTrace(trace_id): RequestTrace,
) -> WebResult<Json<StatusResponse>> {
    sequencer(&state, trace_id).save().await?;
    tracing::info!("List saved");
    Ok(Json(StatusResponse { status: SUCCESS }))
}
