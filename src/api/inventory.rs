//! Action-style inventory endpoint and diagnostic dump
//!
//! `GET /api/inventory?action=items|search&q=...` and
//! `POST /api/inventory {action: add|update|delete, ...}`, answering in the
//! `{success, data}` envelope.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::inventory::{InventoryItem, ItemPatch, NewItem},
};

use super::{ApiJson, ApiQuery, ApiResponse};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActionQuery {
    /// "items" or "search"
    pub action: Option<String>,
    /// Search text, required for action=search
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActionRequest {
    /// "add", "update" or "delete"
    pub action: Option<String>,
    /// Target item for update/delete
    pub id: Option<String>,
    /// New item for add
    pub item: Option<NewItem>,
    /// Fields to change for update
    pub updates: Option<ItemPatch>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DebugResponse {
    pub success: bool,
    pub count: usize,
    pub items: Vec<InventoryItem>,
    /// First item, if any
    pub sample: Option<InventoryItem>,
}

fn require<T>(value: Option<T>, name: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::BadRequest(format!("Missing required parameter: {}", name)))
}

/// Read actions
#[utoipa::path(
    get,
    path = "/api/inventory",
    tag = "inventory",
    params(ActionQuery),
    responses(
        (status = 200, description = "Items wrapped in {success, data}", body = Vec<InventoryItem>),
        (status = 400, description = "Missing or unknown action", body = crate::error::ErrorResponse)
    )
)]
pub async fn query_action(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<ActionQuery>,
) -> AppResult<Json<ApiResponse<Vec<InventoryItem>>>> {
    let inventory = &state.services.inventory;
    let action = require(query.action, "action")?;

    let items = match action.as_str() {
        "items" => inventory.get_all_items().await,
        "search" => {
            let q = require(query.q, "q")?;
            inventory.search_items(&q).await
        }
        other => return Err(AppError::BadRequest(format!("Unknown action: {}", other))),
    };

    Ok(Json(ApiResponse::read(items)))
}

/// Write actions
#[utoipa::path(
    post,
    path = "/api/inventory",
    tag = "inventory",
    request_body = ActionRequest,
    responses(
        (status = 200, description = "Result wrapped in {success, data, persisted}"),
        (status = 201, description = "Item added", body = InventoryItem),
        (status = 400, description = "Missing parameter or unknown action", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Status change not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn mutate_action(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<ActionRequest>,
) -> AppResult<Response> {
    let inventory = &state.services.inventory;
    let action = require(request.action, "action")?;

    let response = match action.as_str() {
        "add" => {
            let item = require(request.item, "item")?;
            item.validate()?;
            let saved = inventory.add_item(item).await?;
            let persisted = saved.is_persisted();
            (
                StatusCode::CREATED,
                Json(ApiResponse::written(saved.into_inner(), persisted)),
            )
                .into_response()
        }
        "update" => {
            let id = require(request.id, "id")?;
            let updates = require(request.updates, "updates")?;
            updates.validate()?;
            let saved = inventory.update_item(&id, updates).await?;
            let persisted = saved.is_persisted();
            let item = saved
                .into_inner()
                .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))?;
            Json(ApiResponse::written(item, persisted)).into_response()
        }
        "delete" => {
            let id = require(request.id, "id")?;
            let saved = inventory.delete_item(&id).await;
            if !saved.value {
                return Err(AppError::NotFound(format!("Item {} not found", id)));
            }
            Json(ApiResponse::written(json!({ "id": id }), saved.is_persisted())).into_response()
        }
        other => return Err(AppError::BadRequest(format!("Unknown action: {}", other))),
    };

    Ok(response)
}

/// Full item dump for manual checks
#[utoipa::path(
    get,
    path = "/api/inventory/debug",
    tag = "inventory",
    responses(
        (status = 200, description = "All items with count and a sample", body = DebugResponse)
    )
)]
pub async fn debug(State(state): State<crate::AppState>) -> Json<DebugResponse> {
    let items = state.services.inventory.get_all_items().await;
    tracing::debug!("Inventory debug dump: {} items", items.len());

    Json(DebugResponse {
        success: true,
        count: items.len(),
        sample: items.first().cloned(),
        items,
    })
}
