//! Inventory item endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::inventory::{InventoryItem, ItemPatch, ItemQuery, ItemStatus, NewItem},
};

use super::{persisted_header, ApiJson, ApiQuery};

/// List items, optionally filtered by status, size and search text
#[utoipa::path(
    get,
    path = "/api/v1/items",
    tag = "items",
    params(ItemQuery),
    responses(
        (status = 200, description = "Matching items in fleet order", body = Vec<InventoryItem>),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<ItemQuery>,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let inventory = &state.services.inventory;

    let status = query
        .status
        .as_deref()
        .map(str::parse::<ItemStatus>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let mut items = match (status, query.size.as_deref()) {
        (Some(status), _) => inventory.items_by_status(status).await,
        (None, Some(size)) => inventory.items_by_size(size).await,
        (None, None) => inventory.get_all_items().await,
    };

    if let Some(size) = query.size.as_deref() {
        items.retain(|i| i.size == size);
    }
    if let Some(q) = query.q.as_deref() {
        let needle = q.to_lowercase();
        items.retain(|i| i.matches(&needle));
    }

    Ok(Json(items))
}

/// Get item by ID
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    tag = "items",
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item details", body = InventoryItem),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<InventoryItem>> {
    state
        .services
        .inventory
        .get_item(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))
}

/// Create item
#[utoipa::path(
    post,
    path = "/api/v1/items",
    tag = "items",
    request_body = NewItem,
    responses(
        (status = 201, description = "Item created", body = InventoryItem),
        (status = 400, description = "Invalid item", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    ApiJson(data): ApiJson<NewItem>,
) -> AppResult<impl IntoResponse> {
    data.validate()?;
    let saved = state.services.inventory.add_item(data).await?;
    Ok((
        StatusCode::CREATED,
        persisted_header(saved.is_persisted()),
        Json(saved.into_inner()),
    ))
}

/// Update item
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    tag = "items",
    params(("id" = String, Path, description = "Item ID")),
    request_body = ItemPatch,
    responses(
        (status = 200, description = "Item updated", body = InventoryItem),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Status change not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ItemPatch>,
) -> AppResult<impl IntoResponse> {
    patch.validate()?;
    let saved = state.services.inventory.update_item(&id, patch).await?;
    let persisted = saved.is_persisted();
    let item = saved
        .into_inner()
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))?;
    Ok((persisted_header(persisted), Json(item)))
}

/// Delete item
#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    tag = "items",
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_item(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let saved = state.services.inventory.delete_item(&id).await;
    if !saved.value {
        return Err(AppError::NotFound(format!("Item {} not found", id)));
    }
    Ok((StatusCode::NO_CONTENT, persisted_header(saved.is_persisted())))
}
