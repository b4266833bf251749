//! Rental management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::inventory::{Availability, InventoryItem, InventoryStatus},
};

use super::{persisted_header, ApiJson};

/// Rent-by-size request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentRequest {
    /// Size class wanted, e.g. "20"
    #[validate(length(min = 1, message = "Size is required"))]
    pub size: String,
    #[validate(length(min = 1, message = "Customer ID is required"))]
    pub customer_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Return response with the item back in service
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    pub item: InventoryItem,
}

/// Check whether a size is free, with alternatives when it is not
#[utoipa::path(
    get,
    path = "/api/v1/availability/{size}",
    tag = "rentals",
    params(("size" = String, Path, description = "Size class")),
    responses(
        (status = 200, description = "Availability for the size", body = Availability)
    )
)]
pub async fn check_availability(
    State(state): State<crate::AppState>,
    Path(size): Path<String>,
) -> Json<Availability> {
    Json(state.services.inventory.check_availability(&size).await)
}

/// Rent the first free dumpster of a size
#[utoipa::path(
    post,
    path = "/api/v1/rentals",
    tag = "rentals",
    request_body = RentRequest,
    responses(
        (status = 201, description = "Dumpster rented", body = InventoryItem),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "No dumpster of that size available", body = crate::error::ErrorResponse)
    )
)]
pub async fn rent_dumpster(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<RentRequest>,
) -> AppResult<impl IntoResponse> {
    request.validate()?;
    if request.end_date < request.start_date {
        return Err(AppError::Validation(
            "endDate must not be before startDate".to_string(),
        ));
    }

    let saved = state
        .services
        .inventory
        .rent_dumpster(
            &request.size,
            &request.customer_id,
            request.start_date,
            request.end_date,
        )
        .await;
    let persisted = saved.is_persisted();
    let item = saved.into_inner().ok_or_else(|| {
        AppError::NotFound(format!("No {} yard dumpster available", request.size))
    })?;

    Ok((StatusCode::CREATED, persisted_header(persisted), Json(item)))
}

/// Return a rented dumpster
#[utoipa::path(
    post,
    path = "/api/v1/items/{id}/return",
    tag = "rentals",
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Dumpster returned", body = ReturnResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Item is not rented", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_dumpster(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let inventory = &state.services.inventory;
    let saved = inventory.return_dumpster(&id).await;
    let persisted = saved.is_persisted();

    if let Some(item) = saved.into_inner() {
        return Ok((
            persisted_header(persisted),
            Json(ReturnResponse {
                status: "returned".to_string(),
                item,
            }),
        ));
    }

    // Nothing changed; tell an unknown id apart from a unit that is not out
    match inventory.get_item(&id).await {
        Some(item) => Err(AppError::Conflict(format!(
            "Item {} is not rented (status is {})",
            id, item.status
        ))),
        None => Err(AppError::NotFound(format!("Item {} not found", id))),
    }
}

/// Fleet-wide counts and utilization
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "rentals",
    responses(
        (status = 200, description = "Inventory status", body = InventoryStatus)
    )
)]
pub async fn inventory_status(State(state): State<crate::AppState>) -> Json<InventoryStatus> {
    Json(state.services.inventory.inventory_status().await)
}
