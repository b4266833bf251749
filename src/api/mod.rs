//! API handlers for Rolloff REST endpoints

pub mod health;
pub mod inventory;
pub mod items;
pub mod openapi;
pub mod rentals;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// Response header telling whether a mutation reached the store
pub const PERSISTED_HEADER: &str = "x-persisted";

pub(crate) fn persisted_header(persisted: bool) -> [(&'static str, &'static str); 1] {
    [(PERSISTED_HEADER, if persisted { "true" } else { "false" })]
}

/// `{success: true, data, persisted?}` envelope used by the action endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    /// Present on mutations only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
}

impl<T> ApiResponse<T> {
    pub fn read(data: T) -> Self {
        Self {
            success: true,
            data,
            persisted: None,
        }
    }

    pub fn written(data: T, persisted: bool) -> Self {
        Self {
            success: true,
            data,
            persisted: Some(persisted),
        }
    }
}

/// JSON body extractor that reports malformed bodies as 400 in the error envelope
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// Query string extractor with the same error envelope
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(ApiQuery(value))
    }
}

/// Turn a handler panic into a generic 500 in the error envelope
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(detail).into_response()
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Items
        .route("/items", get(items::list_items).post(items::create_item))
        .route(
            "/items/:id",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        // Rentals
        .route("/items/:id/return", post(rentals::return_dumpster))
        .route("/rentals", post(rentals::rent_dumpster))
        .route("/availability/:size", get(rentals::check_availability))
        .route("/status", get(rentals::inventory_status))
        .with_state(state.clone());

    // Action-style endpoint kept for existing page scripts
    let inventory_api = Router::new()
        .route(
            "/api/inventory",
            get(inventory::query_action).post(inventory::mutate_action),
        )
        .route("/api/inventory/debug", get(inventory::debug))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(inventory_api)
        .merge(openapi::create_openapi_router())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
