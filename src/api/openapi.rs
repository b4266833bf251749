//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, inventory, items, rentals};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rolloff API",
        version = "0.1.0",
        description = "Dumpster inventory and rental tracker REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Items
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item,
        // Rentals
        rentals::check_availability,
        rentals::rent_dumpster,
        rentals::return_dumpster,
        rentals::inventory_status,
        // Action endpoint
        inventory::query_action,
        inventory::mutate_action,
        inventory::debug,
    ),
    components(
        schemas(
            // Items
            crate::models::inventory::InventoryItem,
            crate::models::inventory::ItemStatus,
            crate::models::inventory::NewItem,
            crate::models::inventory::ItemPatch,
            crate::models::inventory::ItemQuery,
            // Rentals
            crate::models::inventory::Availability,
            crate::models::inventory::InventoryStatus,
            rentals::RentRequest,
            rentals::ReturnResponse,
            // Action endpoint
            inventory::ActionRequest,
            inventory::DebugResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "items", description = "Inventory item management"),
        (name = "rentals", description = "Rentals, returns and availability"),
        (name = "inventory", description = "Action-style inventory endpoint")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
