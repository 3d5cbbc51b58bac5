use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, CartView, UpdateQuantityRequest},
        catalog::CatalogList,
        orders::{CheckoutRequest, CheckoutResult, PickupLocations},
    },
    models::{CartLine, CartSummary, CatalogItem, ItemType, OrderLine, OrderResponse},
    response::{ApiResponse, Meta},
    routes::{cart, catalog, checkout, health},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        catalog::list_food,
        catalog::list_merch,
        cart::cart_view,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
        cart::cart_events,
        checkout::pickup_locations,
        checkout::checkout
    ),
    components(
        schemas(
            ItemType,
            CatalogItem,
            CartLine,
            CartSummary,
            OrderLine,
            OrderResponse,
            AddToCartRequest,
            UpdateQuantityRequest,
            CartView,
            CatalogList,
            CheckoutRequest,
            CheckoutResult,
            PickupLocations,
            Meta,
            ApiResponse<CartView>,
            ApiResponse<CatalogList>,
            ApiResponse<PickupLocations>,
            ApiResponse<CheckoutResult>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Food and merchandise catalogs"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Checkout", description = "Checkout endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
