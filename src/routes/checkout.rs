use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    audit::log_audit,
    dto::orders::{CheckoutRequest, CheckoutResult, PickupLocations},
    error::AppResult,
    response::{ApiResponse, Meta},
    services::checkout_service::CheckoutError,
    session::SessionContext,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout))
        .route("/pickup-locations", get(pickup_locations))
}

#[utoipa::path(
    get,
    path = "/api/checkout/pickup-locations",
    responses(
        (status = 200, description = "Pickup locations, first one is the default", body = ApiResponse<PickupLocations>),
        (status = 503, description = "Park API unreachable"),
    ),
    tag = "Checkout"
)]
pub async fn pickup_locations(
    State(state): State<AppState>,
    session: SessionContext,
) -> AppResult<Json<ApiResponse<PickupLocations>>> {
    let locations = state.api.pickup_locations(&session).await?;
    let meta = Meta::total(locations.len() as u64);
    let data = PickupLocations {
        default: locations.first().cloned(),
        locations,
    };
    Ok(Json(ApiResponse::success("OK", data, Some(meta))))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order placed, cart cleared", body = ApiResponse<CheckoutResult>),
        (status = 400, description = "Empty cart, no pickup location or order rejected"),
        (status = 401, description = "Not signed in"),
        (status = 409, description = "A checkout for this cart is already in flight"),
        (status = 502, description = "Park API failed"),
        (status = 503, description = "Park API unreachable"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn checkout(
    State(state): State<AppState>,
    session: SessionContext,
    payload: Option<Json<CheckoutRequest>>,
) -> AppResult<Json<ApiResponse<CheckoutResult>>> {
    let Some(subject) = session.current_user().map(|user| user.subject.clone()) else {
        return Err(CheckoutError::NotSignedIn.into());
    };
    let Json(payload) = payload.unwrap_or_default();

    let cart = state.carts.cart_for(&subject);
    let placed = state
        .checkout
        .place_order(&cart, &session, payload.into())
        .await?;

    log_audit(
        Some(subject.as_str()),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": placed.order.id })),
    );

    Ok(Json(ApiResponse::success(
        placed.message,
        CheckoutResult {
            order: placed.order,
        },
        Some(Meta::empty()),
    )))
}
