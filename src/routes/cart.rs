use axum::{
    Json, Router,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post, put},
};
use futures_util::{Stream, StreamExt, stream};

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, CartView, UpdateQuantityRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartLine, ItemType},
    response::{ApiResponse, Meta},
    services::catalog_service::resolve_cart_line,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_view).delete(clear_cart))
        .route("/items", post(add_to_cart))
        .route(
            "/items/{item_type}/{item_id}",
            put(update_quantity).delete(remove_from_cart),
        )
        .route("/events", get(cart_events))
}

fn parse_item_type(raw: &str) -> AppResult<ItemType> {
    raw.parse::<ItemType>().map_err(AppError::BadRequest)
}

fn cart_response(message: &str, items: Vec<CartLine>) -> Json<ApiResponse<CartView>> {
    let view = CartView::new(items);
    let meta = Meta::total(view.summary.total_items);
    Json(ApiResponse::success(message, view, Some(meta)))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current cart with totals", body = ApiResponse<CartView>),
        (status = 401, description = "Not signed in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_view(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = state.carts.cart_for(&auth.user.subject);
    Ok(cart_response("OK", cart.items()))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add item or increase its quantity", body = ApiResponse<CartView>),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Item not in catalog"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let quantity = payload.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    let quantity = u32::try_from(quantity)
        .map_err(|_| AppError::BadRequest("quantity is too large".to_string()))?;

    let line = resolve_cart_line(
        state.api.as_ref(),
        &auth.session,
        payload.item_type,
        payload.item_id,
    )
    .await?;

    let cart = state.carts.cart_for(&auth.user.subject);
    cart.add_item(line, quantity);

    log_audit(
        Some(auth.user.subject.as_str()),
        "cart_update",
        Some("cart"),
        Some(serde_json::json!({
            "item_id": payload.item_id,
            "item_type": payload.item_type,
            "quantity": quantity,
        })),
    );
    Ok(cart_response("Added to cart", cart.items()))
}

#[utoipa::path(
    put,
    path = "/api/cart/items/{item_type}/{item_id}",
    params(
        ("item_type" = String, Path, description = "FOOD or MERCH"),
        ("item_id" = i64, Path, description = "Catalog item ID")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Quantity set; zero or less removes the line", body = ApiResponse<CartView>),
        (status = 400, description = "Unknown item type or quantity too large"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((item_type, item_id)): Path<(String, i64)>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let item_type = parse_item_type(&item_type)?;
    let cart = state.carts.cart_for(&auth.user.subject);
    cart.update_quantity(item_id, item_type, payload.quantity)?;

    log_audit(
        Some(auth.user.subject.as_str()),
        "cart_update",
        Some("cart"),
        Some(serde_json::json!({
            "item_id": item_id,
            "item_type": item_type,
            "quantity": payload.quantity,
        })),
    );
    Ok(cart_response("OK", cart.items()))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{item_type}/{item_id}",
    params(
        ("item_type" = String, Path, description = "FOOD or MERCH"),
        ("item_id" = i64, Path, description = "Catalog item ID")
    ),
    responses(
        (status = 200, description = "Removed from cart (no-op if absent)", body = ApiResponse<CartView>),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((item_type, item_id)): Path<(String, i64)>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let item_type = parse_item_type(&item_type)?;
    let cart = state.carts.cart_for(&auth.user.subject);
    cart.remove_item(item_id, item_type);

    log_audit(
        Some(auth.user.subject.as_str()),
        "cart_remove",
        Some("cart"),
        Some(serde_json::json!({ "item_id": item_id, "item_type": item_type })),
    );
    Ok(cart_response("Removed from cart", cart.items()))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartView>),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = state.carts.cart_for(&auth.user.subject);
    cart.clear();

    log_audit(Some(auth.user.subject.as_str()), "cart_clear", Some("cart"), None);
    Ok(cart_response("Cart cleared", cart.items()))
}

fn cart_event(lines: Vec<CartLine>) -> Result<Event, axum::Error> {
    Event::default().event("cart").json_data(CartView::new(lines))
}

#[utoipa::path(
    get,
    path = "/api/cart/events",
    responses(
        (status = 200, description = "Server-sent `cart` events: the current cart on connect, then the latest snapshot after changes (rapid changes may coalesce into one event)", body = CartView, content_type = "text/event-stream"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_events(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let mut subscription = state.carts.cart_for(&auth.user.subject).subscribe();
    let current = subscription.seen();

    let updates = stream::unfold(subscription, |mut subscription| async move {
        subscription
            .changed()
            .await
            .map(|lines| (lines, subscription))
    });

    let events = stream::once(async move { current })
        .chain(updates)
        .map(cart_event);

    Sse::new(events).keep_alive(KeepAlive::default())
}
