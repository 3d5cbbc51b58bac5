use std::sync::Arc;

use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    client::{ApiError, ParkApi},
    models::{CartLine, OrderItemRequest, OrderRequest, OrderResponse},
    services::cart_service::Cart,
    session::SessionContext,
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty.")]
    EmptyCart,

    #[error("You must be logged in to place an order.")]
    NotSignedIn,

    #[error("Please choose a pickup location.")]
    NoPickupLocation,

    #[error("Your order is already being placed.")]
    InProgress,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What the user entered on the checkout form.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub pickup_location: Option<String>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: OrderResponse,
    pub message: String,
}

/// Sent as `userId` when the token carried no numeric id. The park backend
/// assigns every order to the authenticated account and only requires the
/// field to be positive.
pub const UNRESOLVED_USER_ID: i64 = 1;

pub fn build_order_request(user_id: i64, pickup_location: &str, lines: &[CartLine]) -> OrderRequest {
    OrderRequest {
        user_id,
        pickup_location: pickup_location.to_string(),
        item_list: lines.iter().map(OrderItemRequest::from).collect(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct Checkout {
    api: Arc<dyn ParkApi>,
}

impl Checkout {
    pub fn new(api: Arc<dyn ParkApi>) -> Self {
        Self { api }
    }

    /// The location a fresh checkout form starts with: the first one offered.
    pub async fn default_pickup_location(
        &self,
        session: &SessionContext,
    ) -> Result<Option<String>, ApiError> {
        let locations = self.api.pickup_locations(session).await?;
        Ok(locations.into_iter().next())
    }

    async fn resolve_pickup_location(
        &self,
        session: &SessionContext,
        requested: Option<&str>,
    ) -> Result<String, CheckoutError> {
        if let Some(location) = non_blank(requested) {
            return Ok(location.to_string());
        }
        self.default_pickup_location(session)
            .await?
            .ok_or(CheckoutError::NoPickupLocation)
    }

    /// Submits the cart as one order. The cart is cleared only after the
    /// order API confirms; on any error it is left exactly as it was.
    pub async fn place_order(
        &self,
        cart: &Cart,
        session: &SessionContext,
        form: CheckoutForm,
    ) -> Result<PlacedOrder, CheckoutError> {
        let lines = cart.items();
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let user = session.current_user().ok_or(CheckoutError::NotSignedIn)?;
        let _guard = cart.begin_checkout().ok_or(CheckoutError::InProgress)?;

        let checkout_id = Uuid::new_v4();
        let span = tracing::info_span!("checkout", %checkout_id, user = %user.subject);
        let user_id = user.id.unwrap_or(UNRESOLVED_USER_ID);
        self.submit(cart, session, user_id, &lines, form)
            .instrument(span)
            .await
    }

    async fn submit(
        &self,
        cart: &Cart,
        session: &SessionContext,
        user_id: i64,
        lines: &[CartLine],
        form: CheckoutForm,
    ) -> Result<PlacedOrder, CheckoutError> {
        let pickup_location = self
            .resolve_pickup_location(session, form.pickup_location.as_deref())
            .await?;
        let coupon_code = non_blank(form.coupon_code.as_deref());
        let request = build_order_request(user_id, &pickup_location, lines);

        tracing::info!(
            lines = request.item_list.len(),
            pickup_location = %request.pickup_location,
            coupon = coupon_code.is_some(),
            "placing order"
        );

        match self.api.place_order(session, &request, coupon_code).await {
            Ok(order) => {
                cart.clear();
                tracing::info!(order_id = order.id, "order placed");
                Ok(PlacedOrder {
                    message: format!("Order #{} placed successfully!", order.id),
                    order,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, status = err.status(), "order placement failed");
                Err(err.into())
            }
        }
    }
}
