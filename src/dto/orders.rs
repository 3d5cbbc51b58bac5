use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{models::OrderResponse, services::checkout_service::CheckoutForm};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub pickup_location: Option<String>,
    pub coupon_code: Option<String>,
}

impl From<CheckoutRequest> for CheckoutForm {
    fn from(req: CheckoutRequest) -> Self {
        CheckoutForm {
            pickup_location: req.pickup_location,
            coupon_code: req.coupon_code,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PickupLocations {
    pub locations: Vec<String>,
    /// The location a checkout form starts with.
    pub default: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResult {
    pub order: OrderResponse,
}
