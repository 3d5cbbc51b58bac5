use std::sync::Arc;

use crate::{
    client::ParkApi,
    services::{cart_service::CartRegistry, checkout_service::Checkout},
};

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn ParkApi>,
    pub carts: Arc<CartRegistry>,
    pub checkout: Checkout,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(api: Arc<dyn ParkApi>, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            checkout: Checkout::new(Arc::clone(&api)),
            api,
            carts: Arc::new(CartRegistry::new()),
            jwt_secret: jwt_secret.into(),
        }
    }
}
