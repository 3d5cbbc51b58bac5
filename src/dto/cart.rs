use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{CartLine, CartSummary, ItemType};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub item_id: i64,
    pub item_type: ItemType,
    /// Defaults to 1.
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub summary: CartSummary,
}

impl CartView {
    pub fn new(items: Vec<CartLine>) -> Self {
        let summary = CartSummary::from_lines(&items);
        Self { items, summary }
    }
}
