use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The two catalogs that share one cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemType {
    Food,
    Merch,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Food => "FOOD",
            ItemType::Merch => "MERCH",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FOOD" => Ok(ItemType::Food),
            "MERCH" => Ok(ItemType::Merch),
            other => Err(format!("unknown item type {other}")),
        }
    }
}

/// A row of the food or merchandise catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    /// Only the food catalog reports availability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

/// One aggregated entry of the cart, keyed by `(item_id, item_type)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub item_id: i64,
    pub item_type: ItemType,
    pub item_name: String,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn matches(&self, item_id: i64, item_type: ItemType) -> bool {
        self.item_id == item_id && self.item_type == item_type
    }

    /// Saturates at `Decimal::MAX` instead of overflowing.
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// What a store screen hands to the cart; the quantity is passed separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    pub item_id: i64,
    pub item_type: ItemType,
    pub item_name: String,
    pub unit_price: Decimal,
}

impl NewCartLine {
    pub fn from_catalog(item_type: ItemType, item: &CatalogItem) -> Self {
        Self {
            item_id: item.id,
            item_type,
            item_name: item.name.clone(),
            unit_price: item.price,
        }
    }
}

/// Totals derived from a cart snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub struct CartSummary {
    pub total_items: u64,
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
}

impl CartSummary {
    pub fn from_lines(lines: &[CartLine]) -> Self {
        lines.iter().fold(Self::default(), |acc, line| Self {
            total_items: acc.total_items.saturating_add(u64::from(line.quantity)),
            total_amount: acc.total_amount.saturating_add(line.line_total()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub item_id: i64,
    pub item_type: ItemType,
    pub quantity: u32,
    pub item_name: String,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
}

impl From<&CartLine> for OrderItemRequest {
    fn from(line: &CartLine) -> Self {
        Self {
            item_id: line.item_id,
            item_type: line.item_type,
            quantity: line.quantity,
            item_name: line.item_name.clone(),
            unit_price: line.unit_price,
        }
    }
}

/// Body of `POST /orders/place`. The coupon travels as a query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub user_id: i64,
    pub pickup_location: String,
    pub item_list: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: i64,
    pub item_name: String,
    pub quantity: u32,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    pub item_type: ItemType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub pickup_location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub order_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub item_list: Vec<OrderLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(item_id: i64, price: i64, quantity: u32) -> CartLine {
        CartLine {
            item_id,
            item_type: ItemType::Food,
            item_name: format!("item-{item_id}"),
            unit_price: Decimal::from(price),
            quantity,
        }
    }

    #[test]
    fn summary_sums_quantities_and_amounts() {
        let summary = CartSummary::from_lines(&[line(1, 5, 2), line(2, 3, 1)]);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_amount, Decimal::from(13));
    }

    #[test]
    fn huge_amounts_saturate_instead_of_panicking() {
        let mut pricey = line(1, 0, u32::MAX);
        pricey.unit_price = Decimal::MAX;
        assert_eq!(pricey.line_total(), Decimal::MAX);

        let summary = CartSummary::from_lines(&[pricey.clone(), pricey, line(2, 3, 1)]);
        assert_eq!(summary.total_amount, Decimal::MAX);
        assert_eq!(summary.total_items, 2 * u64::from(u32::MAX) + 1);
    }

    #[test]
    fn summary_of_empty_cart_is_zero() {
        assert_eq!(CartSummary::from_lines(&[]), CartSummary::default());
    }

    #[test]
    fn item_type_uses_uppercase_wire_names() {
        assert_eq!(serde_json::to_string(&ItemType::Merch).unwrap(), "\"MERCH\"");
        assert_eq!("food".parse::<ItemType>().unwrap(), ItemType::Food);
        assert!("TICKET".parse::<ItemType>().is_err());
    }

    #[test]
    fn order_response_tolerates_missing_and_extra_fields() {
        let body = r#"{"id":42,"status":"PLACED","totalAmount":12.5,"orderTime":"2025-05-01T10:15:00","extra":true}"#;
        let order: OrderResponse = serde_json::from_str(body).unwrap();
        assert_eq!(order.id, 42);
        assert_eq!(order.total_amount, Some(Decimal::new(125, 1)));
        assert!(order.item_list.is_empty());
    }
}
