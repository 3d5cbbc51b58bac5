use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{CatalogItem, ItemType};

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogList {
    pub item_type: ItemType,
    pub items: Vec<CatalogItem>,
}
