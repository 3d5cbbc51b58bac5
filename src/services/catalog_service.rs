use crate::{
    client::ParkApi,
    error::{AppError, AppResult},
    models::{CatalogItem, ItemType, NewCartLine},
    session::SessionContext,
};

pub async fn list_catalog(
    api: &dyn ParkApi,
    session: &SessionContext,
    item_type: ItemType,
) -> AppResult<Vec<CatalogItem>> {
    Ok(api.catalog(session, item_type).await?)
}

/// Looks the item up in its catalog and captures its current name and price.
pub async fn resolve_cart_line(
    api: &dyn ParkApi,
    session: &SessionContext,
    item_type: ItemType,
    item_id: i64,
) -> AppResult<NewCartLine> {
    let items = list_catalog(api, session, item_type).await?;
    let item = items
        .iter()
        .find(|item| item.id == item_id)
        .ok_or(AppError::NotFound)?;

    if item.available == Some(false) {
        return Err(AppError::BadRequest(format!("{} is not available", item.name)));
    }

    Ok(NewCartLine::from_catalog(item_type, item))
}
