use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::catalog::CatalogList,
    error::AppResult,
    models::ItemType,
    response::{ApiResponse, Meta},
    services::catalog_service::list_catalog,
    session::SessionContext,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/food", get(list_food))
        .route("/merch", get(list_merch))
}

async fn catalog_response(
    state: &AppState,
    session: &SessionContext,
    item_type: ItemType,
) -> AppResult<Json<ApiResponse<CatalogList>>> {
    let items = list_catalog(state.api.as_ref(), session, item_type).await?;
    let meta = Meta::total(items.len() as u64);
    Ok(Json(ApiResponse::success(
        "OK",
        CatalogList { item_type, items },
        Some(meta),
    )))
}

#[utoipa::path(
    get,
    path = "/api/catalog/food",
    responses(
        (status = 200, description = "Food menu", body = ApiResponse<CatalogList>),
        (status = 503, description = "Park API unreachable"),
    ),
    tag = "Catalog"
)]
pub async fn list_food(
    State(state): State<AppState>,
    session: SessionContext,
) -> AppResult<Json<ApiResponse<CatalogList>>> {
    catalog_response(&state, &session, ItemType::Food).await
}

#[utoipa::path(
    get,
    path = "/api/catalog/merch",
    responses(
        (status = 200, description = "Merchandise store", body = ApiResponse<CatalogList>),
        (status = 503, description = "Park API unreachable"),
    ),
    tag = "Catalog"
)]
pub async fn list_merch(
    State(state): State<AppState>,
    session: SessionContext,
) -> AppResult<Json<ApiResponse<CatalogList>>> {
    catalog_response(&state, &session, ItemType::Merch).await
}
