//! Client for the park backend: catalogs, pickup locations, order placement.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    models::{CatalogItem, ItemType, OrderRequest, OrderResponse},
    session::SessionContext,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unable to connect to server.")]
    Unreachable(#[source] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response from server.")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    /// HTTP-style classification: 0 when the server could not be reached.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Unreachable(_) => 0,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Decode(_) => 502,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }
}

/// Which resource a request was about; only changes the 404 wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Catalog,
    Order,
}

/// Turns a non-success status and its body into a user-facing message.
pub fn rejection(status: u16, body: &str, resource: Resource) -> ApiError {
    let body = body.trim();
    let message = match status {
        400 if !body.is_empty() => body.to_string(),
        400 => "Bad request".to_string(),
        403 => "You do not have permission to perform this action.".to_string(),
        404 => match resource {
            Resource::Order => "Order not found".to_string(),
            Resource::Catalog => "API endpoint not found.".to_string(),
        },
        _ if !body.is_empty() => body.to_string(),
        _ => format!("Server error: {status}"),
    };
    ApiError::Rejected { status, message }
}

#[async_trait]
pub trait ParkApi: Send + Sync {
    async fn food_items(&self, session: &SessionContext) -> Result<Vec<CatalogItem>, ApiError>;

    async fn merch_items(&self, session: &SessionContext) -> Result<Vec<CatalogItem>, ApiError>;

    async fn pickup_locations(&self, session: &SessionContext) -> Result<Vec<String>, ApiError>;

    async fn place_order(
        &self,
        session: &SessionContext,
        order: &OrderRequest,
        coupon_code: Option<&str>,
    ) -> Result<OrderResponse, ApiError>;

    async fn catalog(
        &self,
        session: &SessionContext,
        item_type: ItemType,
    ) -> Result<Vec<CatalogItem>, ApiError> {
        match item_type {
            ItemType::Food => self.food_items(session).await,
            ItemType::Merch => self.merch_items(session).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpParkApi {
    base_url: String,
    http: Client,
}

impl HttpParkApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Unreachable)?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(request: RequestBuilder, session: &SessionContext) -> RequestBuilder {
        match session.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        request: RequestBuilder,
        session: &SessionContext,
        resource: Resource,
    ) -> Result<Response, ApiError> {
        let response = Self::authorize(request, session)
            .send()
            .await
            .map_err(ApiError::Unreachable)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(rejection(status.as_u16(), &body, resource))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        session: &SessionContext,
        resource: Resource,
    ) -> Result<T, ApiError> {
        let response = Self::send(self.http.get(self.url(path)), session, resource).await?;
        response.json::<T>().await.map_err(ApiError::Decode)
    }
}

#[async_trait]
impl ParkApi for HttpParkApi {
    async fn food_items(&self, session: &SessionContext) -> Result<Vec<CatalogItem>, ApiError> {
        self.get_json("/food/all", session, Resource::Catalog).await
    }

    async fn merch_items(&self, session: &SessionContext) -> Result<Vec<CatalogItem>, ApiError> {
        self.get_json("/merch/store", session, Resource::Catalog)
            .await
    }

    async fn pickup_locations(&self, session: &SessionContext) -> Result<Vec<String>, ApiError> {
        self.get_json("/orders/pickup-locations", session, Resource::Order)
            .await
    }

    async fn place_order(
        &self,
        session: &SessionContext,
        order: &OrderRequest,
        coupon_code: Option<&str>,
    ) -> Result<OrderResponse, ApiError> {
        let mut request = self.http.post(self.url("/orders/place")).json(order);
        if let Some(code) = coupon_code {
            request = request.query(&[("couponCode", code)]);
        }

        let response = Self::send(request, session, Resource::Order).await?;
        response
            .json::<OrderResponse>()
            .await
            .map_err(ApiError::Decode)
    }
}
