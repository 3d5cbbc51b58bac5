#![allow(dead_code)]

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use parking_lot::Mutex;
use park_storefront::middleware::auth::Claims;
use serde_json::{Value, json};

pub const JWT_SECRET: &str = "test-secret";

/// One `POST /orders/place` as the fake backend saw it.
#[derive(Debug, Clone)]
pub struct PlacedCall {
    pub body: Value,
    pub coupon: Option<String>,
    pub authorization: Option<String>,
}

/// Stand-in for the park backend.
#[derive(Default)]
pub struct FakePark {
    pub placed: Mutex<Vec<PlacedCall>>,
    pub catalog_auth: Mutex<Vec<Option<String>>>,
    pub fail_next_order: Mutex<Option<(StatusCode, String)>>,
    pub pickup_locations: Mutex<Vec<String>>,
}

impl FakePark {
    pub fn new() -> Arc<Self> {
        let park = Self::default();
        *park.pickup_locations.lock() = vec!["Main Gate".into(), "Lake Kiosk".into()];
        Arc::new(park)
    }

    pub fn fail_next_order(&self, status: StatusCode, body: &str) {
        *self.fail_next_order.lock() = Some((status, body.to_string()));
    }

    pub fn placed(&self) -> Vec<PlacedCall> {
        self.placed.lock().clone()
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn food(State(park): State<Arc<FakePark>>, headers: HeaderMap) -> Json<Value> {
    park.catalog_auth.lock().push(authorization(&headers));
    Json(json!([
        { "id": 1, "name": "Pizza", "price": 10, "available": true },
        { "id": 2, "name": "Soda", "price": 3.5, "available": true },
        { "id": 9, "name": "Churros", "price": 4, "available": false }
    ]))
}

async fn merch(State(park): State<Arc<FakePark>>, headers: HeaderMap) -> Json<Value> {
    park.catalog_auth.lock().push(authorization(&headers));
    Json(json!([
        { "id": 1, "name": "Cap", "price": 15 },
        { "id": 2, "name": "Plush", "price": 22.25 }
    ]))
}

async fn pickup_locations(State(park): State<Arc<FakePark>>) -> Json<Vec<String>> {
    Json(park.pickup_locations.lock().clone())
}

async fn place(
    State(park): State<Arc<FakePark>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    park.placed.lock().push(PlacedCall {
        body: body.clone(),
        coupon: query.get("couponCode").cloned(),
        authorization: authorization(&headers),
    });

    let failure = park.fail_next_order.lock().take();
    if let Some((status, message)) = failure {
        return (status, message).into_response();
    }

    let id = park.placed.lock().len() as i64 + 500;
    Json(json!({
        "id": id,
        "userId": body["userId"],
        "pickupLocation": body["pickupLocation"],
        "status": "PENDING",
        "totalAmount": 33.5,
        "orderTime": "2025-06-01T12:30:00",
        "itemList": body["itemList"],
    }))
    .into_response()
}

pub fn fake_park_router(park: Arc<FakePark>) -> Router {
    Router::new()
        .route("/food/all", get(food))
        .route("/merch/store", get(merch))
        .route("/orders/pickup-locations", get(pickup_locations))
        .route("/orders/place", post(place))
        .with_state(park)
}

/// Serves the fake backend on an ephemeral port and returns its base url.
pub async fn spawn_fake_park(park: Arc<FakePark>) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, fake_park_router(park)).await;
    });
    Ok(format!("http://{addr}"))
}

/// A token shaped like the park backend's: the subject is the account email.
pub fn token_for(email: &str, role: &str) -> String {
    let claims = Claims {
        sub: email.to_string(),
        role: role.to_string(),
        exp: 4_102_444_800,
        user_id: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("encode token")
}
