use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    client::ApiError,
    response::{ApiResponse, Meta},
    services::{cart_service::CartError, checkout_service::CheckoutError},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized(String),

    #[error("Checkout failed")]
    Checkout(#[from] CheckoutError),

    #[error("Park API error")]
    Upstream(#[from] ApiError),

    #[error("Bad Request")]
    Cart(#[from] CartError),
}

impl AppError {
    /// Text shown to the user, without the status prefix of the `Display` form.
    fn user_message(&self) -> String {
        match self {
            AppError::BadRequest(reason) | AppError::Unauthorized(reason) => reason.clone(),
            AppError::Cart(err) => err.to_string(),
            AppError::Checkout(err) => err.to_string(),
            AppError::Upstream(err) => err.to_string(),
            _ => self.to_string(),
        }
    }
}

fn upstream_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ApiError::Rejected { status: 403, .. } => StatusCode::FORBIDDEN,
        ApiError::Rejected { status: 401, .. } => StatusCode::UNAUTHORIZED,
        rejected if rejected.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Cart(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Checkout(err) => match err {
                CheckoutError::EmptyCart | CheckoutError::NoPickupLocation => {
                    StatusCode::BAD_REQUEST
                }
                CheckoutError::NotSignedIn => StatusCode::UNAUTHORIZED,
                CheckoutError::InProgress => StatusCode::CONFLICT,
                CheckoutError::Api(api) => upstream_status(api),
            },
            AppError::Upstream(err) => upstream_status(err),
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.user_message(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
