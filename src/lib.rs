//! Storefront for the amusement park: per-user carts for food and
//! merchandise, and checkout against the park's order API.

pub mod audit;
pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
