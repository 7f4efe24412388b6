use axum::Router;

pub mod forecast;
pub mod issuances;
pub mod models;
pub mod system;

/// Router for the forecasting endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/models", models::router())
        .nest("/forecast", forecast::router())
        .nest("/issuances", issuances::router())
}
