use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use stockcast_inventory::ItemKey;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(forecast))
        .route("/batch", post(forecast_batch))
        .route("/features", post(forecast_features))
}

pub async fn forecast(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::ForecastRequestBody>, JsonRejection>,
) -> axum::response::Response {
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let now = services.now();
    let request = body.to_request();
    match services
        .orchestrator()
        .forecast(&request, body.model_name.as_deref(), now)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            tracing::warn!(item = %request.item, error = %e, "forecast failed");
            errors::forecast_error_to_response(e)
        }
    }
}

pub async fn forecast_batch(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::BatchForecastBody>, JsonRejection>,
) -> axum::response::Response {
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let now = services.now();
    let items: Vec<ItemKey> = body.items.iter().map(dto::BatchItemBody::to_item_key).collect();
    match services
        .orchestrator()
        .forecast_many(
            &items,
            body.forecast_date,
            body.batch.as_deref(),
            body.model_name.as_deref(),
            now,
        )
        .await
    {
        Ok(recommendations) => (
            StatusCode::OK,
            Json(dto::BatchForecastResponse::from(recommendations)),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(items = items.len(), error = %e, "batch forecast failed");
            errors::forecast_error_to_response(e)
        }
    }
}

/// Feature map only, for inspecting what a model would be fed.
pub async fn forecast_features(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::ForecastRequestBody>, JsonRejection>,
) -> axum::response::Response {
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let now = services.now();
    match services.orchestrator().features(&body.to_request(), now).await {
        Ok(built) => (StatusCode::OK, Json(built)).into_response(),
        Err(e) => errors::forecast_error_to_response(e),
    }
}
