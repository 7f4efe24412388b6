use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tracing::info;

use stockcast_infra::IssuanceLog;
use stockcast_inventory::IssuanceRecord;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(record_issuance))
}

pub async fn record_issuance(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RecordIssuanceBody>, JsonRejection>,
) -> axum::response::Response {
    let body = match errors::json_body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let occurred_at = body.occurred_at.unwrap_or_else(|| services.now());
    let record = match IssuanceRecord::new(
        body.item_category,
        body.item_type,
        body.size,
        body.quantity,
        occurred_at,
    ) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let item = record.item_key();
    let id = record.id;
    let quantity = record.quantity;

    if let Err(e) = services.issuances().append(record).await {
        return errors::source_error_to_response(e);
    }

    info!(%item, %id, quantity, "issuance recorded");

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": id.to_string(),
            "occurredAt": occurred_at,
        })),
    )
        .into_response()
}
