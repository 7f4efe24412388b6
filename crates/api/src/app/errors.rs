use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use stockcast_ai::{ForecastError, RegistryError, SourceError};
use stockcast_core::DomainError;

pub fn forecast_error_to_response(err: ForecastError) -> axum::response::Response {
    match err {
        ForecastError::ModelNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "model_not_found", err.to_string())
        }
        ForecastError::InvalidModelArtifact(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_model_artifact", msg)
        }
        ForecastError::UnsupportedModelType(model_type) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "unsupported_model_type",
            format!("model type '{model_type}' cannot be evaluated"),
        ),
        ForecastError::Source(e) => source_error_to_response(e),
        ForecastError::Registry(e) => registry_error_to_response(e),
    }
}

pub fn registry_error_to_response(err: RegistryError) -> axum::response::Response {
    match err {
        RegistryError::InvalidSubmission(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_submission", msg)
        }
        RegistryError::Storage(msg) => {
            tracing::error!(error = %msg, "model registry failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "registry_error", msg)
        }
    }
}

pub fn source_error_to_response(err: SourceError) -> axum::response::Response {
    tracing::error!(error = %err, "issuance store failure");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "issuance_store_error",
        err.to_string(),
    )
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

/// Unwrap a JSON body, reporting any rejection as a 400 in the usual error shape.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    body.map(|Json(value)| value).map_err(|rejection| {
        json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
    })
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
