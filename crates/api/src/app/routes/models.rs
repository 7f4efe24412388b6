use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockcast_ai::{ModelArtifact, ModelRegistry};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_model))
        .route("/:name/latest", get(get_latest_model))
        .route("/:name/versions", get(list_model_versions))
}

pub async fn register_model(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ModelArtifact>, JsonRejection>,
) -> axum::response::Response {
    let artifact = match errors::json_body(body) {
        Ok(a) => a,
        Err(resp) => return resp,
    };

    let model_name = artifact.model_name.clone();
    let version = artifact.version.clone();

    let artifact_id = match services.registry().register(artifact).await {
        Ok(id) => id,
        Err(e) => return errors::registry_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(dto::RegisteredModel {
            artifact_id: artifact_id.to_string(),
            model_name,
            version,
        }),
    )
        .into_response()
}

pub async fn get_latest_model(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    match services.orchestrator().resolve_model(&name).await {
        Ok(artifact) => (StatusCode::OK, Json(artifact)).into_response(),
        Err(e) => errors::forecast_error_to_response(e),
    }
}

pub async fn list_model_versions(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let versions = match services.registry().versions(&name).await {
        Ok(v) => v,
        Err(e) => return errors::registry_error_to_response(e),
    };

    let summaries: Vec<dto::ModelVersionSummary> = versions.iter().map(Into::into).collect();
    (StatusCode::OK, Json(summaries)).into_response()
}
