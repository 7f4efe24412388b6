use std::collections::HashMap;
use std::sync::RwLock;

use tracing::info;

use stockcast_ai::registry::{newest_first, select_latest, validate_submission};
use stockcast_ai::{ModelArtifact, ModelRegistry, RegistryError};
use stockcast_core::ArtifactId;

/// In-memory append-only model registry.
///
/// Intended for tests/dev. Versions are kept per model name in registration
/// order.
#[derive(Debug, Default)]
pub struct InMemoryModelRegistry {
    models: RwLock<HashMap<String, Vec<ModelArtifact>>>,
}

impl InMemoryModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ModelRegistry for InMemoryModelRegistry {
    async fn register(&self, artifact: ModelArtifact) -> Result<ArtifactId, RegistryError> {
        validate_submission(&artifact)?;

        let mut models = self
            .models
            .write()
            .map_err(|_| RegistryError::Storage("lock poisoned".to_string()))?;

        let id = ArtifactId::new();
        info!(
            model = %artifact.model_name,
            version = %artifact.version,
            model_type = %artifact.model_type(),
            artifact_id = %id,
            "model artifact registered"
        );
        models
            .entry(artifact.model_name.clone())
            .or_default()
            .push(artifact);

        Ok(id)
    }

    async fn latest(&self, model_name: &str) -> Result<Option<ModelArtifact>, RegistryError> {
        let models = self
            .models
            .read()
            .map_err(|_| RegistryError::Storage("lock poisoned".to_string()))?;

        Ok(models
            .get(model_name)
            .and_then(|versions| select_latest(versions))
            .cloned())
    }

    async fn versions(&self, model_name: &str) -> Result<Vec<ModelArtifact>, RegistryError> {
        let models = self
            .models
            .read()
            .map_err(|_| RegistryError::Storage("lock poisoned".to_string()))?;

        Ok(newest_first(models.get(model_name).cloned().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stockcast_ai::ModelSpec;

    fn artifact(name: &str, version: &str, day: u32) -> ModelArtifact {
        ModelArtifact {
            model_name: name.into(),
            version: version.into(),
            features: vec![],
            spec: ModelSpec::Other,
            accuracy: Default::default(),
            training_date: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn latest_picks_greatest_training_date() {
        let registry = InMemoryModelRegistry::new();
        registry.register(artifact("m", "new", 20)).await.unwrap();
        registry.register(artifact("m", "old", 2)).await.unwrap();
        registry.register(artifact("other", "x", 30)).await.unwrap();

        assert_eq!(registry.latest("m").await.unwrap().unwrap().version, "new");
        assert!(registry.latest("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn prior_versions_are_kept() {
        let registry = InMemoryModelRegistry::new();
        registry.register(artifact("m", "1", 1)).await.unwrap();
        registry.register(artifact("m", "2", 2)).await.unwrap();

        let versions: Vec<_> = registry
            .versions("m")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.version)
            .collect();
        assert_eq!(versions, vec!["2", "1"]);
    }

    #[tokio::test]
    async fn blank_submissions_are_rejected() {
        let registry = InMemoryModelRegistry::new();
        let err = registry.register(artifact("", "1", 1)).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSubmission(_)));
        assert!(registry.versions("").await.unwrap().is_empty());
    }
}
