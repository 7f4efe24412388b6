//! Model artifact registry port.
//!
//! Storage lives in infra; this module fixes the contract: registration is
//! append-only and `latest` picks the greatest `trainingDate` for a name.

use std::sync::Arc;

use stockcast_core::ArtifactId;

use crate::error::RegistryError;
use crate::model::ModelArtifact;

#[async_trait::async_trait]
pub trait ModelRegistry: Send + Sync {
    /// Store a new version. Prior versions are never touched.
    async fn register(&self, artifact: ModelArtifact) -> Result<ArtifactId, RegistryError>;

    /// Most recently trained version of `model_name`, if any.
    async fn latest(&self, model_name: &str) -> Result<Option<ModelArtifact>, RegistryError>;

    /// Every stored version of `model_name`, newest training date first.
    async fn versions(&self, model_name: &str) -> Result<Vec<ModelArtifact>, RegistryError>;
}

#[async_trait::async_trait]
impl<R> ModelRegistry for Arc<R>
where
    R: ModelRegistry + ?Sized,
{
    async fn register(&self, artifact: ModelArtifact) -> Result<ArtifactId, RegistryError> {
        (**self).register(artifact).await
    }

    async fn latest(&self, model_name: &str) -> Result<Option<ModelArtifact>, RegistryError> {
        (**self).latest(model_name).await
    }

    async fn versions(&self, model_name: &str) -> Result<Vec<ModelArtifact>, RegistryError> {
        (**self).versions(model_name).await
    }
}

/// Reject submissions that cannot be addressed later.
///
/// Model shape (coefficient counts, scaler alignment) is deliberately not
/// checked here; it is reported when the model is evaluated.
pub fn validate_submission(artifact: &ModelArtifact) -> Result<(), RegistryError> {
    if artifact.model_name.trim().is_empty() {
        return Err(RegistryError::InvalidSubmission(
            "modelName cannot be empty".to_string(),
        ));
    }
    if artifact.version.trim().is_empty() {
        return Err(RegistryError::InvalidSubmission(
            "version cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Artifact with the greatest training date.
///
/// Input is in registration order; on equal dates the later registration wins.
pub fn select_latest<'a, I>(artifacts: I) -> Option<&'a ModelArtifact>
where
    I: IntoIterator<Item = &'a ModelArtifact>,
{
    artifacts.into_iter().max_by_key(|a| a.training_date)
}

/// Sort registration-ordered artifacts newest training date first, later
/// registrations first on ties.
pub fn newest_first(mut artifacts: Vec<ModelArtifact>) -> Vec<ModelArtifact> {
    artifacts.reverse();
    artifacts.sort_by(|a, b| b.training_date.cmp(&a.training_date));
    artifacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelSpec;
    use chrono::{TimeZone, Utc};

    fn artifact(version: &str, day: u32) -> ModelArtifact {
        ModelArtifact {
            model_name: "uniform_forecast".into(),
            version: version.into(),
            features: vec![],
            spec: ModelSpec::Other,
            accuracy: Default::default(),
            training_date: Utc.with_ymd_and_hms(2025, 3, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn latest_is_by_training_date_not_registration_order() {
        let stored = vec![artifact("b", 10), artifact("a", 20), artifact("c", 5)];
        assert_eq!(select_latest(&stored).unwrap().version, "a");
    }

    #[test]
    fn ties_go_to_the_later_registration() {
        let stored = vec![artifact("first", 10), artifact("second", 10)];
        assert_eq!(select_latest(&stored).unwrap().version, "second");
        let ordered = newest_first(stored);
        assert_eq!(ordered[0].version, "second");
    }

    #[test]
    fn empty_is_none() {
        assert!(select_latest(&Vec::<ModelArtifact>::new()).is_none());
    }

    #[test]
    fn newest_first_orders_descending() {
        let stored = vec![artifact("b", 10), artifact("a", 20), artifact("c", 5)];
        let versions: Vec<_> = newest_first(stored).into_iter().map(|a| a.version).collect();
        assert_eq!(versions, vec!["a", "b", "c"]);
    }

    #[test]
    fn blank_name_or_version_rejected() {
        let mut a = artifact("1", 1);
        a.model_name = " ".into();
        assert!(validate_submission(&a).is_err());
        let mut a = artifact("", 1);
        a.model_name = "x".into();
        assert!(validate_submission(&a).is_err());
        assert!(validate_submission(&artifact("1", 1)).is_ok());
    }
}
