use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use stockcast_ai::{ModelArtifact, ModelRegistry, RegistryError};
use stockcast_core::ArtifactId;

/// Short-lived cache of `latest` lookups in front of another registry.
///
/// Entries expire after `ttl` and are dropped whenever a new version of the
/// same model is registered through this handle. A zero `ttl` disables
/// caching.
#[derive(Debug)]
pub struct CachedModelRegistry<R> {
    inner: R,
    ttl: Duration,
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    latest: HashMap<String, (Instant, Option<ModelArtifact>)>,
    /// Bumped on every registration of a name. A lookup only fills the cache
    /// if the generation it started under is still current.
    generations: HashMap<String, u64>,
}

impl CacheState {
    fn generation(&self, model_name: &str) -> u64 {
        self.generations.get(model_name).copied().unwrap_or(0)
    }
}

enum Lookup {
    Hit(Option<ModelArtifact>),
    Miss { generation: u64 },
    /// Cache lock poisoned; go straight to the inner registry.
    Bypass,
}

impl<R> CachedModelRegistry<R> {
    pub fn new(inner: R, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn lookup(&self, model_name: &str) -> Lookup {
        let Ok(state) = self.state.lock() else {
            return Lookup::Bypass;
        };
        match state.latest.get(model_name) {
            Some((stored_at, artifact)) if stored_at.elapsed() < self.ttl => {
                Lookup::Hit(artifact.clone())
            }
            _ => Lookup::Miss {
                generation: state.generation(model_name),
            },
        }
    }

    fn fill(&self, model_name: &str, generation: u64, artifact: &Option<ModelArtifact>) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.generation(model_name) != generation {
            debug!(model = model_name, "registration raced lookup; not caching");
            return;
        }
        state
            .latest
            .insert(model_name.to_string(), (Instant::now(), artifact.clone()));
    }

    fn invalidate(&self, model_name: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.latest.remove(model_name);
            *state.generations.entry(model_name.to_string()).or_default() += 1;
        }
    }
}

#[async_trait::async_trait]
impl<R: ModelRegistry> ModelRegistry for CachedModelRegistry<R> {
    async fn register(&self, artifact: ModelArtifact) -> Result<ArtifactId, RegistryError> {
        let model_name = artifact.model_name.clone();
        let result = self.inner.register(artifact).await;
        self.invalidate(&model_name);
        result
    }

    async fn latest(&self, model_name: &str) -> Result<Option<ModelArtifact>, RegistryError> {
        if self.ttl.is_zero() {
            return self.inner.latest(model_name).await;
        }
        match self.lookup(model_name) {
            Lookup::Hit(hit) => {
                debug!(model = model_name, "model cache hit");
                Ok(hit)
            }
            Lookup::Miss { generation } => {
                let artifact = self.inner.latest(model_name).await?;
                self.fill(model_name, generation, &artifact);
                Ok(artifact)
            }
            Lookup::Bypass => self.inner.latest(model_name).await,
        }
    }

    async fn versions(&self, model_name: &str) -> Result<Vec<ModelArtifact>, RegistryError> {
        self.inner.versions(model_name).await
    }
}
