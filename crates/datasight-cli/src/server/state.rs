//! Application state for the API server.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use datasight::{AnalyticsEngine, Dataset, QaEngine, RateLimiter};

/// How long a computed overview payload stays fresh.
const OVERVIEW_CACHE_TTL: Duration = Duration::from_secs(30);

/// A cached overview payload with its computation time.
pub struct CachedOverview {
    pub computed_at: Instant,
    pub payload: serde_json::Value,
}

/// Shared application state.
///
/// The dataset is loaded once at startup and never mutated; every analysis
/// is recomputed from it (or served from the short-lived overview cache).
#[derive(Clone)]
pub struct AppState {
    /// The dataset being served.
    pub dataset: Arc<Dataset>,
    /// Content fingerprint of the dataset, used as its public id.
    pub dataset_id: Arc<str>,
    /// When the dataset was loaded; reported as `last_updated`.
    pub loaded_at: DateTime<Utc>,
    /// The analytics engine.
    pub engine: AnalyticsEngine,
    /// The Q&A engine (with optional enricher).
    pub qa: Arc<QaEngine>,
    /// Rate limiter for AI endpoints.
    pub limiter: Arc<dyn RateLimiter>,
    /// Short-lived cache for the overview payload.
    pub overview_cache: Arc<Mutex<Option<CachedOverview>>>,
    /// Cache TTL.
    pub cache_ttl: Duration,
}

impl AppState {
    /// Create application state for a loaded dataset.
    pub fn new(dataset: Dataset, qa: QaEngine, limiter: Arc<dyn RateLimiter>) -> Self {
        let dataset_id: Arc<str> = dataset.fingerprint().into();
        Self {
            dataset: Arc::new(dataset),
            dataset_id,
            loaded_at: Utc::now(),
            engine: AnalyticsEngine::new(),
            qa: Arc::new(qa),
            limiter,
            overview_cache: Arc::new(Mutex::new(None)),
            cache_ttl: OVERVIEW_CACHE_TTL,
        }
    }

    /// Fetch the cached overview payload if it is still fresh.
    pub fn cached_overview(&self) -> Option<serde_json::Value> {
        let guard = self.overview_cache.lock().ok()?;
        let cached = guard.as_ref()?;
        if cached.computed_at.elapsed() < self.cache_ttl {
            Some(cached.payload.clone())
        } else {
            None
        }
    }

    /// Store a freshly computed overview payload.
    pub fn store_overview(&self, payload: serde_json::Value) {
        if let Ok(mut guard) = self.overview_cache.lock() {
            *guard = Some(CachedOverview {
                computed_at: Instant::now(),
                payload,
            });
        }
    }
}
