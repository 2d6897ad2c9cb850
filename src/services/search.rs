use crate::core::RideMatcher;
use crate::error::Error;
use crate::models::{MatchResult, RiderPreferences, SearchQuery};
use crate::services::cache::{CacheKey, SearchCache};
use crate::services::repository::RideRepository;
use std::sync::Arc;

/// Candidate rides must depart within this many minutes of the
/// requested time, in either direction. Fixed design constant.
pub const SEARCH_WINDOW_MINUTES: i64 = 60;

/// TTL for cached search results
pub const SEARCH_CACHE_TTL_SECS: u64 = 300;

/// Orchestrates candidate retrieval, ranking and caching
///
/// Searches are stateless and run fully in parallel; the cache is the
/// only shared resource between them. Repository failures propagate
/// as-is, no retries here.
pub struct RideSearchEngine {
    rides: Arc<dyn RideRepository>,
    cache: Arc<SearchCache>,
    matcher: RideMatcher,
}

impl RideSearchEngine {
    pub fn new(rides: Arc<dyn RideRepository>, cache: Arc<SearchCache>, matcher: RideMatcher) -> Self {
        Self {
            rides,
            cache,
            matcher,
        }
    }

    /// Ranked matches for a rider's desired trip
    ///
    /// Cache entries are returned as-is; they were sorted on insert.
    pub async fn search(
        &self,
        query: &SearchQuery,
        prefs: &RiderPreferences,
    ) -> Result<Arc<Vec<MatchResult>>, Error> {
        let key = CacheKey::search(query);

        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let window = chrono::Duration::minutes(SEARCH_WINDOW_MINUTES);
        let candidates = self
            .rides
            .find_by_departure_window(query.requested_time - window, query.requested_time + window)
            .await?;

        tracing::debug!("Search miss for {}: {} candidates", key, candidates.len());

        let ranked = self.matcher.rank(query, prefs, candidates);
        self.cache
            .put(key, ranked.clone(), SEARCH_CACHE_TTL_SECS)
            .await;

        Ok(Arc::new(ranked))
    }
}
