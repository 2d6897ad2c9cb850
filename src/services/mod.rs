// Service exports
pub mod cache;
pub mod lifecycle;
pub mod memory;
pub mod notifier;
pub mod postgres;
pub mod repository;
pub mod search;

pub use cache::{quantize_time, CacheKey, CacheStats, SearchCache};
pub use lifecycle::RequestLifecycle;
pub use memory::MemoryStore;
pub use notifier::{LifecycleEvent, LogNotifier, Notifier, NotifyError, WebhookNotifier};
pub use postgres::PostgresStore;
pub use repository::{RequestRepository, RideRepository, RiderProfileProvider};
pub use search::{RideSearchEngine, SEARCH_CACHE_TTL_SECS, SEARCH_WINDOW_MINUTES};
