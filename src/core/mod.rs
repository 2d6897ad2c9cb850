// Core algorithm exports
pub mod distance;
pub mod eligibility;
pub mod matcher;
pub mod scoring;

pub use distance::haversine_distance;
pub use eligibility::is_eligible;
pub use matcher::RideMatcher;
pub use scoring::{MatchScorer, ScoreBand, DEFAULT_BANDS};
