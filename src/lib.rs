//! Ridepool Algo - Ride matching and search service for the Ridepool carpool app
//!
//! This library implements the matching pipeline used when a rider searches
//! for rides: geographic distance, rule-based eligibility, threshold scoring
//! and a short-lived search cache, plus the join-request lifecycle that hands
//! out seats.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{haversine_distance, is_eligible, MatchScorer, RideMatcher};
pub use error::Error;
pub use models::{GeoPoint, JoinRequest, MatchResult, RequestStatus, Ride, SearchQuery};
