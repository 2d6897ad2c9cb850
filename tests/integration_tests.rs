// Integration tests for Ridepool Algo

use chrono::{DateTime, Utc};
use ridepool_algo::core::{MatchScorer, RideMatcher};
use ridepool_algo::error::Error;
use ridepool_algo::models::{
    Gender, GeoPoint, RequestStatus, Ride, RideRules, RiderPreferences, SearchQuery,
};
use ridepool_algo::services::{
    LogNotifier, MemoryStore, RequestLifecycle, RideRepository, RideSearchEngine, SearchCache,
};
use std::sync::Arc;
use uuid::Uuid;

fn create_test_ride(
    pickup: GeoPoint,
    dropoff: GeoPoint,
    departure: DateTime<Utc>,
    seats: i32,
    rules: RideRules,
) -> Ride {
    Ride {
        id: Uuid::new_v4(),
        driver_id: Uuid::new_v4(),
        pickup,
        dropoff,
        departure_time: departure,
        total_seats: seats,
        available_seats: seats,
        rules,
    }
}

fn create_test_prefs() -> RiderPreferences {
    RiderPreferences {
        gender: Gender::Male,
        smoking_allowed: false,
        pet_allowed: false,
    }
}

struct TestApp {
    store: Arc<MemoryStore>,
    cache: Arc<SearchCache>,
    engine: RideSearchEngine,
    lifecycle: RequestLifecycle,
}

fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(SearchCache::new(1_000));
    let engine = RideSearchEngine::new(
        store.clone(),
        cache.clone(),
        RideMatcher::new(MatchScorer::default()),
    );
    let lifecycle = RequestLifecycle::new(store.clone(), store.clone(), Arc::new(LogNotifier));
    TestApp {
        store,
        cache,
        engine,
        lifecycle,
    }
}

#[tokio::test]
async fn test_integration_end_to_end_search() {
    let app = test_app();
    let now = Utc::now();

    // Driver commute through Bangalore
    let good = create_test_ride(
        GeoPoint::new(12.97, 77.59),
        GeoPoint::new(12.93, 77.68),
        now,
        3,
        RideRules::default(),
    );
    // Same corridor but a wider detour on the pickup side
    let farther = create_test_ride(
        GeoPoint::new(13.05, 77.59),
        GeoPoint::new(12.93, 77.68),
        now,
        3,
        RideRules::default(),
    );
    // Wrong city entirely
    let elsewhere = create_test_ride(
        GeoPoint::new(19.07, 72.87),
        GeoPoint::new(19.10, 72.90),
        now,
        3,
        RideRules::default(),
    );
    // Right place, wrong time
    let too_late = create_test_ride(
        GeoPoint::new(12.97, 77.59),
        GeoPoint::new(12.93, 77.68),
        now + chrono::Duration::hours(3),
        3,
        RideRules::default(),
    );
    // Female-only, our rider is male
    let restricted = create_test_ride(
        GeoPoint::new(12.97, 77.59),
        GeoPoint::new(12.93, 77.68),
        now,
        3,
        RideRules {
            female_only: true,
            ..RideRules::default()
        },
    );

    for ride in [&good, &farther, &elsewhere, &too_late, &restricted] {
        RideRepository::save(app.store.as_ref(), ride).await.unwrap();
    }

    let query = SearchQuery {
        rider_origin: GeoPoint::new(12.975, 77.595),
        rider_dest: GeoPoint::new(12.935, 77.685),
        requested_time: now,
    };

    let results = app.engine.search(&query, &create_test_prefs()).await.unwrap();

    // too_late is outside the window, restricted is ineligible
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].ride_id, good.id);
    assert_eq!(results[0].match_percent, 90);
    assert_eq!(results[1].ride_id, farther.id);
    assert!(results[1].match_percent < 90);
    assert_eq!(results[2].ride_id, elsewhere.id);
    assert_eq!(results[2].match_percent, 0);
}

#[tokio::test]
async fn test_integration_repeated_search_is_cached() {
    let app = test_app();
    let now = Utc::now();

    let ride = create_test_ride(
        GeoPoint::new(12.97, 77.59),
        GeoPoint::new(12.93, 77.68),
        now,
        3,
        RideRules::default(),
    );
    RideRepository::save(app.store.as_ref(), &ride).await.unwrap();

    let query = SearchQuery {
        rider_origin: GeoPoint::new(12.975, 77.595),
        rider_dest: GeoPoint::new(12.935, 77.685),
        requested_time: now,
    };

    let first = app.engine.search(&query, &create_test_prefs()).await.unwrap();
    let second = app.engine.search(&query, &create_test_prefs()).await.unwrap();

    let stats = app.cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);

    // Both calls see the same ranking
    assert_eq!(first.len(), second.len());
    assert_eq!(first[0].ride_id, second[0].ride_id);
}

#[tokio::test]
async fn test_integration_identical_searches_rank_identically() {
    let app = test_app();
    let now = Utc::now();

    // Several equally-scored candidates; ties must hold their order
    for _ in 0..5 {
        let ride = create_test_ride(
            GeoPoint::new(12.97, 77.59),
            GeoPoint::new(12.93, 77.68),
            now,
            2,
            RideRules::default(),
        );
        RideRepository::save(app.store.as_ref(), &ride).await.unwrap();
    }

    let query = SearchQuery {
        rider_origin: GeoPoint::new(12.975, 77.595),
        rider_dest: GeoPoint::new(12.935, 77.685),
        requested_time: now,
    };

    let first = app.engine.search(&query, &create_test_prefs()).await.unwrap();
    app.cache.invalidate(&ridepool_algo::services::CacheKey::search(&query)).await;
    let second = app.engine.search(&query, &create_test_prefs()).await.unwrap();

    let first_ids: Vec<Uuid> = first.iter().map(|m| m.ride_id).collect();
    let second_ids: Vec<Uuid> = second.iter().map(|m| m.ride_id).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn test_integration_request_lifecycle_happy_path() {
    let app = test_app();
    let ride = create_test_ride(
        GeoPoint::new(12.97, 77.59),
        GeoPoint::new(12.93, 77.68),
        Utc::now(),
        2,
        RideRules::default(),
    );
    RideRepository::save(app.store.as_ref(), &ride).await.unwrap();

    let rider = Uuid::new_v4();
    let request = app.lifecycle.create_request(ride.id, rider).await.unwrap();
    assert_eq!(request.status, RequestStatus::Pending);

    let approved = app
        .lifecycle
        .approve(ride.id, request.id, ride.driver_id)
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);

    let stored = RideRepository::find_by_id(app.store.as_ref(), ride.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.available_seats, 1);
}

#[tokio::test]
async fn test_integration_approved_last_seat_blocks_new_requests() {
    let app = test_app();
    let ride = create_test_ride(
        GeoPoint::new(12.97, 77.59),
        GeoPoint::new(12.93, 77.68),
        Utc::now(),
        1,
        RideRules::default(),
    );
    RideRepository::save(app.store.as_ref(), &ride).await.unwrap();

    let request = app
        .lifecycle
        .create_request(ride.id, Uuid::new_v4())
        .await
        .unwrap();
    app.lifecycle
        .approve(ride.id, request.id, ride.driver_id)
        .await
        .unwrap();

    let err = app
        .lifecycle
        .create_request(ride.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_integration_full_ride_disappears_from_fresh_search() {
    let app = test_app();
    let now = Utc::now();
    let ride = create_test_ride(
        GeoPoint::new(12.97, 77.59),
        GeoPoint::new(12.93, 77.68),
        now,
        1,
        RideRules::default(),
    );
    RideRepository::save(app.store.as_ref(), &ride).await.unwrap();

    let request = app
        .lifecycle
        .create_request(ride.id, Uuid::new_v4())
        .await
        .unwrap();
    app.lifecycle
        .approve(ride.id, request.id, ride.driver_id)
        .await
        .unwrap();

    // No cached entry for this query yet, so the search sees storage
    let query = SearchQuery {
        rider_origin: GeoPoint::new(12.975, 77.595),
        rider_dest: GeoPoint::new(12.935, 77.685),
        requested_time: now,
    };
    let results = app.engine.search(&query, &create_test_prefs()).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_integration_double_approve_same_request() {
    let app = test_app();
    let ride = create_test_ride(
        GeoPoint::new(12.97, 77.59),
        GeoPoint::new(12.93, 77.68),
        Utc::now(),
        3,
        RideRules::default(),
    );
    RideRepository::save(app.store.as_ref(), &ride).await.unwrap();

    let request = app
        .lifecycle
        .create_request(ride.id, Uuid::new_v4())
        .await
        .unwrap();
    app.lifecycle
        .approve(ride.id, request.id, ride.driver_id)
        .await
        .unwrap();

    let err = app
        .lifecycle
        .approve(ride.id, request.id, ride.driver_id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::AlreadyProcessed(RequestStatus::Approved)
    ));

    // Only the first approval took a seat
    let stored = RideRepository::find_by_id(app.store.as_ref(), ride.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.available_seats, 2);
}
