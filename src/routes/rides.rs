use crate::error::Error;
use crate::models::{
    CreateRideRequest, HealthResponse, RequestStatusResponse, Ride, RideCreatedResponse,
    SearchQuery, SearchRidesQuery,
};
use crate::models::GeoPoint;
use crate::services::{
    PostgresStore, RequestLifecycle, RideRepository, RideSearchEngine, RiderProfileProvider,
    SearchCache,
};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RideSearchEngine>,
    pub lifecycle: Arc<RequestLifecycle>,
    pub rides: Arc<dyn RideRepository>,
    pub profiles: Arc<dyn RiderProfileProvider>,
    pub cache: Arc<SearchCache>,
    pub postgres: Arc<PostgresStore>,
}

/// Configure all ride-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/rides", web::post().to(create_ride))
        .route("/rides/search", web::get().to(search_rides))
        .route("/rides/driver/me", web::get().to(my_rides))
        .route("/rides/{ride_id}", web::get().to(ride_details))
        .route("/rides/{ride_id}/requests", web::post().to(create_join_request))
        .route("/rides/{ride_id}/requests", web::get().to(list_requests))
        .route(
            "/rides/{ride_id}/requests/{request_id}/approve",
            web::post().to(approve_request),
        )
        .route(
            "/rides/{ride_id}/requests/{request_id}/reject",
            web::post().to(reject_request),
        )
        .route("/cache/stats", web::get().to(cache_stats));
}

/// The acting user, taken from the X-User-Id header
///
/// Authentication lives upstream; this service only needs a stable
/// identity to authorize driver-side operations against.
fn acting_user(req: &HttpRequest) -> Result<Uuid, Error> {
    let header = req
        .headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Validation("X-User-Id header is required".to_string()))?;

    Uuid::parse_str(header)
        .map_err(|_| Error::Validation("X-User-Id must be a valid UUID".to_string()))
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.postgres.health_check().await.unwrap_or(false);
    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Driver publishes a new ride
///
/// POST /api/v1/rides
async fn create_ride(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    req: web::Json<CreateRideRequest>,
) -> Result<HttpResponse, Error> {
    req.validate()
        .map_err(|e| Error::Validation(e.to_string()))?;
    let driver_id = acting_user(&http_req)?;

    let ride = Ride {
        id: Uuid::new_v4(),
        driver_id,
        pickup: GeoPoint::new(req.pickup_lat, req.pickup_lng),
        dropoff: GeoPoint::new(req.drop_lat, req.drop_lng),
        departure_time: req.departure_time,
        total_seats: req.total_seats,
        available_seats: req.total_seats,
        rules: req.rules,
    };

    state.rides.save(&ride).await?;

    tracing::info!("Driver {} published ride {}", driver_id, ride.id);

    Ok(HttpResponse::Created().json(RideCreatedResponse { ride_id: ride.id }))
}

/// Rider searches for matching rides
///
/// GET /api/v1/rides/search?origLat=..&origLng=..&destLat=..&destLng=..&time=..
async fn search_rides(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    query: web::Query<SearchRidesQuery>,
) -> Result<HttpResponse, Error> {
    query
        .validate()
        .map_err(|e| Error::Validation(e.to_string()))?;
    let rider_id = acting_user(&http_req)?;

    let prefs = state.profiles.get_preferences(rider_id).await?;

    let search = SearchQuery {
        rider_origin: GeoPoint::new(query.orig_lat, query.orig_lng),
        rider_dest: GeoPoint::new(query.dest_lat, query.dest_lng),
        requested_time: query.time,
    };

    let results = state.engine.search(&search, &prefs).await?;

    tracing::info!(
        "Returning {} matches for rider {}",
        results.len(),
        rider_id
    );

    Ok(HttpResponse::Ok().json(results.as_ref()))
}

/// Ride details for riders and drivers
///
/// GET /api/v1/rides/{ride_id}
async fn ride_details(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, Error> {
    let ride_id = path.into_inner();
    let ride = state
        .rides
        .find_by_id(ride_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Ride {}", ride_id)))?;

    Ok(HttpResponse::Ok().json(ride))
}

/// All rides published by the calling driver
///
/// GET /api/v1/rides/driver/me
async fn my_rides(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, Error> {
    let driver_id = acting_user(&http_req)?;
    let rides = state.rides.find_by_driver(driver_id).await?;
    Ok(HttpResponse::Ok().json(rides))
}

/// Rider requests a seat
///
/// POST /api/v1/rides/{ride_id}/requests
async fn create_join_request(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, Error> {
    let rider_id = acting_user(&http_req)?;
    let request = state
        .lifecycle
        .create_request(path.into_inner(), rider_id)
        .await?;

    Ok(HttpResponse::Created().json(RequestStatusResponse {
        request_id: request.id,
        status: request.status,
    }))
}

/// Driver views the requests on one of their rides
///
/// GET /api/v1/rides/{ride_id}/requests
async fn list_requests(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, Error> {
    let acting = acting_user(&http_req)?;
    let requests = state
        .lifecycle
        .list_requests(path.into_inner(), acting)
        .await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// Driver approves a pending request
///
/// POST /api/v1/rides/{ride_id}/requests/{request_id}/approve
async fn approve_request(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, Error> {
    let (ride_id, request_id) = path.into_inner();
    let acting = acting_user(&http_req)?;

    let request = state.lifecycle.approve(ride_id, request_id, acting).await?;

    Ok(HttpResponse::Ok().json(RequestStatusResponse {
        request_id: request.id,
        status: request.status,
    }))
}

/// Driver rejects a pending request
///
/// POST /api/v1/rides/{ride_id}/requests/{request_id}/reject
async fn reject_request(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, Error> {
    let (ride_id, request_id) = path.into_inner();
    let acting = acting_user(&http_req)?;

    let request = state.lifecycle.reject(ride_id, request_id, acting).await?;

    Ok(HttpResponse::Ok().json(RequestStatusResponse {
        request_id: request.id,
        status: request.status,
    }))
}

/// Cache hit/miss bookkeeping
///
/// GET /api/v1/cache/stats
async fn cache_stats(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.cache.stats())
}
