use crate::error::Error;
use crate::models::{
    Gender, GeoPoint, JoinRequest, RequestStatus, Ride, RideRules, RiderPreferences,
};
use crate::services::repository::{RequestRepository, RideRepository, RiderProfileProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

/// PostgreSQL-backed storage for rides, join requests and rider
/// profiles
///
/// Seat reservation and request transitions are conditional UPDATEs,
/// so the seat invariant holds without any application-side locking.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;

        Ok(Self { pool })
    }

    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, Error> {
        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn ride_from_row(row: &PgRow) -> Ride {
    Ride {
        id: row.get("id"),
        driver_id: row.get("driver_id"),
        pickup: GeoPoint::new(row.get("pickup_lat"), row.get("pickup_lng")),
        dropoff: GeoPoint::new(row.get("drop_lat"), row.get("drop_lng")),
        departure_time: row.get("departure_time"),
        total_seats: row.get("total_seats"),
        available_seats: row.get("available_seats"),
        rules: RideRules {
            female_only: row.get("female_only"),
            no_smoking: row.get("no_smoking"),
            pet_allowed: row.get("pet_allowed"),
        },
    }
}

fn request_from_row(row: &PgRow) -> JoinRequest {
    JoinRequest {
        id: row.get("id"),
        ride_id: row.get("ride_id"),
        rider_id: row.get("rider_id"),
        status: row.get("status"),
        requested_at: row.get("requested_at"),
    }
}

fn gender_from_str(s: &str) -> Gender {
    match s {
        "male" => Gender::Male,
        "female" => Gender::Female,
        _ => Gender::Other,
    }
}

const RIDE_COLUMNS: &str = "id, driver_id, pickup_lat, pickup_lng, drop_lat, drop_lng, \
     departure_time, total_seats, available_seats, female_only, no_smoking, pet_allowed";

#[async_trait]
impl RideRepository for PostgresStore {
    async fn find_by_departure_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Ride>, Error> {
        let query = format!(
            "SELECT {RIDE_COLUMNS} FROM rides \
             WHERE departure_time >= $1 AND departure_time <= $2 AND available_seats > 0 \
             ORDER BY created_at"
        );

        let rows = sqlx::query(&query)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(ride_from_row).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ride>, Error> {
        let query = format!("SELECT {RIDE_COLUMNS} FROM rides WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(ride_from_row))
    }

    async fn find_by_driver(&self, driver_id: Uuid) -> Result<Vec<Ride>, Error> {
        let query = format!(
            "SELECT {RIDE_COLUMNS} FROM rides WHERE driver_id = $1 ORDER BY departure_time"
        );
        let rows = sqlx::query(&query)
            .bind(driver_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(ride_from_row).collect())
    }

    async fn save(&self, ride: &Ride) -> Result<(), Error> {
        let query = r#"
            INSERT INTO rides (id, driver_id, pickup_lat, pickup_lng, drop_lat, drop_lng,
                               departure_time, total_seats, available_seats,
                               female_only, no_smoking, pet_allowed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id)
            DO UPDATE SET
                departure_time = EXCLUDED.departure_time,
                total_seats = EXCLUDED.total_seats,
                available_seats = EXCLUDED.available_seats
        "#;

        sqlx::query(query)
            .bind(ride.id)
            .bind(ride.driver_id)
            .bind(ride.pickup.lat)
            .bind(ride.pickup.lng)
            .bind(ride.dropoff.lat)
            .bind(ride.dropoff.lng)
            .bind(ride.departure_time)
            .bind(ride.total_seats)
            .bind(ride.available_seats)
            .bind(ride.rules.female_only)
            .bind(ride.rules.no_smoking)
            .bind(ride.rules.pet_allowed)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn try_reserve_seat(&self, ride_id: Uuid) -> Result<bool, Error> {
        // Conditional decrement; the WHERE clause is what keeps two
        // racing approvals from both taking the last seat.
        let result = sqlx::query(
            "UPDATE rides SET available_seats = available_seats - 1 \
             WHERE id = $1 AND available_seats > 0",
        )
        .bind(ride_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn release_seat(&self, ride_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            "UPDATE rides SET available_seats = LEAST(available_seats + 1, total_seats) \
             WHERE id = $1",
        )
        .bind(ride_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RequestRepository for PostgresStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<JoinRequest>, Error> {
        let row = sqlx::query(
            "SELECT id, ride_id, rider_id, status, requested_at \
             FROM join_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(request_from_row))
    }

    async fn find_live_by_ride_and_rider(
        &self,
        ride_id: Uuid,
        rider_id: Uuid,
    ) -> Result<Option<JoinRequest>, Error> {
        let row = sqlx::query(
            "SELECT id, ride_id, rider_id, status, requested_at \
             FROM join_requests \
             WHERE ride_id = $1 AND rider_id = $2 AND status IN ('PENDING', 'APPROVED')",
        )
        .bind(ride_id)
        .bind(rider_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(request_from_row))
    }

    async fn find_by_ride(&self, ride_id: Uuid) -> Result<Vec<JoinRequest>, Error> {
        let rows = sqlx::query(
            "SELECT id, ride_id, rider_id, status, requested_at \
             FROM join_requests WHERE ride_id = $1 ORDER BY requested_at",
        )
        .bind(ride_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(request_from_row).collect())
    }

    async fn save(&self, request: &JoinRequest) -> Result<(), Error> {
        let query = r#"
            INSERT INTO join_requests (id, ride_id, rider_id, status, requested_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET status = EXCLUDED.status
        "#;

        sqlx::query(query)
            .bind(request.id)
            .bind(request.ride_id)
            .bind(request.rider_id)
            .bind(request.status)
            .bind(request.requested_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn try_transition(
        &self,
        request_id: Uuid,
        to: RequestStatus,
    ) -> Result<Option<JoinRequest>, Error> {
        // Status is write-once; the PENDING guard in the WHERE clause
        // enforces that even under concurrent transitions.
        let row = sqlx::query(
            "UPDATE join_requests SET status = $2 \
             WHERE id = $1 AND status = 'PENDING' \
             RETURNING id, ride_id, rider_id, status, requested_at",
        )
        .bind(request_id)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(request_from_row))
    }
}

#[async_trait]
impl RiderProfileProvider for PostgresStore {
    async fn get_preferences(&self, rider_id: Uuid) -> Result<RiderPreferences, Error> {
        let row = sqlx::query(
            "SELECT gender, smoking_allowed, pet_allowed \
             FROM rider_profiles WHERE rider_id = $1",
        )
        .bind(rider_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Preferences for rider {}", rider_id)))?;

        let gender: String = row.get("gender");
        Ok(RiderPreferences {
            gender: gender_from_str(&gender),
            smoking_allowed: row.get("smoking_allowed"),
            pet_allowed: row.get("pet_allowed"),
        })
    }
}
