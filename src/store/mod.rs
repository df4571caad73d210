//! Durable storage for vehicles and rides.
//!
//! Each method is one atomic unit against the backend. Writes that replace an existing row
//! are compare-and-swap on the row `version`; a mismatch is reported as
//! [`StoreError::RaceConflict`] and leaves the row untouched.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{Ride, RideStatus, Vehicle};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("vehicle not found")]
    VehicleNotFound,
    #[error("ride not found")]
    RideNotFound,
    #[error("row changed since it was read")]
    RaceConflict,
    #[error("duplicate plate number")]
    DuplicatePlate,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a guarded vehicle write. Kept apart from [`StoreError`] so the
/// active-ride refusal has no blanket conversion into the engine error: callers must
/// say which mutation was blocked.
#[derive(Debug, Error, PartialEq)]
pub enum VehicleWriteError {
    #[error("vehicle backs an active ride")]
    ActiveRide,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `DuplicatePlate` if the owner already registered the plate.
    async fn insert_vehicle(&self, vehicle: &Vehicle) -> Result<(), StoreError>;

    async fn find_vehicle(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Vehicle>, StoreError>;

    /// Oldest first.
    async fn list_vehicles(&self, owner_id: Uuid) -> Result<Vec<Vehicle>, StoreError>;

    /// Writes `vehicle` (with its version bumped) only if the stored version still equals
    /// `expected_version` and no active ride references it, both checked in the same step.
    async fn replace_vehicle(
        &self,
        vehicle: &Vehicle,
        expected_version: i64,
    ) -> Result<Vehicle, VehicleWriteError>;

    /// Removes the vehicle only if no active ride references it, checked in the same step.
    async fn delete_vehicle(&self, owner_id: Uuid, id: Uuid) -> Result<(), VehicleWriteError>;

    async fn has_active_ride(&self, vehicle_id: Uuid) -> Result<bool, StoreError>;

    /// Inserts the ride only if its vehicle still exists for the ride's driver at
    /// `vehicle_version`, the version the seat count was validated against.
    async fn insert_ride(&self, ride: &Ride, vehicle_version: i64) -> Result<(), StoreError>;

    async fn find_ride(&self, driver_id: Uuid, id: Uuid) -> Result<Option<Ride>, StoreError>;

    /// Newest first.
    async fn list_rides(&self, driver_id: Uuid) -> Result<Vec<Ride>, StoreError>;

    /// Departure time, latest first.
    async fn list_rides_with_status(
        &self,
        driver_id: Uuid,
        statuses: &[RideStatus],
    ) -> Result<Vec<Ride>, StoreError>;

    /// Compare-and-swap on `expected_version`; returns the stored row.
    async fn replace_ride(&self, ride: &Ride, expected_version: i64) -> Result<Ride, StoreError>;

    /// Compare-and-swap delete on `expected_version`.
    async fn delete_ride(
        &self,
        driver_id: Uuid,
        id: Uuid,
        expected_version: i64,
    ) -> Result<(), StoreError>;

    /// Single conditional update: increments `booked_seats` only if the ride is pending and
    /// has a free seat at commit time. `None` means the predicate did not match.
    async fn book_seat(&self, driver_id: Uuid, id: Uuid) -> Result<Option<Ride>, StoreError>;
}
