use std::collections::HashMap;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Store, StoreError, VehicleWriteError};
use crate::entities::{Ride, RideStatus, Vehicle};

#[derive(Debug, Default)]
struct State {
    vehicles: HashMap<Uuid, Vehicle>,
    rides: HashMap<Uuid, Ride>,
}

impl State {
    fn has_active_ride(&self, vehicle_id: Uuid) -> bool {
        self.rides
            .values()
            .any(|ride| ride.vehicle_id == vehicle_id && ride.status.is_active())
    }

    fn owned_vehicle(&self, owner_id: Uuid, id: Uuid) -> Option<&Vehicle> {
        self.vehicles
            .get(&id)
            .filter(|vehicle| vehicle.owner_id == owner_id)
    }

    fn owned_ride_mut(&mut self, driver_id: Uuid, id: Uuid) -> Option<&mut Ride> {
        self.rides
            .get_mut(&id)
            .filter(|ride| ride.driver_id == driver_id)
    }

    fn plate_taken(&self, vehicle: &Vehicle) -> bool {
        self.vehicles.values().any(|other| {
            other.id != vehicle.id
                && other.owner_id == vehicle.owner_id
                && other.plate_number == vehicle.plate_number
        })
    }
}

/// In-process store. Every call runs under one lock, so each call is a single atomic step.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    #[cfg(test)]
    pending_conflicts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` versioned writes fail with a race conflict.
    #[cfg(test)]
    pub fn inject_conflicts(&self, count: usize) {
        self.pending_conflicts.store(count, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn take_injected_conflict(&self) -> bool {
        self.pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    #[cfg(not(test))]
    fn take_injected_conflict(&self) -> bool {
        false
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_vehicle(&self, vehicle: &Vehicle) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        if state.plate_taken(vehicle) {
            return Err(StoreError::DuplicatePlate);
        }

        state.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn find_vehicle(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Vehicle>, StoreError> {
        let state = self.state.lock().await;

        Ok(state.owned_vehicle(owner_id, id).cloned())
    }

    async fn list_vehicles(&self, owner_id: Uuid) -> Result<Vec<Vehicle>, StoreError> {
        let state = self.state.lock().await;

        let mut vehicles: Vec<Vehicle> = state
            .vehicles
            .values()
            .filter(|vehicle| vehicle.owner_id == owner_id)
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(vehicles)
    }

    async fn replace_vehicle(
        &self,
        vehicle: &Vehicle,
        expected_version: i64,
    ) -> Result<Vehicle, VehicleWriteError> {
        let mut state = self.state.lock().await;

        let current = state
            .owned_vehicle(vehicle.owner_id, vehicle.id)
            .ok_or(StoreError::VehicleNotFound)?;

        if current.version != expected_version || self.take_injected_conflict() {
            return Err(StoreError::RaceConflict.into());
        }

        if state.has_active_ride(vehicle.id) {
            return Err(VehicleWriteError::ActiveRide);
        }

        if state.plate_taken(vehicle) {
            return Err(StoreError::DuplicatePlate.into());
        }

        let mut stored = vehicle.clone();
        stored.version = expected_version + 1;
        state.vehicles.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn delete_vehicle(&self, owner_id: Uuid, id: Uuid) -> Result<(), VehicleWriteError> {
        let mut state = self.state.lock().await;

        if state.owned_vehicle(owner_id, id).is_none() {
            return Err(StoreError::VehicleNotFound.into());
        }

        if state.has_active_ride(id) {
            return Err(VehicleWriteError::ActiveRide);
        }

        state.vehicles.remove(&id);
        Ok(())
    }

    async fn has_active_ride(&self, vehicle_id: Uuid) -> Result<bool, StoreError> {
        let state = self.state.lock().await;

        Ok(state.has_active_ride(vehicle_id))
    }

    async fn insert_ride(&self, ride: &Ride, vehicle_version: i64) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        let vehicle = state
            .owned_vehicle(ride.driver_id, ride.vehicle_id)
            .ok_or(StoreError::VehicleNotFound)?;

        if vehicle.version != vehicle_version {
            return Err(StoreError::RaceConflict);
        }

        state.rides.insert(ride.id, ride.clone());
        Ok(())
    }

    async fn find_ride(&self, driver_id: Uuid, id: Uuid) -> Result<Option<Ride>, StoreError> {
        let state = self.state.lock().await;

        Ok(state
            .rides
            .get(&id)
            .filter(|ride| ride.driver_id == driver_id)
            .cloned())
    }

    async fn list_rides(&self, driver_id: Uuid) -> Result<Vec<Ride>, StoreError> {
        let state = self.state.lock().await;

        let mut rides: Vec<Ride> = state
            .rides
            .values()
            .filter(|ride| ride.driver_id == driver_id)
            .cloned()
            .collect();
        rides.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(rides)
    }

    async fn list_rides_with_status(
        &self,
        driver_id: Uuid,
        statuses: &[RideStatus],
    ) -> Result<Vec<Ride>, StoreError> {
        let state = self.state.lock().await;

        let mut rides: Vec<Ride> = state
            .rides
            .values()
            .filter(|ride| ride.driver_id == driver_id && statuses.contains(&ride.status))
            .cloned()
            .collect();
        rides.sort_by(|a, b| b.departure_time.cmp(&a.departure_time));

        Ok(rides)
    }

    async fn replace_ride(&self, ride: &Ride, expected_version: i64) -> Result<Ride, StoreError> {
        let conflict = self.take_injected_conflict();
        let mut state = self.state.lock().await;

        let current = state
            .owned_ride_mut(ride.driver_id, ride.id)
            .ok_or(StoreError::RideNotFound)?;

        if current.version != expected_version || conflict {
            return Err(StoreError::RaceConflict);
        }

        *current = ride.clone();
        current.version = expected_version + 1;

        Ok(current.clone())
    }

    async fn delete_ride(
        &self,
        driver_id: Uuid,
        id: Uuid,
        expected_version: i64,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        let current = state
            .owned_ride_mut(driver_id, id)
            .ok_or(StoreError::RideNotFound)?;

        if current.version != expected_version || self.take_injected_conflict() {
            return Err(StoreError::RaceConflict);
        }

        state.rides.remove(&id);
        Ok(())
    }

    async fn book_seat(&self, driver_id: Uuid, id: Uuid) -> Result<Option<Ride>, StoreError> {
        let mut state = self.state.lock().await;

        let ride = match state.owned_ride_mut(driver_id, id) {
            Some(ride) => ride,
            None => return Ok(None),
        };

        if ride.book_one_seat().is_err() {
            return Ok(None);
        }
        ride.version += 1;

        Ok(Some(ride.clone()))
    }
}
