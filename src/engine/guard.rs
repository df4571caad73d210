//! Invariants spanning vehicles and rides.
//!
//! A vehicle backing an active ride (pending or ongoing) can be neither edited nor
//! deleted, and a ride with committed seats can never be removed. The pre-checks here
//! give fast typed failures; the store re-evaluates the vehicle condition inside the same
//! atomic step as the write it protects, which is what actually holds the invariant.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::{Ride, RideStatus};
use crate::error::Error;
use crate::store::{Store, VehicleWriteError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VehicleMutation {
    Update,
    Delete,
}

impl VehicleMutation {
    fn blocked(self) -> Error {
        match self {
            Self::Update => Error::ActiveRideBlocksEdit,
            Self::Delete => Error::ActiveRideBlocksDelete,
        }
    }
}

pub struct CrossEntityGuard<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> CrossEntityGuard<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn has_active_ride(&self, vehicle_id: Uuid) -> Result<bool, Error> {
        Ok(self.store.has_active_ride(vehicle_id).await?)
    }

    pub async fn ensure_vehicle_free(
        &self,
        vehicle_id: Uuid,
        mutation: VehicleMutation,
    ) -> Result<(), Error> {
        if self.has_active_ride(vehicle_id).await? {
            return Err(mutation.blocked());
        }

        Ok(())
    }
}

/// Translates the outcome of a guarded vehicle write. The only way from a
/// [`VehicleWriteError`] to an [`Error`].
pub fn vehicle_write<T>(
    result: Result<T, VehicleWriteError>,
    mutation: VehicleMutation,
) -> Result<T, Error> {
    result.map_err(|err| match err {
        VehicleWriteError::ActiveRide => mutation.blocked(),
        VehicleWriteError::Store(err) => err.into(),
    })
}

/// Checked in this order: committed seats, status, departure.
pub fn ensure_ride_removable(ride: &Ride, now: DateTime<Utc>) -> Result<(), Error> {
    if ride.booked_seats > 0 {
        return Err(Error::HasBookedSeats);
    }

    if ride.status != RideStatus::Pending {
        return Err(Error::NotPending);
    }

    if ride.departure_time <= now {
        return Err(Error::PastDeparture);
    }

    Ok(())
}
