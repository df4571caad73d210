use super::guard::ensure_ride_removable;
use super::{retry_on_conflict, Engine};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::RideAPI,
    auth::{authorizor::MANAGE_RIDES, Platform, User},
    entities::{EarningsSummary, NewRide, Ride, RidePatch, RideStatus},
    error::Error,
    store::Store,
};

#[async_trait]
impl<S: Store> RideAPI for Engine<S> {
    #[tracing::instrument(skip(self))]
    async fn create_ride(&self, user: User, params: NewRide) -> Result<Ride, Error> {
        self.authorize(user.clone(), MANAGE_RIDES, Platform::default())?;

        let (user, params) = (&user, &params);

        let ride = retry_on_conflict(&self.retry, move || async move {
            let vehicle = self.fetch_vehicle(user.id, params.vehicle_id).await?;
            let ride = Ride::new(user.id, &vehicle, params.clone(), self.now())?;

            // fails with a race conflict if the vehicle changed since it was read
            self.store.insert_ride(&ride, vehicle.version).await?;

            Ok(ride)
        })
        .await?;

        tracing::info!(
            ride_id = %ride.id,
            vehicle_id = %ride.vehicle_id,
            total_seats = ride.total_seats,
            "ride created"
        );

        Ok(ride)
    }

    #[tracing::instrument(skip(self))]
    async fn find_ride(&self, user: User, id: Uuid) -> Result<Ride, Error> {
        self.authorize(user.clone(), MANAGE_RIDES, Platform::default())?;

        self.fetch_ride(user.id, id).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_rides(&self, user: User) -> Result<Vec<Ride>, Error> {
        self.authorize(user.clone(), MANAGE_RIDES, Platform::default())?;

        Ok(self.store.list_rides(user.id).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn edit_ride(&self, user: User, id: Uuid, patch: RidePatch) -> Result<Ride, Error> {
        self.authorize(user.clone(), MANAGE_RIDES, Platform::default())?;

        let (user, patch) = (&user, &patch);

        retry_on_conflict(&self.retry, move || async move {
            let current = self.fetch_ride(user.id, id).await?;
            let now = self.now();

            let seat_capacity = match patch.total_seats {
                Some(_) if current.is_editable(now) => {
                    self.fetch_vehicle(user.id, current.vehicle_id)
                        .await?
                        .seat_capacity
                }
                _ => current.total_seats,
            };

            let updated = current.patched(patch, seat_capacity, now)?;

            // a booking that lands in between bumps the version and forces a re-read
            Ok(self.store.replace_ride(&updated, current.version).await?)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn transition_ride(&self, user: User, id: Uuid, to: RideStatus) -> Result<Ride, Error> {
        self.authorize(user.clone(), MANAGE_RIDES, Platform::default())?;

        let driver_id = user.id;

        let (from, ride) = retry_on_conflict(&self.retry, move || async move {
            let current = self.fetch_ride(driver_id, id).await?;

            let mut next = current.clone();
            next.transition(to)?;

            let stored = self.store.replace_ride(&next, current.version).await?;
            Ok((current.status, stored))
        })
        .await?;

        tracing::info!(
            ride_id = %ride.id,
            from = from.name(),
            to = ride.status.name(),
            "ride status changed"
        );

        Ok(ride)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_ride(&self, user: User, id: Uuid) -> Result<(), Error> {
        self.authorize(user.clone(), MANAGE_RIDES, Platform::default())?;

        let driver_id = user.id;

        retry_on_conflict(&self.retry, move || async move {
            let current = self.fetch_ride(driver_id, id).await?;
            ensure_ride_removable(&current, self.now())?;

            Ok(self
                .store
                .delete_ride(driver_id, current.id, current.version)
                .await?)
        })
        .await?;

        tracing::info!(ride_id = %id, "ride deleted");

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn ride_history(&self, user: User) -> Result<Vec<Ride>, Error> {
        self.authorize(user.clone(), MANAGE_RIDES, Platform::default())?;

        Ok(self
            .store
            .list_rides_with_status(user.id, &RideStatus::FINISHED)
            .await?)
    }

    #[tracing::instrument(skip(self))]
    async fn earnings_summary(&self, user: User) -> Result<EarningsSummary, Error> {
        self.authorize(user.clone(), MANAGE_RIDES, Platform::default())?;

        let completed = self
            .store
            .list_rides_with_status(user.id, &[RideStatus::Completed])
            .await?;

        Ok(EarningsSummary::from_rides(&completed))
    }
}
