use super::{retry_on_conflict, Engine};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::SeatAPI,
    auth::{authorizor::MANAGE_RIDES, Platform, User},
    entities::Ride,
    error::Error,
    store::Store,
};

#[async_trait]
impl<S: Store> SeatAPI for Engine<S> {
    #[tracing::instrument(skip(self))]
    async fn book_seat(&self, user: User, ride_id: Uuid) -> Result<Ride, Error> {
        self.authorize(user.clone(), MANAGE_RIDES, Platform::default())?;

        let driver_id = user.id;
        let ride =
            retry_on_conflict(&self.retry, move || self.try_book_seat(driver_id, ride_id)).await?;

        tracing::info!(
            ride_id = %ride.id,
            booked_seats = ride.booked_seats,
            available_seats = ride.available_seats,
            "seat booked"
        );

        Ok(ride)
    }
}

impl<S: Store> Engine<S> {
    async fn try_book_seat(&self, driver_id: Uuid, ride_id: Uuid) -> Result<Ride, Error> {
        if let Some(ride) = self.store.book_seat(driver_id, ride_id).await? {
            return Ok(ride);
        }

        // the conditional increment matched nothing, classify against the committed row
        let ride = self.fetch_ride(driver_id, ride_id).await?;
        ride.check_bookable()?;

        tracing::debug!(ride_id = %ride_id, "ride became bookable after the increment missed");
        Err(Error::RaceConflict)
    }
}
