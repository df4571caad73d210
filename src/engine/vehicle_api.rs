use super::guard::{self, CrossEntityGuard, VehicleMutation};
use super::{retry_on_conflict, Engine};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::VehicleAPI,
    auth::{authorizor::MANAGE_VEHICLES, Platform, User},
    entities::{NewVehicle, Vehicle, VehiclePatch},
    error::Error,
    store::Store,
};

#[async_trait]
impl<S: Store> VehicleAPI for Engine<S> {
    #[tracing::instrument(skip(self))]
    async fn create_vehicle(&self, user: User, params: NewVehicle) -> Result<Vehicle, Error> {
        self.authorize(user.clone(), MANAGE_VEHICLES, Platform::default())?;

        let vehicle = Vehicle::new(user.id, params, self.now())?;
        self.store.insert_vehicle(&vehicle).await?;

        tracing::info!(vehicle_id = %vehicle.id, class = vehicle.class.name(), "vehicle registered");

        Ok(vehicle)
    }

    #[tracing::instrument(skip(self))]
    async fn find_vehicle(&self, user: User, id: Uuid) -> Result<Vehicle, Error> {
        self.authorize(user.clone(), MANAGE_VEHICLES, Platform::default())?;

        self.fetch_vehicle(user.id, id).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_vehicles(&self, user: User) -> Result<Vec<Vehicle>, Error> {
        self.authorize(user.clone(), MANAGE_VEHICLES, Platform::default())?;

        Ok(self.store.list_vehicles(user.id).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn update_vehicle(
        &self,
        user: User,
        id: Uuid,
        patch: VehiclePatch,
    ) -> Result<Vehicle, Error> {
        self.authorize(user.clone(), MANAGE_VEHICLES, Platform::default())?;

        let rides = &CrossEntityGuard::new(&self.store);
        let (user, patch) = (&user, &patch);

        let vehicle = retry_on_conflict(&self.retry, move || async move {
            let current = self.fetch_vehicle(user.id, id).await?;
            rides
                .ensure_vehicle_free(current.id, VehicleMutation::Update)
                .await?;

            let updated = current.patched(patch)?;

            // the store repeats the active-ride check under the same lock as the write
            guard::vehicle_write(
                self.store.replace_vehicle(&updated, current.version).await,
                VehicleMutation::Update,
            )
        })
        .await?;

        tracing::info!(vehicle_id = %vehicle.id, version = vehicle.version, "vehicle updated");

        Ok(vehicle)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_vehicle(&self, user: User, id: Uuid) -> Result<(), Error> {
        self.authorize(user.clone(), MANAGE_VEHICLES, Platform::default())?;

        let rides = &CrossEntityGuard::new(&self.store);
        let owner_id = user.id;

        retry_on_conflict(&self.retry, move || async move {
            let current = self.fetch_vehicle(owner_id, id).await?;
            rides
                .ensure_vehicle_free(current.id, VehicleMutation::Delete)
                .await?;

            guard::vehicle_write(
                self.store.delete_vehicle(owner_id, current.id).await,
                VehicleMutation::Delete,
            )
        })
        .await?;

        tracing::info!(vehicle_id = %id, "vehicle deleted");

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn has_active_ride(&self, user: User, id: Uuid) -> Result<bool, Error> {
        self.authorize(user.clone(), MANAGE_VEHICLES, Platform::default())?;

        let vehicle = self.fetch_vehicle(user.id, id).await?;

        CrossEntityGuard::new(&self.store)
            .has_active_ride(vehicle.id)
            .await
    }
}
