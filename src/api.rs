use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{
    EarningsSummary, NewRide, NewVehicle, Ride, RidePatch, RideStatus, Vehicle, VehiclePatch,
};
use crate::error::Error;

#[async_trait]
pub trait VehicleAPI {
    async fn create_vehicle(&self, user: User, params: NewVehicle) -> Result<Vehicle, Error>;
    async fn find_vehicle(&self, user: User, id: Uuid) -> Result<Vehicle, Error>;
    async fn list_vehicles(&self, user: User) -> Result<Vec<Vehicle>, Error>;
    async fn update_vehicle(
        &self,
        user: User,
        id: Uuid,
        patch: VehiclePatch,
    ) -> Result<Vehicle, Error>;
    async fn delete_vehicle(&self, user: User, id: Uuid) -> Result<(), Error>;
    async fn has_active_ride(&self, user: User, id: Uuid) -> Result<bool, Error>;
}

#[async_trait]
pub trait RideAPI {
    async fn create_ride(&self, user: User, params: NewRide) -> Result<Ride, Error>;
    async fn find_ride(&self, user: User, id: Uuid) -> Result<Ride, Error>;
    async fn list_rides(&self, user: User) -> Result<Vec<Ride>, Error>;
    async fn edit_ride(&self, user: User, id: Uuid, patch: RidePatch) -> Result<Ride, Error>;
    async fn transition_ride(&self, user: User, id: Uuid, to: RideStatus) -> Result<Ride, Error>;
    async fn delete_ride(&self, user: User, id: Uuid) -> Result<(), Error>;
    async fn ride_history(&self, user: User) -> Result<Vec<Ride>, Error>;
    async fn earnings_summary(&self, user: User) -> Result<EarningsSummary, Error>;
}

#[async_trait]
pub trait SeatAPI {
    async fn book_seat(&self, user: User, ride_id: Uuid) -> Result<Ride, Error>;
}

pub trait API: VehicleAPI + RideAPI + SeatAPI {}
