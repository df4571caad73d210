use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{NewVehicle, Vehicle, VehiclePatch};
use crate::error::Error;
use crate::server::handlers::Deleted;
use crate::server::DynAPI;

#[derive(Debug, Serialize, Deserialize)]
pub struct VehicleBody {
    vehicle: Vehicle,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VehiclesBody {
    vehicles: Vec<Vehicle>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRideResponse {
    has_active_ride: bool,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<NewVehicle>,
) -> Result<(StatusCode, Json<VehicleBody>), Error> {
    let vehicle = api.create_vehicle(user, params).await?;

    Ok((StatusCode::CREATED, VehicleBody { vehicle }.into()))
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<VehiclesBody>, Error> {
    let vehicles = api.list_vehicles(user).await?;

    Ok(VehiclesBody { vehicles }.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleBody>, Error> {
    let vehicle = api.find_vehicle(user, id).await?;

    Ok(VehicleBody { vehicle }.into())
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
    Json(patch): Json<VehiclePatch>,
) -> Result<Json<VehicleBody>, Error> {
    let vehicle = api.update_vehicle(user, id, patch).await?;

    Ok(VehicleBody { vehicle }.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, Error> {
    api.delete_vehicle(user, id).await?;

    Ok(Deleted::OK.into())
}

pub async fn has_active_ride(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<ActiveRideResponse>, Error> {
    let has_active_ride = api.has_active_ride(user, id).await?;

    Ok(ActiveRideResponse { has_active_ride }.into())
}
