use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{NewRide, Ride, RidePatch, RideStatus};
use crate::error::Error;
use crate::server::handlers::Deleted;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct StatusParams {
    status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RideBody {
    ride: Ride,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RidesBody {
    rides: Vec<Ride>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<NewRide>,
) -> Result<(StatusCode, Json<RideBody>), Error> {
    let ride = api.create_ride(user, params).await?;

    Ok((StatusCode::CREATED, RideBody { ride }.into()))
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<RidesBody>, Error> {
    let rides = api.list_rides(user).await?;

    Ok(RidesBody { rides }.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<RideBody>, Error> {
    let ride = api.find_ride(user, id).await?;

    Ok(RideBody { ride }.into())
}

pub async fn edit(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
    Json(patch): Json<RidePatch>,
) -> Result<Json<RideBody>, Error> {
    let ride = api.edit_ride(user, id, patch).await?;

    Ok(RideBody { ride }.into())
}

pub async fn update_status(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
    Json(params): Json<StatusParams>,
) -> Result<Json<RideBody>, Error> {
    let to: RideStatus = params.status.parse()?;
    let ride = api.transition_ride(user, id, to).await?;

    Ok(RideBody { ride }.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, Error> {
    api.delete_ride(user, id).await?;

    Ok(Deleted::OK.into())
}

pub async fn book_seat(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<RideBody>, Error> {
    let ride = api.book_seat(user, id).await?;

    Ok(RideBody { ride }.into())
}

pub async fn history(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<RidesBody>, Error> {
    let rides = api.ride_history(user).await?;

    Ok(RidesBody { rides }.into())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::entities::{NewVehicle, Place, Vehicle};

    fn ride() -> Ride {
        let now = Utc::now();
        let vehicle = Vehicle::new(
            Uuid::new_v4(),
            NewVehicle {
                class: "car".into(),
                plate_number: "CAR-1".into(),
                seat_capacity: 4,
            },
            now,
        )
        .unwrap();

        Ride::new(
            vehicle.owner_id,
            &vehicle,
            NewRide {
                vehicle_id: vehicle.id,
                origin: Place::new("Colombo"),
                destination: Place::new("Kandy"),
                departure_time: now + Duration::hours(1),
                price_per_seat: 1000.0,
                total_seats: 3,
            },
            now,
        )
        .unwrap()
    }

    #[test]
    fn rides_are_wrapped_like_the_web_client_expects() {
        let ride = ride();

        let single = serde_json::to_value(RideBody { ride: ride.clone() }).unwrap();
        assert_eq!(single["ride"]["id"], serde_json::json!(ride.id));
        assert_eq!(single["ride"]["availableSeats"], serde_json::json!(3));

        let many = serde_json::to_value(RidesBody { rides: vec![ride] }).unwrap();
        assert_eq!(many["rides"].as_array().map(Vec::len), Some(1));
    }
}
