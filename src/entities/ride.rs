use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Vehicle;
use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub label: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl Place {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            lat: None,
            lng: None,
        }
    }

    fn checked(self, field: &str) -> Result<Self, Error> {
        let label = self.label.trim();

        if label.is_empty() {
            return Err(Error::invalid_input(format!("{} label is required", field)));
        }

        let finite = |value: Option<f64>| value.map_or(true, f64::is_finite);
        if !finite(self.lat) || !finite(self.lng) {
            return Err(Error::invalid_input(format!(
                "{} coordinates must be finite",
                field
            )));
        }

        Ok(Self {
            label: label.to_string(),
            ..self
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Ongoing,
    Completed,
    Cancelled,
}

/// Every legal (from, to) pair. Anything else is an invalid transition.
const TRANSITIONS: [(Status, Status); 4] = [
    (Status::Pending, Status::Ongoing),
    (Status::Pending, Status::Cancelled),
    (Status::Ongoing, Status::Completed),
    (Status::Ongoing, Status::Cancelled),
];

impl Status {
    pub const ACTIVE: [Status; 2] = [Status::Pending, Status::Ongoing];
    pub const FINISHED: [Status; 2] = [Status::Completed, Status::Cancelled];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, to: Status) -> bool {
        TRANSITIONS.contains(&(*self, to))
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        !TRANSITIONS.iter().any(|(from, _)| from == self)
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "pending" => Ok(Self::Pending),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(Error::invalid_input(format!("unknown ride status {:?}", name))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub origin: Place,
    pub destination: Place,
    pub departure_time: DateTime<Utc>,
    pub price_per_seat: f64,
    pub total_seats: i32,
    pub booked_seats: i32,
    pub available_seats: i32,
    pub status: Status,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRide {
    pub vehicle_id: Uuid,
    pub origin: Place,
    pub destination: Place,
    pub departure_time: DateTime<Utc>,
    #[serde(default)]
    pub price_per_seat: f64,
    pub total_seats: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RidePatch {
    pub origin: Option<Place>,
    pub destination: Option<Place>,
    pub departure_time: Option<DateTime<Utc>>,
    pub price_per_seat: Option<f64>,
    pub total_seats: Option<i64>,
}

impl Ride {
    pub fn new(
        driver_id: Uuid,
        vehicle: &Vehicle,
        params: NewRide,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        if params.total_seats < 1 || params.total_seats > i64::from(vehicle.seat_capacity) {
            return Err(Error::InvalidSeats);
        }
        let total_seats = i32::try_from(params.total_seats).map_err(|_| Error::InvalidSeats)?;

        if params.departure_time <= now {
            return Err(Error::PastDeparture);
        }

        let origin = params.origin.checked("origin")?;
        let destination = params.destination.checked("destination")?;
        let price_per_seat = checked_price(params.price_per_seat)?;

        Ok(Self {
            id: Uuid::new_v4(),
            driver_id,
            vehicle_id: vehicle.id,
            origin,
            destination,
            departure_time: params.departure_time,
            price_per_seat,
            total_seats,
            booked_seats: 0,
            available_seats: total_seats,
            status: Status::Pending,
            version: 0,
            created_at: now,
        })
    }

    pub fn is_editable(&self, now: DateTime<Utc>) -> bool {
        self.status == Status::Pending && self.departure_time > now
    }

    /// Applies an owner edit to a copy. `booked_seats` is carried over untouched.
    pub fn patched(
        &self,
        patch: &RidePatch,
        seat_capacity: i32,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        if !self.is_editable(now) {
            return Err(Error::EditNotAllowed);
        }

        let mut ride = self.clone();

        if let Some(origin) = &patch.origin {
            ride.origin = origin.clone().checked("origin")?;
        }

        if let Some(destination) = &patch.destination {
            ride.destination = destination.clone().checked("destination")?;
        }

        if let Some(departure_time) = patch.departure_time {
            if departure_time <= now {
                return Err(Error::PastDeparture);
            }
            ride.departure_time = departure_time;
        }

        if let Some(price_per_seat) = patch.price_per_seat {
            ride.price_per_seat = checked_price(price_per_seat)?;
        }

        if let Some(total_seats) = patch.total_seats {
            if total_seats < 1 {
                return Err(Error::InvalidSeats);
            }
            if total_seats < i64::from(self.booked_seats) {
                return Err(Error::SeatsBelowBooked);
            }
            if total_seats > i64::from(seat_capacity) {
                return Err(Error::InvalidSeats);
            }

            ride.total_seats = i32::try_from(total_seats).map_err(|_| Error::InvalidSeats)?;
            ride.available_seats = ride.total_seats - ride.booked_seats;
        }

        Ok(ride)
    }

    #[tracing::instrument(skip(self), fields(ride_id = %self.id, from = self.status.name()))]
    pub fn transition(&mut self, to: Status) -> Result<(), Error> {
        if !self.status.can_transition_to(to) {
            return Err(Error::InvalidTransition {
                from: self.status,
                to,
            });
        }

        self.status = to;
        Ok(())
    }

    pub fn check_bookable(&self) -> Result<(), Error> {
        if self.status != Status::Pending {
            return Err(Error::NotPending);
        }

        if self.available_seats <= 0 {
            return Err(Error::SoldOut);
        }

        Ok(())
    }

    pub fn book_one_seat(&mut self) -> Result<(), Error> {
        self.check_bookable()?;

        self.booked_seats += 1;
        self.available_seats = self.total_seats - self.booked_seats;

        Ok(())
    }

    pub fn earnings(&self) -> f64 {
        f64::from(self.booked_seats) * self.price_per_seat
    }
}

fn checked_price(price_per_seat: f64) -> Result<f64, Error> {
    if !price_per_seat.is_finite() || price_per_seat < 0.0 {
        return Err(Error::invalid_input("price per seat must be a non-negative number"));
    }

    Ok(price_per_seat)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::entities::NewVehicle;

    fn car(seat_capacity: i64) -> Vehicle {
        let params = NewVehicle {
            class: "car".into(),
            plate_number: "CAR-1".into(),
            seat_capacity,
        };

        Vehicle::new(Uuid::new_v4(), params, Utc::now()).unwrap()
    }

    fn new_ride(vehicle: &Vehicle, total_seats: i64, now: DateTime<Utc>) -> NewRide {
        NewRide {
            vehicle_id: vehicle.id,
            origin: Place::new("Colombo"),
            destination: Place::new("Kandy"),
            departure_time: now + Duration::hours(2),
            price_per_seat: 1500.0,
            total_seats,
        }
    }

    #[test]
    fn only_listed_edges_are_legal() {
        use Status::*;

        let all = [Pending, Ongoing, Completed, Cancelled];
        let mut legal = Vec::new();

        for from in all {
            for to in all {
                if from.can_transition_to(to) {
                    legal.push((from, to));
                }
            }
        }

        assert_eq!(
            legal,
            vec![
                (Pending, Ongoing),
                (Pending, Cancelled),
                (Ongoing, Completed),
                (Ongoing, Cancelled)
            ]
        );

        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(Pending.is_active() && Ongoing.is_active());
        assert!(!Completed.is_active() && !Cancelled.is_active());
    }

    #[test]
    fn status_names_round_trip_through_from_str() {
        for status in [
            Status::Pending,
            Status::Ongoing,
            Status::Completed,
            Status::Cancelled,
        ] {
            assert_eq!(status.name().parse::<Status>().unwrap(), status);
        }

        assert!(matches!(
            "archived".parse::<Status>(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn new_ride_starts_pending_with_all_seats_available() {
        let now = Utc::now();
        let vehicle = car(4);
        let ride = Ride::new(vehicle.owner_id, &vehicle, new_ride(&vehicle, 3, now), now).unwrap();

        assert_eq!(ride.status, Status::Pending);
        assert_eq!(ride.booked_seats, 0);
        assert_eq!(ride.available_seats, 3);
        assert_eq!(ride.vehicle_id, vehicle.id);
    }

    #[test]
    fn new_ride_rejects_bad_seats_and_past_departure() {
        let now = Utc::now();
        let vehicle = car(4);

        let err = Ride::new(vehicle.owner_id, &vehicle, new_ride(&vehicle, 0, now), now);
        assert_eq!(err.unwrap_err(), Error::InvalidSeats);

        let err = Ride::new(vehicle.owner_id, &vehicle, new_ride(&vehicle, 5, now), now);
        assert_eq!(err.unwrap_err(), Error::InvalidSeats);

        let mut params = new_ride(&vehicle, 2, now);
        params.departure_time = now;
        let err = Ride::new(vehicle.owner_id, &vehicle, params, now);
        assert_eq!(err.unwrap_err(), Error::PastDeparture);

        let mut params = new_ride(&vehicle, 2, now);
        params.price_per_seat = -1.0;
        let err = Ride::new(vehicle.owner_id, &vehicle, params, now);
        assert!(matches!(err, Err(Error::InvalidInput(_))));

        let mut params = new_ride(&vehicle, 2, now);
        params.origin = Place::new("  ");
        let err = Ride::new(vehicle.owner_id, &vehicle, params, now);
        assert!(matches!(err, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn booking_fills_then_sells_out() {
        let now = Utc::now();
        let vehicle = car(2);
        let mut ride = Ride::new(vehicle.owner_id, &vehicle, new_ride(&vehicle, 2, now), now).unwrap();

        ride.book_one_seat().unwrap();
        ride.book_one_seat().unwrap();
        assert_eq!(ride.book_one_seat(), Err(Error::SoldOut));

        assert_eq!(ride.booked_seats, 2);
        assert_eq!(ride.available_seats, 0);
        assert_eq!(ride.earnings(), 3000.0);
    }

    #[test]
    fn booking_requires_pending() {
        let now = Utc::now();
        let vehicle = car(2);
        let mut ride = Ride::new(vehicle.owner_id, &vehicle, new_ride(&vehicle, 2, now), now).unwrap();

        ride.transition(Status::Ongoing).unwrap();
        assert_eq!(ride.book_one_seat(), Err(Error::NotPending));
        assert_eq!(ride.booked_seats, 0);
    }

    #[test]
    fn transition_rejects_self_loops_and_leaves_status() {
        let now = Utc::now();
        let vehicle = car(2);
        let mut ride = Ride::new(vehicle.owner_id, &vehicle, new_ride(&vehicle, 2, now), now).unwrap();

        assert_eq!(
            ride.transition(Status::Pending),
            Err(Error::InvalidTransition {
                from: Status::Pending,
                to: Status::Pending
            })
        );
        assert_eq!(ride.status, Status::Pending);

        ride.transition(Status::Cancelled).unwrap();
        assert!(ride.transition(Status::Cancelled).is_err());
        assert!(ride.transition(Status::Ongoing).is_err());
        assert_eq!(ride.status, Status::Cancelled);
    }

    #[test]
    fn patch_total_seats_respects_booked_and_capacity() {
        let now = Utc::now();
        let vehicle = car(4);
        let mut ride = Ride::new(vehicle.owner_id, &vehicle, new_ride(&vehicle, 4, now), now).unwrap();
        ride.book_one_seat().unwrap();
        ride.book_one_seat().unwrap();

        let patch = RidePatch {
            total_seats: Some(1),
            ..Default::default()
        };
        assert_eq!(ride.patched(&patch, 4, now), Err(Error::SeatsBelowBooked));

        let patch = RidePatch {
            total_seats: Some(5),
            ..Default::default()
        };
        assert_eq!(ride.patched(&patch, 4, now), Err(Error::InvalidSeats));

        let patch = RidePatch {
            total_seats: Some(3),
            ..Default::default()
        };
        let patched = ride.patched(&patch, 4, now).unwrap();
        assert_eq!(patched.total_seats, 3);
        assert_eq!(patched.booked_seats, 2);
        assert_eq!(patched.available_seats, 1);
    }

    #[test]
    fn patch_requires_pending_and_future_departure() {
        let now = Utc::now();
        let vehicle = car(4);
        let ride = Ride::new(vehicle.owner_id, &vehicle, new_ride(&vehicle, 4, now), now).unwrap();

        let later = ride.departure_time + Duration::minutes(1);
        assert_eq!(
            ride.patched(&RidePatch::default(), 4, later),
            Err(Error::EditNotAllowed)
        );

        let mut ongoing = ride.clone();
        ongoing.transition(Status::Ongoing).unwrap();
        assert_eq!(
            ongoing.patched(&RidePatch::default(), 4, now),
            Err(Error::EditNotAllowed)
        );

        let patch = RidePatch {
            departure_time: Some(now - Duration::minutes(1)),
            ..Default::default()
        };
        assert_eq!(ride.patched(&patch, 4, now), Err(Error::PastDeparture));
    }
}
