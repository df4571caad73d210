use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Ride, RideStatus};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsItem {
    pub ride_id: Uuid,
    pub departure_time: DateTime<Utc>,
    pub from: String,
    pub to: String,
    pub booked_seats: i32,
    pub price_per_seat: f64,
    pub earnings: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsSummary {
    pub total_earnings: f64,
    pub total_completed_rides: usize,
    pub items: Vec<EarningsItem>,
}

impl EarningsSummary {
    /// Aggregates over completed rides only; other statuses are ignored.
    pub fn from_rides(rides: &[Ride]) -> Self {
        let mut items: Vec<EarningsItem> = rides
            .iter()
            .filter(|ride| ride.status == RideStatus::Completed)
            .map(|ride| EarningsItem {
                ride_id: ride.id,
                departure_time: ride.departure_time,
                from: ride.origin.label.clone(),
                to: ride.destination.label.clone(),
                booked_seats: ride.booked_seats,
                price_per_seat: ride.price_per_seat,
                earnings: ride.earnings(),
            })
            .collect();

        items.sort_by(|a, b| b.departure_time.cmp(&a.departure_time));

        Self {
            total_earnings: items.iter().map(|item| item.earnings).sum(),
            total_completed_rides: items.len(),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::entities::{NewRide, NewVehicle, Place, Vehicle};

    fn ride(vehicle: &Vehicle, hours: i64, price: f64, booked: i32, status: RideStatus) -> Ride {
        let now = Utc::now();
        let params = NewRide {
            vehicle_id: vehicle.id,
            origin: Place::new("A"),
            destination: Place::new("B"),
            departure_time: now + Duration::hours(hours),
            price_per_seat: price,
            total_seats: 4,
        };

        let mut ride = Ride::new(vehicle.owner_id, vehicle, params, now).unwrap();
        for _ in 0..booked {
            ride.book_one_seat().unwrap();
        }
        ride.status = status;
        ride
    }

    #[test]
    fn summary_counts_only_completed_rides() {
        let vehicle = Vehicle::new(
            Uuid::new_v4(),
            NewVehicle {
                class: "car".into(),
                plate_number: "E-1".into(),
                seat_capacity: 4,
            },
            Utc::now(),
        )
        .unwrap();

        let rides = vec![
            ride(&vehicle, 1, 100.0, 2, RideStatus::Completed),
            ride(&vehicle, 3, 50.0, 4, RideStatus::Completed),
            ride(&vehicle, 2, 999.0, 3, RideStatus::Cancelled),
            ride(&vehicle, 4, 999.0, 1, RideStatus::Pending),
        ];

        let summary = EarningsSummary::from_rides(&rides);

        assert_eq!(summary.total_completed_rides, 2);
        assert_eq!(summary.total_earnings, 400.0);
        assert_eq!(summary.items[0].earnings, 200.0);
        assert_eq!(summary.items[1].earnings, 200.0);
        assert!(summary.items[0].departure_time > summary.items[1].departure_time);
    }

    #[test]
    fn empty_summary() {
        let summary = EarningsSummary::from_rides(&[]);

        assert_eq!(summary, EarningsSummary::default());
    }
}
