pub mod capacity;
mod earnings;
mod ride;
mod vehicle;

pub use earnings::{EarningsItem, EarningsSummary};
pub use ride::{NewRide, Place, Ride, RidePatch, Status as RideStatus};
pub use vehicle::{NewVehicle, Vehicle, VehicleClass, VehiclePatch};
