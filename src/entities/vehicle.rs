use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::capacity;
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Bike,
    Car,
    Van,
    MiniVan,
}

impl VehicleClass {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bike => "bike",
            Self::Car => "car",
            Self::Van => "van",
            Self::MiniVan => "mini_van",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "bike" => Some(Self::Bike),
            "car" => Some(Self::Car),
            "van" => Some(Self::Van),
            "mini_van" => Some(Self::MiniVan),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub class: VehicleClass,
    pub plate_number: String,
    pub seat_capacity: i32,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    pub class: String,
    pub plate_number: String,
    pub seat_capacity: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePatch {
    pub class: Option<String>,
    pub plate_number: Option<String>,
    pub seat_capacity: Option<i64>,
}

impl Vehicle {
    pub fn new(owner_id: Uuid, params: NewVehicle, now: DateTime<Utc>) -> Result<Self, Error> {
        let (class, seat_capacity) = checked_capacity(&params.class, params.seat_capacity)?;
        let plate_number = checked_plate(&params.plate_number)?;

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            class,
            plate_number,
            seat_capacity,
            version: 0,
            created_at: now,
        })
    }

    /// Applies the patch to a copy. Capacity is re-validated whenever class or capacity changes.
    pub fn patched(&self, patch: &VehiclePatch) -> Result<Self, Error> {
        let mut vehicle = self.clone();

        if patch.class.is_some() || patch.seat_capacity.is_some() {
            let class = patch.class.as_deref().unwrap_or(self.class.name());
            let seat_capacity = patch
                .seat_capacity
                .unwrap_or_else(|| i64::from(self.seat_capacity));

            let (class, seat_capacity) = checked_capacity(class, seat_capacity)?;
            vehicle.class = class;
            vehicle.seat_capacity = seat_capacity;
        }

        if let Some(plate_number) = &patch.plate_number {
            vehicle.plate_number = checked_plate(plate_number)?;
        }

        Ok(vehicle)
    }
}

fn checked_capacity(class: &str, seat_capacity: i64) -> Result<(VehicleClass, i32), Error> {
    let invalid = || Error::InvalidCapacity {
        class: class.to_string(),
        seat_capacity,
    };

    if !capacity::validate(class, seat_capacity) {
        return Err(invalid());
    }

    let class = VehicleClass::parse(class).ok_or_else(invalid)?;
    let seat_capacity = i32::try_from(seat_capacity).map_err(|_| invalid())?;

    Ok((class, seat_capacity))
}

fn checked_plate(plate_number: &str) -> Result<String, Error> {
    let plate_number = plate_number.trim();

    if plate_number.is_empty() {
        return Err(Error::invalid_input("plate number is required"));
    }

    Ok(plate_number.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_car(seat_capacity: i64) -> NewVehicle {
        NewVehicle {
            class: "car".into(),
            plate_number: " AB-123 ".into(),
            seat_capacity,
        }
    }

    #[test]
    fn new_vehicle_trims_plate() {
        let vehicle = Vehicle::new(Uuid::new_v4(), new_car(4), Utc::now()).unwrap();

        assert_eq!(vehicle.class, VehicleClass::Car);
        assert_eq!(vehicle.plate_number, "AB-123");
        assert_eq!(vehicle.seat_capacity, 4);
        assert_eq!(vehicle.version, 0);
    }

    #[test]
    fn bike_with_two_seats_is_rejected() {
        let params = NewVehicle {
            class: "bike".into(),
            plate_number: "B-1".into(),
            seat_capacity: 2,
        };

        let err = Vehicle::new(Uuid::new_v4(), params, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidCapacity {
                class: "bike".into(),
                seat_capacity: 2
            }
        );
    }

    #[test]
    fn unknown_class_is_invalid_capacity() {
        let params = NewVehicle {
            class: "truck".into(),
            plate_number: "T-1".into(),
            seat_capacity: 2,
        };

        let err = Vehicle::new(Uuid::new_v4(), params, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::InvalidCapacity { .. }));
    }

    #[test]
    fn blank_plate_is_invalid_input() {
        let params = NewVehicle {
            plate_number: "   ".into(),
            ..new_car(2)
        };

        let err = Vehicle::new(Uuid::new_v4(), params, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn patch_revalidates_capacity_against_new_class() {
        let vehicle = Vehicle::new(Uuid::new_v4(), new_car(4), Utc::now()).unwrap();

        // car with 4 seats cannot become a bike without lowering capacity
        let patch = VehiclePatch {
            class: Some("bike".into()),
            ..Default::default()
        };
        assert!(matches!(
            vehicle.patched(&patch),
            Err(Error::InvalidCapacity { .. })
        ));

        let patch = VehiclePatch {
            class: Some("bike".into()),
            seat_capacity: Some(1),
            ..Default::default()
        };
        let patched = vehicle.patched(&patch).unwrap();
        assert_eq!(patched.class, VehicleClass::Bike);
        assert_eq!(patched.seat_capacity, 1);

        // the source vehicle is untouched
        assert_eq!(vehicle.class, VehicleClass::Car);
    }

    #[test]
    fn patch_capacity_only_keeps_class() {
        let vehicle = Vehicle::new(Uuid::new_v4(), new_car(4), Utc::now()).unwrap();

        let patch = VehiclePatch {
            seat_capacity: Some(5),
            ..Default::default()
        };
        assert!(vehicle.patched(&patch).is_err());

        let patch = VehiclePatch {
            seat_capacity: Some(2),
            plate_number: Some("NEW-1".into()),
            ..Default::default()
        };
        let patched = vehicle.patched(&patch).unwrap();
        assert_eq!(patched.seat_capacity, 2);
        assert_eq!(patched.plate_number, "NEW-1");
    }
}
