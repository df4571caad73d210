//! Seat-capacity rules per vehicle class.

use std::ops::RangeInclusive;

use super::VehicleClass;

pub fn seat_range(class: VehicleClass) -> RangeInclusive<i64> {
    match class {
        VehicleClass::Bike => 1..=1,
        VehicleClass::Car => 1..=4,
        VehicleClass::Van => 8..=60,
        VehicleClass::MiniVan => 6..=20,
    }
}

/// Total over all inputs: an unknown class is never valid.
pub fn validate(class: &str, seat_capacity: i64) -> bool {
    match VehicleClass::parse(class) {
        Some(class) => seat_range(class).contains(&seat_capacity),
        None => false,
    }
}

#[test]
fn bike_requires_exactly_one_seat() {
    assert!(validate("bike", 1));
    assert!(!validate("bike", 0));
    assert!(!validate("bike", 2));
}

#[test]
fn car_allows_one_to_four() {
    assert!(validate("car", 1));
    assert!(validate("car", 4));
    assert!(!validate("car", 5));
    assert!(!validate("car", -1));
}

#[test]
fn van_and_mini_van_ranges() {
    assert!(!validate("van", 7));
    assert!(validate("van", 8));
    assert!(validate("van", 60));
    assert!(!validate("van", 61));

    assert!(!validate("mini_van", 5));
    assert!(validate("mini_van", 6));
    assert!(validate("mini_van", 20));
    assert!(!validate("mini_van", 21));
}

#[test]
fn unknown_class_is_rejected() {
    assert!(!validate("truck", 2));
    assert!(!validate("", 1));
    assert!(!validate("Car", 2));
}
