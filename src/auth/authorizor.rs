use oso::{Oso, PolarClass};

use crate::auth::{Platform, User};
use crate::error::Error;

pub const MANAGE_VEHICLES: &str = "manage_vehicles";
pub const MANAGE_RIDES: &str = "manage_rides";

pub fn new() -> Result<Oso, Error> {
    let mut o = Oso::new();

    o.register_class(Platform::get_polar_class())?;
    o.register_class(User::get_polar_class())?;

    o.load_str(include_str!("rules.polar"))?;

    Ok(o)
}

#[test]
fn driver_manages_vehicles_and_rides() {
    use uuid::Uuid;

    let authorizor = new().unwrap();

    let driver = User::driver(Uuid::new_v4());

    let result = authorizor.is_allowed(driver.clone(), MANAGE_VEHICLES, Platform::default());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(driver.clone(), MANAGE_RIDES, Platform::default());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(driver.clone(), "delete_platform", Platform::default());
    assert_eq!(result.unwrap(), false);
}

#[test]
fn other_roles_are_refused() {
    use crate::auth::Role;
    use uuid::Uuid;

    let authorizor = new().unwrap();

    for role in [Role::Passenger, Role::Admin] {
        let user = User::new(Uuid::new_v4(), role);

        let result = authorizor.is_allowed(user.clone(), MANAGE_VEHICLES, Platform::default());
        assert_eq!(result.unwrap(), false);

        let result = authorizor.is_allowed(user.clone(), MANAGE_RIDES, Platform::default());
        assert_eq!(result.unwrap(), false);
    }
}
