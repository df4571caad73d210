mod guard;
mod retry;
mod ride_api;
mod seat_api;
mod vehicle_api;


pub use guard::{CrossEntityGuard, VehicleMutation};
pub use retry::{retry_on_conflict, RetryPolicy, RetryPolicyBuilder};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use oso::Oso;

use crate::{
    api::API,
    auth::authorizor,
    clock::{Clock, SystemClock},
    entities::{Ride, Vehicle},
    error::{Entity, Error},
    store::Store,
};

/// Consistency engine over a [`Store`]. Every mutation is one atomic store step,
/// retried a bounded number of times when it loses an optimistic-concurrency race.
pub struct Engine<S> {
    store: S,
    authorizor: Oso,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl<S: Store> Engine<S> {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub fn new(store: S) -> Result<Self, Error> {
        Ok(Self {
            store,
            authorizor: authorizor::new()?,
            clock: Arc::new(SystemClock),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn authorize<Actor, Action, Resource>(
        &self,
        actor: Actor,
        action: Action,
        resource: Resource,
    ) -> Result<(), Error>
    where
        Actor: oso::ToPolar,
        Action: oso::ToPolar,
        Resource: oso::ToPolar,
    {
        if self.authorizor.is_allowed(actor, action, resource)? {
            return Ok(());
        }

        Err(Error::Unauthorized)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    async fn fetch_vehicle(&self, owner_id: uuid::Uuid, id: uuid::Uuid) -> Result<Vehicle, Error> {
        self.store
            .find_vehicle(owner_id, id)
            .await?
            .ok_or(Error::NotFound(Entity::Vehicle))
    }

    async fn fetch_ride(&self, driver_id: uuid::Uuid, id: uuid::Uuid) -> Result<Ride, Error> {
        self.store
            .find_ride(driver_id, id)
            .await?
            .ok_or(Error::NotFound(Entity::Ride))
    }
}

impl<S: Store> API for Engine<S> {}
