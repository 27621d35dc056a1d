//! Storage capabilities used by the engine.
//!
//! Every operation runs against a [`UnitOfWork`] opened from a [`Storage`].
//! Reads made through a unit of work see its own uncommitted writes, and
//! nothing it wrote becomes visible until [`UnitOfWork::commit`].
//!
//! `save_*` methods are compare-and-swap on the entity `version`: when the
//! stored row no longer matches what was read they fail with
//! [`EngineError::Conflict`](crate::EngineError::Conflict) and write nothing.

use async_trait::async_trait;

use crate::{
    Booking, Car, CarStatus, NewCar, NewReservation, NewUser, Reservation, ResultEngine, User,
};

pub use sql::SqlStorage;

mod sql;

#[async_trait]
pub trait CarStore: Send + Sync {
    /// Loads a car and, where the backend supports it, locks its row until the
    /// unit of work ends.
    async fn car_for_update(&self, id: i64) -> ResultEngine<Car>;
    async fn car(&self, id: i64) -> ResultEngine<Car>;
    /// Lists cars ordered by id, optionally only those with `status`.
    async fn cars(&self, status: Option<CarStatus>) -> ResultEngine<Vec<Car>>;
    async fn insert_car(&self, car: NewCar) -> ResultEngine<Car>;
    /// Persists `car` if nobody changed it since it was read and it is still
    /// available. Returns the stored car with its bumped version.
    async fn save_car(&self, car: &Car) -> ResultEngine<Car>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user_for_update(&self, id: i64) -> ResultEngine<User>;
    async fn user(&self, id: i64) -> ResultEngine<User>;
    /// `email` must already be normalized.
    async fn user_by_email(&self, email: &str) -> ResultEngine<Option<User>>;
    async fn insert_user(&self, user: NewUser) -> ResultEngine<User>;
    async fn save_user(&self, user: &User) -> ResultEngine<User>;
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn insert_reservation(&self, reservation: NewReservation) -> ResultEngine<Reservation>;
    /// The user's reservations joined with their car, newest first.
    async fn reservations_for_user(&self, user_id: i64) -> ResultEngine<Vec<Booking>>;
}

/// An open storage transaction.
///
/// Dropping a unit of work without committing discards its writes.
#[async_trait]
pub trait UnitOfWork: CarStore + UserStore + ReservationStore {
    async fn commit(self: Box<Self>) -> ResultEngine<()>;
    async fn rollback(self: Box<Self>) -> ResultEngine<()>;
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn begin(&self) -> ResultEngine<Box<dyn UnitOfWork>>;
}
