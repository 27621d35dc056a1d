//! Car rental domain: cars, users, reservations and the rent transaction.
//!
//! All writes go through [`Engine`], which runs each operation inside a
//! storage [`UnitOfWork`] and calls the invoice and notification gateways
//! only after the unit of work has committed.

pub use cars::{Car, CarStatus, NewCar};
pub use commands::{RegisterUserCmd, RentCmd, RentOutcome, TopUpCmd};
pub use credentials::{hash_password, verify_password};
pub use error::EngineError;
pub use gateways::{
    Invoice, InvoiceError, InvoiceGateway, InvoiceRequest, Notification, Notifier, NotifyError,
};
pub use money::Money;
pub use ops::{Engine, EngineBuilder};
pub use pricing::{is_available, price_for, rental_days};
pub use reservations::{Booking, NewReservation, Reservation};
pub use storage::{CarStore, ReservationStore, SqlStorage, Storage, UnitOfWork, UserStore};
pub use users::{NewUser, User, normalize_email};

pub mod cars;
pub mod commands;
mod credentials;
mod error;
mod gateways;
mod money;
mod ops;
mod pricing;
pub mod reservations;
mod storage;
pub mod users;

pub type ResultEngine<T> = Result<T, EngineError>;
