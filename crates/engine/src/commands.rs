//! Command structs for engine operations.
//!
//! These types group parameters for write operations (register, top-up,
//! rent), keeping call sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc};

use crate::{Invoice, InvoiceError, Money, Reservation};

/// Register a customer account.
#[derive(Clone, Debug)]
pub struct RegisterUserCmd {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterUserCmd {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Credit a user's prepaid balance.
#[derive(Clone, Copy, Debug)]
pub struct TopUpCmd {
    pub user_id: i64,
    pub amount: Money,
}

impl TopUpCmd {
    #[must_use]
    pub fn new(user_id: i64, amount: Money) -> Self {
        Self { user_id, amount }
    }
}

/// Reserve a car for `[start_date, end_date)`.
#[derive(Clone, Copy, Debug)]
pub struct RentCmd {
    pub user_id: i64,
    pub car_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl RentCmd {
    #[must_use]
    pub fn new(
        user_id: i64,
        car_id: i64,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            car_id,
            start_date,
            end_date,
        }
    }
}

/// Result of a committed rent.
///
/// `invoice` carries the outcome of the post-commit invoice call; an `Err`
/// there does not undo the reservation.
#[derive(Clone, Debug)]
pub struct RentOutcome {
    pub reservation: Reservation,
    pub invoice: Result<Invoice, InvoiceError>,
}
