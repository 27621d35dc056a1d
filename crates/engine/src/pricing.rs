//! Availability and pricing rules.
//!
//! Pure functions: nothing here reads or locks storage. The rent transaction
//! feeds them the rows it has already loaded inside its unit of work.

use chrono::{DateTime, Utc};

use crate::{Car, CarStatus, EngineError, Money, ResultEngine};

const HOURS_PER_DAY: i64 = 24;

/// Returns `true` when the car can be claimed by a new reservation.
#[must_use]
pub fn is_available(car: &Car) -> bool {
    car.status == CarStatus::Available
}

/// Number of billable days between `start` and `end`.
///
/// Whole elapsed hours are integer-divided by 24, so partial days are
/// dropped: 36 hours bill as 1 day, 23 hours as 0.
pub fn rental_days(start: DateTime<Utc>, end: DateTime<Utc>) -> ResultEngine<i64> {
    if end <= start {
        return Err(EngineError::InvalidDateRange(format!(
            "end_date {end} must be after start_date {start}"
        )));
    }
    Ok((end - start).num_hours() / HOURS_PER_DAY)
}

/// Total price of renting `car` from `start` to `end`.
pub fn price_for(car: &Car, start: DateTime<Utc>, end: DateTime<Utc>) -> ResultEngine<Money> {
    let days = rental_days(start, end)?;
    car.price_per_day
        .checked_mul(days)
        .ok_or_else(|| EngineError::InvalidAmount("rental price overflows".to_string()))
}
