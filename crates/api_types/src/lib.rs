use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarStatus {
    Available,
    Rented,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRegister {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRegistered {
        pub user_id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i64,
        pub name: String,
        pub email: String,
        /// Prepaid balance in minor units (cents).
        pub balance_minor: i64,
        pub balance: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TopUp {
        /// Amount to credit, in minor units. Must be > 0.
        pub amount_minor: i64,
    }
}

pub mod car {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CarList {
        /// Only return cars that can be rented now.
        #[serde(default)]
        pub available: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CarView {
        pub id: i64,
        pub name: String,
        pub category: String,
        pub price_per_day_minor: i64,
        pub price_per_day: String,
        pub status: CarStatus,
    }
}

pub mod rent {
    use super::*;

    /// Dates are RFC 3339 instants or bare `YYYY-MM-DD` dates (midnight UTC).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RentNew {
        pub car_id: i64,
        pub start_date: String,
        pub end_date: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceRef {
        pub id: String,
        pub url: String,
    }

    /// A committed rent. `invoice` is `null` when the invoice could not be
    /// created; `invoice_error` then says why.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RentCreated {
        pub reservation_id: i64,
        pub total_price_minor: i64,
        pub total_price: String,
        pub invoice: Option<InvoiceRef>,
        pub invoice_error: Option<String>,
    }
}

pub mod booking {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingView {
        pub reservation_id: i64,
        pub car_id: i64,
        pub car_name: String,
        pub car_category: String,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        pub total_price_minor: i64,
        pub total_price: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingList {
        pub bookings: Vec<BookingView>,
    }
}
