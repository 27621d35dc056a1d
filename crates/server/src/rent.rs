use api_types::rent::{InvoiceRef, RentCreated, RentNew};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use engine::{RentCmd, User};

use crate::{ServerError, server::ServerState};

/// Accepts an RFC 3339 instant or a bare `YYYY-MM-DD` date (midnight UTC).
fn parse_date(field: &str, value: &str) -> Result<DateTime<Utc>, ServerError> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| {
            ServerError::Generic(format!(
                "{field} must be an RFC 3339 timestamp or YYYY-MM-DD, got \"{value}\""
            ))
        })
}

pub async fn rent_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    payload: Result<Json<RentNew>, JsonRejection>,
) -> Result<(StatusCode, Json<RentCreated>), ServerError> {
    let Json(payload) = payload?;
    let start_date = parse_date("start_date", &payload.start_date)?;
    let end_date = parse_date("end_date", &payload.end_date)?;

    let outcome = state
        .engine
        .rent(RentCmd::new(user.id, payload.car_id, start_date, end_date))
        .await?;

    let (invoice, invoice_error) = match outcome.invoice {
        Ok(invoice) => (
            Some(InvoiceRef {
                id: invoice.id,
                url: invoice.url,
            }),
            None,
        ),
        Err(err) => (None, Some(err.to_string())),
    };
    let total_price = outcome.reservation.total_price;

    Ok((
        StatusCode::CREATED,
        Json(RentCreated {
            reservation_id: outcome.reservation.id,
            total_price_minor: total_price.minor(),
            total_price: total_price.to_string(),
            invoice,
            invoice_error,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parses_rfc3339_and_bare_dates() {
        let expected = Utc.with_ymd_and_hms(2024, 12, 20, 0, 0, 0).unwrap();
        assert_eq!(
            parse_date("start_date", "2024-12-20T00:00:00Z").ok(),
            Some(expected)
        );
        assert_eq!(
            parse_date("start_date", "2024-12-20T07:00:00+07:00").ok(),
            Some(expected)
        );
        assert_eq!(parse_date("start_date", " 2024-12-20 ").ok(), Some(expected));
    }

    #[test]
    fn rejects_other_formats() {
        assert!(parse_date("start_date", "20/12/2024").is_err());
        assert!(parse_date("start_date", "").is_err());
    }
}
