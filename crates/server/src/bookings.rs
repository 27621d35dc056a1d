use api_types::booking::{BookingList, BookingView};
use axum::{Extension, Json, extract::State};
use engine::{Booking, User};

use crate::{ServerError, server::ServerState};

fn booking_view(booking: Booking) -> BookingView {
    let Booking { reservation, car } = booking;
    BookingView {
        reservation_id: reservation.id,
        car_id: car.id,
        car_name: car.name,
        car_category: car.category,
        start_date: reservation.start_date,
        end_date: reservation.end_date,
        total_price_minor: reservation.total_price.minor(),
        total_price: reservation.total_price.to_string(),
        created_at: reservation.created_at,
    }
}

/// `GET /booking`: the caller's reservations, newest first.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<BookingList>, ServerError> {
    let bookings = state.engine.bookings(user.id).await?;
    Ok(Json(BookingList {
        bookings: bookings.into_iter().map(booking_view).collect(),
    }))
}
