use api_types::car::{CarList, CarView};
use axum::{
    Json,
    extract::{Query, State},
};
use engine::Car;

use crate::{ServerError, server::ServerState};

fn status_view(status: engine::CarStatus) -> api_types::CarStatus {
    match status {
        engine::CarStatus::Available => api_types::CarStatus::Available,
        engine::CarStatus::Rented => api_types::CarStatus::Rented,
    }
}

fn car_view(car: Car) -> CarView {
    CarView {
        id: car.id,
        price_per_day_minor: car.price_per_day.minor(),
        price_per_day: car.price_per_day.to_string(),
        status: status_view(car.status),
        name: car.name,
        category: car.category,
    }
}

/// `GET /cars[?available=true]`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CarList>,
) -> Result<Json<Vec<CarView>>, ServerError> {
    let cars = state.engine.cars(query.available).await?;
    Ok(Json(cars.into_iter().map(car_view).collect()))
}
