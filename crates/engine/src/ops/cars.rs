use super::Engine;
use crate::{Car, CarStatus, NewCar, ResultEngine};

impl Engine {
    /// Add a car to the fleet. New cars start `available`.
    pub async fn create_car(&self, car: NewCar) -> ResultEngine<Car> {
        let car = self
            .with_uow(move |uow| Box::pin(async move { uow.insert_car(car).await }))
            .await?;
        tracing::info!("car {} \"{}\" added at {}/day", car.id, car.name, car.price_per_day);
        Ok(car)
    }

    pub async fn car(&self, car_id: i64) -> ResultEngine<Car> {
        self.with_uow(move |uow| Box::pin(async move { uow.car(car_id).await }))
            .await
    }

    /// List the fleet ordered by id, optionally only the cars that can be
    /// rented right now.
    pub async fn cars(&self, available_only: bool) -> ResultEngine<Vec<Car>> {
        let status = available_only.then_some(CarStatus::Available);
        self.with_uow(move |uow| Box::pin(async move { uow.cars(status).await }))
            .await
    }
}
