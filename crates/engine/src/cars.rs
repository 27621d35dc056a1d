//! The module contains `Car` struct and its persistence model.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

/// Rental status of a car.
///
/// Only `Available -> Rented` is ever applied by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarStatus {
    Available,
    Rented,
}

impl CarStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Rented => "rented",
        }
    }
}

impl TryFrom<&str> for CarStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "available" => Ok(Self::Available),
            "rented" => Ok(Self::Rented),
            other => Err(EngineError::InvalidInput(format!(
                "invalid car status: {other}"
            ))),
        }
    }
}

/// A car offered for rent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Car {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price_per_day: Money,
    pub status: CarStatus,
    /// Optimistic-lock counter, bumped by every successful save.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values required to register a new car.
#[derive(Clone, Debug)]
pub struct NewCar {
    pub name: String,
    pub category: String,
    pub price_per_day: Money,
}

impl NewCar {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price_per_day: Money,
    ) -> ResultEngine<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(EngineError::InvalidInput(
                "car name must not be empty".to_string(),
            ));
        }
        if price_per_day.is_negative() {
            return Err(EngineError::InvalidAmount(
                "price_per_day must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            name,
            category: category.into().trim().to_string(),
            price_per_day,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cars")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price_per_day_minor: i64,
    pub status: String,
    pub version: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reservations::Entity")]
    Reservations,
}

impl Related<super::reservations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&NewCar> for ActiveModel {
    fn from(car: &NewCar) -> Self {
        let now = Utc::now();
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(car.name.clone()),
            category: ActiveValue::Set(car.category.clone()),
            price_per_day_minor: ActiveValue::Set(car.price_per_day.minor()),
            status: ActiveValue::Set(CarStatus::Available.as_str().to_string()),
            version: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl TryFrom<Model> for Car {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            category: model.category,
            price_per_day: Money::new(model.price_per_day_minor),
            status: CarStatus::try_from(model.status.as_str())?,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [CarStatus::Available, CarStatus::Rented] {
            assert_eq!(CarStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(matches!(
            CarStatus::try_from("returned"),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn new_car_rejects_negative_rate_and_blank_name() {
        assert!(matches!(
            NewCar::new("Avanza", "MPV", Money::new(-1)),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            NewCar::new("   ", "MPV", Money::new(100)),
            Err(EngineError::InvalidInput(_))
        ));

        let car = NewCar::new(" Avanza ", " MPV ", Money::ZERO).unwrap();
        assert_eq!(car.name, "Avanza");
        assert_eq!(car.category, "MPV");
    }
}
