//! Reservation records.
//!
//! A `Reservation` is written exactly once, inside the unit of work that
//! debits the user and marks the car as rented. It is never edited afterwards.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{Car, Money};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub car_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A reservation together with the car it claims, for read paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Booking {
    pub reservation: Reservation,
    pub car: Car,
}

#[derive(Clone, Debug)]
pub struct NewReservation {
    pub user_id: i64,
    pub car_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub car_id: i64,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub total_price_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cars::Entity",
        from = "Column::CarId",
        to = "super::cars::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Cars,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::cars::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cars.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&NewReservation> for ActiveModel {
    fn from(reservation: &NewReservation) -> Self {
        let now = Utc::now();
        Self {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(reservation.user_id),
            car_id: ActiveValue::Set(reservation.car_id),
            start_date: ActiveValue::Set(reservation.start_date),
            end_date: ActiveValue::Set(reservation.end_date),
            total_price_minor: ActiveValue::Set(reservation.total_price.minor()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl From<Model> for Reservation {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            car_id: model.car_id,
            start_date: model.start_date,
            end_date: model.end_date,
            total_price: Money::new(model.total_price_minor),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
