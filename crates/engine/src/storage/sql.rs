use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, RuntimeErr,
    SqlErr, TransactionTrait, sea_query::Expr,
};

use super::{CarStore, ReservationStore, Storage, UnitOfWork, UserStore};
use crate::{
    Booking, Car, CarStatus, EngineError, NewCar, NewReservation, NewUser, Reservation,
    ResultEngine, User, cars, reservations, users,
};

/// [`Storage`] backed by a sea-orm connection pool.
#[derive(Clone, Debug)]
pub struct SqlStorage {
    database: DatabaseConnection,
}

impl SqlStorage {
    #[must_use]
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Storage for SqlStorage {
    async fn begin(&self) -> ResultEngine<Box<dyn UnitOfWork>> {
        let tx = self.database.begin().await.map_err(map_db_err)?;
        Ok(Box::new(SqlUnitOfWork { tx }))
    }
}

struct SqlUnitOfWork {
    tx: DatabaseTransaction,
}

impl SqlUnitOfWork {
    /// SQLite has no row locks; its database-wide write lock plus the version
    /// check in `save_*` serialize competing writers instead.
    fn locks_rows(&self) -> bool {
        self.tx.get_database_backend() != DatabaseBackend::Sqlite
    }
}

/// Primary SQLite result codes for lock contention.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Maps storage failures onto engine errors.
///
/// Lock contention surfaces as `Conflict` so callers can replay the unit of
/// work.
fn map_db_err(err: DbErr) -> EngineError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return EngineError::ExistingKey(detail);
    }
    if database_code(&err).is_some_and(|code| is_lock_contention(&code)) {
        return EngineError::Conflict(err.to_string());
    }
    EngineError::Database(err)
}

/// The driver-reported error code, when the failure came from the database.
fn database_code(err: &DbErr) -> Option<String> {
    let (DbErr::Conn(runtime) | DbErr::Exec(runtime) | DbErr::Query(runtime)) = err else {
        return None;
    };
    let RuntimeErr::SqlxError(sqlx_err) = runtime else {
        return None;
    };
    sqlx_err
        .as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code.into_owned())
}

/// SQLite reports extended result codes (e.g. 517 `SQLITE_BUSY_SNAPSHOT`);
/// the low byte is the primary code.
fn is_lock_contention(code: &str) -> bool {
    code.parse::<i32>()
        .is_ok_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

#[async_trait]
impl CarStore for SqlUnitOfWork {
    async fn car_for_update(&self, id: i64) -> ResultEngine<Car> {
        let mut query = cars::Entity::find_by_id(id);
        if self.locks_rows() {
            query = query.lock_exclusive();
        }
        let model = query
            .one(&self.tx)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| EngineError::KeyNotFound("car not exists".to_string()))?;
        Car::try_from(model)
    }

    async fn car(&self, id: i64) -> ResultEngine<Car> {
        let model = cars::Entity::find_by_id(id)
            .one(&self.tx)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| EngineError::KeyNotFound("car not exists".to_string()))?;
        Car::try_from(model)
    }

    async fn cars(&self, status: Option<CarStatus>) -> ResultEngine<Vec<Car>> {
        let mut query = cars::Entity::find().order_by_asc(cars::Column::Id);
        if let Some(status) = status {
            query = query.filter(cars::Column::Status.eq(status.as_str()));
        }
        query
            .all(&self.tx)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(Car::try_from)
            .collect()
    }

    async fn insert_car(&self, car: NewCar) -> ResultEngine<Car> {
        let model = cars::ActiveModel::from(&car)
            .insert(&self.tx)
            .await
            .map_err(map_db_err)?;
        Car::try_from(model)
    }

    async fn save_car(&self, car: &Car) -> ResultEngine<Car> {
        let now = Utc::now();
        let next_version = car.version + 1;
        let result = cars::Entity::update_many()
            .col_expr(cars::Column::Name, Expr::value(car.name.clone()))
            .col_expr(cars::Column::Category, Expr::value(car.category.clone()))
            .col_expr(
                cars::Column::PricePerDayMinor,
                Expr::value(car.price_per_day.minor()),
            )
            .col_expr(cars::Column::Status, Expr::value(car.status.as_str()))
            .col_expr(cars::Column::Version, Expr::value(next_version))
            .col_expr(cars::Column::UpdatedAt, Expr::value(now))
            .filter(cars::Column::Id.eq(car.id))
            .filter(cars::Column::Version.eq(car.version))
            .filter(cars::Column::Status.eq(CarStatus::Available.as_str()))
            .exec(&self.tx)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(EngineError::Conflict(format!(
                "car {} changed since it was read",
                car.id
            )));
        }
        Ok(Car {
            version: next_version,
            updated_at: now,
            ..car.clone()
        })
    }
}

#[async_trait]
impl UserStore for SqlUnitOfWork {
    async fn user_for_update(&self, id: i64) -> ResultEngine<User> {
        let mut query = users::Entity::find_by_id(id);
        if self.locks_rows() {
            query = query.lock_exclusive();
        }
        let model = query
            .one(&self.tx)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        Ok(User::from(model))
    }

    async fn user(&self, id: i64) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(id)
            .one(&self.tx)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        Ok(User::from(model))
    }

    async fn user_by_email(&self, email: &str) -> ResultEngine<Option<User>> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.tx)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(User::from))
    }

    async fn insert_user(&self, user: NewUser) -> ResultEngine<User> {
        let model = users::ActiveModel::from(&user)
            .insert(&self.tx)
            .await
            .map_err(|err| match map_db_err(err) {
                EngineError::ExistingKey(_) => EngineError::ExistingKey(user.email.clone()),
                other => other,
            })?;
        Ok(User::from(model))
    }

    async fn save_user(&self, user: &User) -> ResultEngine<User> {
        let now = Utc::now();
        let next_version = user.version + 1;
        let result = users::Entity::update_many()
            .col_expr(users::Column::Name, Expr::value(user.name.clone()))
            .col_expr(users::Column::BalanceMinor, Expr::value(user.balance.minor()))
            .col_expr(users::Column::Version, Expr::value(next_version))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(user.id))
            .filter(users::Column::Version.eq(user.version))
            .exec(&self.tx)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(EngineError::Conflict(format!(
                "user {} changed since it was read",
                user.id
            )));
        }
        Ok(User {
            version: next_version,
            updated_at: now,
            ..user.clone()
        })
    }
}

#[async_trait]
impl ReservationStore for SqlUnitOfWork {
    async fn insert_reservation(&self, reservation: NewReservation) -> ResultEngine<Reservation> {
        let model = reservations::ActiveModel::from(&reservation)
            .insert(&self.tx)
            .await
            .map_err(map_db_err)?;
        Ok(Reservation::from(model))
    }

    async fn reservations_for_user(&self, user_id: i64) -> ResultEngine<Vec<Booking>> {
        let rows = reservations::Entity::find()
            .find_also_related(cars::Entity)
            .filter(reservations::Column::UserId.eq(user_id))
            .order_by_desc(reservations::Column::CreatedAt)
            .order_by_desc(reservations::Column::Id)
            .all(&self.tx)
            .await
            .map_err(map_db_err)?;

        rows.into_iter()
            .map(|(reservation, car)| {
                let car = car.ok_or_else(|| {
                    EngineError::KeyNotFound(format!(
                        "car {} of reservation {} not exists",
                        reservation.car_id, reservation.id
                    ))
                })?;
                Ok(Booking {
                    reservation: Reservation::from(reservation),
                    car: Car::try_from(car)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl UnitOfWork for SqlUnitOfWork {
    async fn commit(self: Box<Self>) -> ResultEngine<()> {
        self.tx.commit().await.map_err(map_db_err)
    }

    async fn rollback(self: Box<Self>) -> ResultEngine<()> {
        self.tx.rollback().await.map_err(map_db_err)
    }
}

#[cfg(test)]
mod tests {
    use std::{borrow::Cow, error::Error, fmt};

    use sea_orm::sqlx::{
        self,
        error::{DatabaseError, ErrorKind},
    };

    use super::*;

    /// A driver error carrying only a result code.
    #[derive(Debug)]
    struct CodedError(&'static str);

    impl fmt::Display for CodedError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "driver error {}", self.0)
        }
    }

    impl Error for CodedError {}

    impl DatabaseError for CodedError {
        fn message(&self) -> &str {
            "driver error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    fn coded(code: &'static str) -> DbErr {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(Box::new(
            CodedError(code),
        ))))
    }

    #[test]
    fn busy_and_locked_codes_are_conflicts() {
        // BUSY, BUSY_SNAPSHOT, BUSY_TIMEOUT, LOCKED, LOCKED_SHAREDCACHE
        for code in ["5", "517", "773", "6", "262"] {
            assert!(
                matches!(map_db_err(coded(code)), EngineError::Conflict(_)),
                "code {code}"
            );
        }
    }

    #[test]
    fn other_codes_stay_database_errors() {
        // CONSTRAINT_CHECK, IOERR, non-numeric
        for code in ["275", "10", "HY000"] {
            assert!(
                matches!(map_db_err(coded(code)), EngineError::Database(_)),
                "code {code}"
            );
        }
    }

    #[test]
    fn lock_wording_without_a_code_is_not_a_conflict() {
        let err = DbErr::Custom("database is locked".to_string());
        assert!(matches!(map_db_err(err), EngineError::Database(_)));
    }
}
