//! The module contains `User` struct and its persistence model.
//!
//! Users are identified by an integer id; `email` is unique and stored in its
//! normalized form (see [`normalize_email`]).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, Money, ResultEngine};

/// A registered customer with a prepaid balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub balance: Money,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values required to insert a user. The password is already hashed.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Trims, NFKC-normalizes and lowercases an email address.
pub fn normalize_email(raw: &str) -> ResultEngine<String> {
    let email: String = raw.trim().nfkc().collect::<String>().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(EngineError::InvalidInput(format!("invalid email: {raw}")));
    }
    Ok(email)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub balance_minor: i64,
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

impl From<&NewUser> for ActiveModel {
    fn from(user: &NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(user.name.clone()),
            email: ActiveValue::Set(user.email.clone()),
            password_hash: ActiveValue::Set(user.password_hash.clone()),
            balance_minor: ActiveValue::Set(0),
            version: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            balance: Money::new(model.balance_minor),
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_and_trims() {
        assert_eq!(
            normalize_email("  John.Doe@Example.COM ").unwrap(),
            "john.doe@example.com"
        );
    }

    #[test]
    fn normalize_email_rejects_malformed_addresses() {
        assert!(normalize_email("john").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("john@").is_err());
        assert!(normalize_email("jo hn@example.com").is_err());
        assert!(normalize_email("a@b@c").is_err());
        assert_eq!(
            normalize_email("foo"),
            Err(EngineError::InvalidInput("invalid email: foo".to_string()))
        );
    }
}
