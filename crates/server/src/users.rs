//! Account endpoints: registration, profile and balance top-up.

use api_types::user::{TopUp, UserRegister, UserRegistered, UserView};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{Money, RegisterUserCmd, TopUpCmd, User};

use crate::{ServerError, server::ServerState};

fn user_view(user: &User) -> UserView {
    UserView {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        balance_minor: user.balance.minor(),
        balance: user.balance.to_string(),
    }
}

pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<UserRegister>, JsonRejection>,
) -> Result<(StatusCode, Json<UserRegistered>), ServerError> {
    let Json(payload) = payload?;
    let user = state
        .engine
        .register_user(RegisterUserCmd::new(
            payload.name,
            payload.email,
            payload.password,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(UserRegistered { user_id: user.id })))
}

pub async fn me(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user(user.id).await?;
    Ok(Json(user_view(&user)))
}

pub async fn top_up(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    payload: Result<Json<TopUp>, JsonRejection>,
) -> Result<Json<UserView>, ServerError> {
    let Json(payload) = payload?;
    let user = state
        .engine
        .top_up(TopUpCmd::new(user.id, Money::new(payload.amount_minor)))
        .await?;
    Ok(Json(user_view(&user)))
}
