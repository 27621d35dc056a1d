use super::{Engine, normalize_required_name, retry_on_conflict};
use crate::{
    EngineError, NewUser, Notification, RegisterUserCmd, ResultEngine, TopUpCmd, User,
    hash_password, normalize_email, verify_password,
};

impl Engine {
    /// Create a customer account with an empty balance.
    ///
    /// The welcome mail is sent after commit; failing to send it does not
    /// undo the registration.
    pub async fn register_user(&self, cmd: RegisterUserCmd) -> ResultEngine<User> {
        let name = normalize_required_name(&cmd.name, "user")?;
        let email = normalize_email(&cmd.email)?;
        let password_hash = hash_password(&cmd.password)?;
        let new_user = NewUser {
            name,
            email,
            password_hash,
        };

        let user = self
            .with_uow(move |uow| {
                Box::pin(async move {
                    if uow.user_by_email(&new_user.email).await?.is_some() {
                        return Err(EngineError::ExistingKey(new_user.email));
                    }
                    uow.insert_user(new_user).await
                })
            })
            .await?;
        tracing::info!("registered user {} <{}>", user.id, user.email);

        self.notify(Notification {
            to: user.email.clone(),
            subject: "Welcome".to_string(),
            body: format!(
                "Hello {},\n\nyour account is ready. Top up your balance to start renting.\n",
                user.name
            ),
        })
        .await;
        Ok(user)
    }

    /// Resolve HTTP basic credentials to a user.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let unauthorized = || EngineError::Unauthorized("invalid credentials".to_string());
        let email = normalize_email(email).map_err(|_| unauthorized())?;
        let user = self
            .with_uow(move |uow| Box::pin(async move { uow.user_by_email(&email).await }))
            .await?
            .ok_or_else(unauthorized)?;
        if !verify_password(password, &user.password_hash) {
            return Err(unauthorized());
        }
        Ok(user)
    }

    pub async fn user(&self, user_id: i64) -> ResultEngine<User> {
        self.with_uow(move |uow| Box::pin(async move { uow.user(user_id).await }))
            .await
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        self.with_uow(move |uow| {
            Box::pin(async move {
                uow.user_by_email(&email)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
            })
        })
        .await
    }

    /// Credit `cmd.amount` to the user's balance and return the updated user.
    pub async fn top_up(&self, cmd: TopUpCmd) -> ResultEngine<User> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "top-up amount must be > 0".to_string(),
            ));
        }
        let user = retry_on_conflict("top_up", || {
            self.with_uow(move |uow| {
                Box::pin(async move {
                    let user = uow.user_for_update(cmd.user_id).await?;
                    let balance = user.balance.checked_add(cmd.amount).ok_or_else(|| {
                        EngineError::InvalidAmount("balance too large".to_string())
                    })?;
                    uow.save_user(&User { balance, ..user }).await
                })
            })
        })
        .await?;
        tracing::info!(
            "user {} topped up {}, balance {}",
            user.id,
            cmd.amount,
            user.balance
        );
        Ok(user)
    }
}
