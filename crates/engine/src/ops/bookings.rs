use super::Engine;
use crate::{Booking, ResultEngine};

impl Engine {
    /// The user's reservations with their cars, newest first.
    pub async fn bookings(&self, user_id: i64) -> ResultEngine<Vec<Booking>> {
        self.with_uow(move |uow| {
            Box::pin(async move {
                // Surfaces KeyNotFound for unknown users instead of an empty list.
                uow.user(user_id).await?;
                uow.reservations_for_user(user_id).await
            })
        })
        .await
    }
}
