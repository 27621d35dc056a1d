use super::{Engine, retry_on_conflict};
use crate::{
    Car, CarStatus, EngineError, Invoice, InvoiceError, InvoiceRequest, NewReservation,
    Notification, RentCmd, RentOutcome, Reservation, ResultEngine, User, is_available, price_for,
};

impl Engine {
    /// Reserve a car for a user, paying from the user's balance.
    ///
    /// Availability, ownership of funds and price are checked and the
    /// reservation, debit and car status change are written in a single unit
    /// of work. A lost write race is replayed once.
    ///
    /// Once committed, an invoice is requested and a confirmation mail is
    /// sent; neither can fail the rent.
    pub async fn rent(&self, cmd: RentCmd) -> ResultEngine<RentOutcome> {
        let (reservation, user, car) = retry_on_conflict("rent", || self.try_rent(cmd)).await?;
        tracing::info!(
            "reservation {} committed: user {} rented car {} for {}",
            reservation.id,
            user.id,
            car.id,
            reservation.total_price
        );

        let invoice = self.request_invoice(&reservation, &user, &car).await;
        self.notify(confirmation(&reservation, &user, &car, invoice.as_ref().ok()))
            .await;

        Ok(RentOutcome {
            reservation,
            invoice,
        })
    }

    async fn try_rent(&self, cmd: RentCmd) -> ResultEngine<(Reservation, User, Car)> {
        self.with_uow(move |uow| {
            Box::pin(async move {
                let car = uow.car_for_update(cmd.car_id).await?;
                if !is_available(&car) {
                    return Err(EngineError::CarUnavailable(format!(
                        "car {} is already rented",
                        car.id
                    )));
                }
                let user = uow.user_for_update(cmd.user_id).await?;
                let total_price = price_for(&car, cmd.start_date, cmd.end_date)?;
                if total_price > user.balance {
                    return Err(EngineError::InsufficientBalance(format!(
                        "balance {} does not cover {}",
                        user.balance, total_price
                    )));
                }

                let reservation = uow
                    .insert_reservation(NewReservation {
                        user_id: user.id,
                        car_id: car.id,
                        start_date: cmd.start_date,
                        end_date: cmd.end_date,
                        total_price,
                    })
                    .await?;
                let balance = user.balance.checked_sub(total_price).ok_or_else(|| {
                    EngineError::InvalidAmount("balance underflow".to_string())
                })?;
                let user = uow.save_user(&User { balance, ..user }).await?;
                let car = uow
                    .save_car(&Car {
                        status: CarStatus::Rented,
                        ..car
                    })
                    .await?;
                Ok((reservation, user, car))
            })
        })
        .await
    }

    async fn request_invoice(
        &self,
        reservation: &Reservation,
        user: &User,
        car: &Car,
    ) -> Result<Invoice, InvoiceError> {
        let Some(invoices) = &self.invoices else {
            return Err(InvoiceError::NotConfigured);
        };
        let request = InvoiceRequest {
            external_id: format!("reservation-{}", reservation.id),
            payer_name: user.name.clone(),
            payer_email: user.email.clone(),
            item_name: car.name.clone(),
            amount: reservation.total_price,
            description: format!(
                "Rental of {} from {} to {}",
                car.name,
                reservation.start_date.date_naive(),
                reservation.end_date.date_naive()
            ),
        };
        let result = invoices.create_invoice(request).await;
        if let Err(err) = &result {
            tracing::warn!(
                "reservation {} kept without invoice: {err}",
                reservation.id
            );
        }
        result
    }
}

fn confirmation(
    reservation: &Reservation,
    user: &User,
    car: &Car,
    invoice: Option<&Invoice>,
) -> Notification {
    let mut body = format!(
        "Hello {},\n\nyour reservation #{} of {} ({}) from {} to {} is confirmed.\nTotal price: {}\nRemaining balance: {}\n",
        user.name,
        reservation.id,
        car.name,
        car.category,
        reservation.start_date.to_rfc3339(),
        reservation.end_date.to_rfc3339(),
        reservation.total_price,
        user.balance
    );
    if let Some(invoice) = invoice {
        body.push_str(&format!("Invoice: {}\n", invoice.url));
    }
    Notification {
        to: user.email.clone(),
        subject: format!("Reservation #{} confirmed", reservation.id),
        body,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::Money;

    #[test]
    fn confirmation_mentions_invoice_when_present() {
        let at = Utc.with_ymd_and_hms(2024, 12, 20, 0, 0, 0).unwrap();
        let reservation = Reservation {
            id: 9,
            user_id: 1,
            car_id: 2,
            start_date: at,
            end_date: at + chrono::Duration::days(1),
            total_price: Money::new(100_00),
            created_at: at,
            updated_at: at,
        };
        let user = User {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: String::new(),
            balance: Money::new(100_00),
            version: 1,
            created_at: at,
            updated_at: at,
        };
        let car = Car {
            id: 2,
            name: "Avanza".to_string(),
            category: "MPV".to_string(),
            price_per_day: Money::new(100_00),
            status: CarStatus::Rented,
            version: 1,
            created_at: at,
            updated_at: at,
        };
        let invoice = Invoice {
            id: "inv_1".to_string(),
            url: "https://pay.example/inv_1".to_string(),
        };

        let mail = confirmation(&reservation, &user, &car, Some(&invoice));
        assert_eq!(mail.to, "ana@example.com");
        assert_eq!(mail.subject, "Reservation #9 confirmed");
        assert!(mail.body.contains("Total price: 100.00"));
        assert!(mail.body.contains("https://pay.example/inv_1"));

        let mail = confirmation(&reservation, &user, &car, None);
        assert!(!mail.body.contains("Invoice:"));
    }
}
