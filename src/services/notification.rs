//! Booking confirmation delivery through an HTTP mail gateway.
//!
//! Delivery is best-effort by contract: a booking that committed stays
//! committed whether or not the confirmation goes out, so every failure here
//! is logged and swallowed.

use bigdecimal::BigDecimal;
use serde::Serialize;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::config::NotificationConfig;

/// Seat details rendered into the confirmation body.
#[derive(Debug, Clone)]
pub struct SeatLine {
    pub seat_number: String,
    pub seat_type: String,
    pub price: BigDecimal,
}

#[derive(Debug, Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

#[derive(Clone)]
pub struct NotificationClient {
    http_client: reqwest::Client,
    gateway_url: String,
    from_address: String,
    enabled: bool,
}

impl NotificationClient {
    pub fn from_config(config: &NotificationConfig) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            gateway_url: config.gateway_url.clone(),
            from_address: config.from_address.clone(),
            enabled: config.enabled,
        }
    }

    /// Plain-text confirmation body listing every seat in the batch.
    pub fn format_body(
        customer_name: &str,
        seats: &[SeatLine],
        booking_uid: &str,
        total: &BigDecimal,
    ) -> String {
        let mut body = format!(
            "Dear {},\n\nYour show booking is confirmed.\nBooking ID: {}\n\nSeats:\n",
            customer_name, booking_uid
        );
        for seat in seats {
            body.push_str(&format!(
                "  {} ({}) - {}\n",
                seat.seat_number, seat.seat_type, seat.price
            ));
        }
        body.push_str(&format!("\nTotal charged to wallet: {}\n\nEnjoy the show!\nMovie Magic", total));
        body
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), reqwest::Error> {
        let request = SendMailRequest {
            from: &self.from_address,
            to,
            subject,
            body,
        };

        self.http_client
            .post(&self.gateway_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// Formats and sends the confirmation for a committed booking. Spawned off
    /// the request path after the transaction commits.
    pub async fn send_booking_confirmation(
        &self,
        to: &str,
        customer_name: &str,
        seats: &[SeatLine],
        booking_uid: &str,
        total: &BigDecimal,
    ) {
        if !self.enabled {
            return;
        }

        let subject = format!(
            "Your Movie Magic Booking Confirmation - Booking ID: {}",
            booking_uid
        );
        let body = Self::format_body(customer_name, seats, booking_uid, total);

        match self.send(to, &subject, &body).await {
            Ok(()) => info!("confirmation sent to {} for booking {}", to, booking_uid),
            Err(e) => warn!(
                "failed to send confirmation for booking {}: {:?}",
                booking_uid, e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_lists_every_seat_and_the_booking_id() {
        let seats = vec![
            SeatLine {
                seat_number: "A1".to_string(),
                seat_type: "GOLD".to_string(),
                price: BigDecimal::from(120),
            },
            SeatLine {
                seat_number: "B2".to_string(),
                seat_type: "REGULAR".to_string(),
                price: BigDecimal::from(80),
            },
        ];

        let body = NotificationClient::format_body(
            "Asha",
            &seats,
            "BK1712000000000ABC123",
            &BigDecimal::from(200),
        );

        assert!(body.contains("Dear Asha"));
        assert!(body.contains("BK1712000000000ABC123"));
        assert!(body.contains("A1 (GOLD) - 120"));
        assert!(body.contains("B2 (REGULAR) - 80"));
        assert!(body.contains("Total charged to wallet: 200"));
    }
}
