//! Decision logic for the seat booking workflow.
//!
//! The controller loads the candidate rows inside a transaction and hands them
//! to `plan_booking`, which runs the whole validation chain (resolution,
//! availability, funds) before any write happens. A rejected plan means
//! nothing was mutated.

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::status::booking_status;

/// Booking row joined with its seat, as loaded under the row locks.
#[derive(Debug, Clone)]
pub struct SeatBookingRow {
    pub booking_id: i64,
    pub status: String,
    pub seat_number: String,
    pub seat_price: BigDecimal,
}

/// Everything the commit phase needs: which rows to flip to BOOKED, the total
/// to move between wallets, and the shared booking id stamped on the batch.
#[derive(Debug)]
pub struct BookingPlan {
    pub booking_ids: Vec<i64>,
    pub total_price: BigDecimal,
    pub booking_uid: String,
    pub booking_time: i64,
}

/// Splits the comma-separated id list from the request.
///
/// An empty list is a validation failure; a non-numeric token is a parse
/// failure naming the token, distinct from "entry not found".
pub fn parse_booking_ids(raw: &str) -> Result<Vec<i64>, ApiError> {
    if raw.trim().is_empty() {
        return Err(ApiError::Validation("missing booking ids".to_string()));
    }

    raw.split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<i64>()
                .map_err(|_| ApiError::Parse(token.to_string()))
        })
        .collect()
}

/// Validates the batch and computes the settlement.
///
/// Checks run in contract order: every requested id must have resolved, every
/// row must still be AVAILABLE (batch check, atomic-or-nothing), and the
/// customer wallet must cover the summed seat prices. The funds boundary is
/// inclusive: wallet exactly equal to the total succeeds.
pub fn plan_booking(
    requested: &[i64],
    rows: &[SeatBookingRow],
    wallet: &BigDecimal,
) -> Result<BookingPlan, ApiError> {
    for id in requested {
        if !rows.iter().any(|r| r.booking_id == *id) {
            return Err(ApiError::NotFound(format!(
                "booking entry {} not found",
                id
            )));
        }
    }

    if rows.iter().any(|r| r.status != booking_status::AVAILABLE) {
        return Err(ApiError::Conflict(
            "some of the selected seats are already booked".to_string(),
        ));
    }

    let total_price = rows
        .iter()
        .map(|r| &r.seat_price)
        .fold(BigDecimal::from(0), |acc, price| acc + price);

    if wallet < &total_price {
        return Err(ApiError::InsufficientFunds(
            "booking failed, insufficient funds in your wallet".to_string(),
        ));
    }

    Ok(BookingPlan {
        booking_ids: rows.iter().map(|r| r.booking_id).collect(),
        total_price,
        booking_uid: generate_booking_uid(),
        booking_time: Utc::now().timestamp_millis(),
    })
}

/// Human-facing booking id shared by every seat in the batch:
/// epoch-millis timestamp plus a random alphanumeric suffix.
pub fn generate_booking_uid() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "BK{}{}",
        Utc::now().timestamp_millis(),
        suffix[..6].to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn available(id: i64, price: i32) -> SeatBookingRow {
        SeatBookingRow {
            booking_id: id,
            status: booking_status::AVAILABLE.to_string(),
            seat_number: format!("A{}", id),
            seat_price: BigDecimal::from(price),
        }
    }

    #[test]
    fn parses_comma_separated_ids() {
        assert_eq!(parse_booking_ids("7,9").unwrap(), vec![7, 9]);
        assert_eq!(parse_booking_ids(" 7 , 9 ").unwrap(), vec![7, 9]);
    }

    #[test]
    fn empty_id_list_is_a_validation_failure() {
        assert!(matches!(
            parse_booking_ids("   "),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn malformed_id_is_a_parse_failure_not_not_found() {
        match parse_booking_ids("7,9a") {
            Err(ApiError::Parse(token)) => assert_eq!(token, "9a"),
            other => panic!("expected parse failure, got {:?}", other),
        }
    }

    #[test]
    fn books_two_seats_and_settles_the_sum() {
        let rows = vec![available(7, 120), available(9, 80)];
        let wallet = BigDecimal::from(500);

        let plan = plan_booking(&[7, 9], &rows, &wallet).unwrap();

        assert_eq!(plan.booking_ids, vec![7, 9]);
        assert_eq!(plan.total_price, BigDecimal::from(200));
        // wallet 500 -> 300 after the debit
        assert_eq!(&wallet - &plan.total_price, BigDecimal::from(300));
    }

    #[test]
    fn wallet_exactly_equal_to_total_succeeds() {
        let rows = vec![available(1, 250), available(2, 250)];
        let plan = plan_booking(&[1, 2], &rows, &BigDecimal::from(500)).unwrap();
        assert_eq!(plan.total_price, BigDecimal::from(500));
    }

    #[test]
    fn insufficient_wallet_rejects_without_a_plan() {
        // the 300 left after the first example cannot cover a 400 seat
        let rows = vec![available(11, 400)];
        assert!(matches!(
            plan_booking(&[11], &rows, &BigDecimal::from(300)),
            Err(ApiError::InsufficientFunds(_))
        ));
    }

    #[test]
    fn one_unavailable_seat_fails_the_whole_batch() {
        let mut rows = vec![available(7, 120), available(9, 80)];
        rows[1].status = booking_status::BOOKED.to_string();

        assert!(matches!(
            plan_booking(&[7, 9], &rows, &BigDecimal::from(500)),
            Err(ApiError::Conflict(_))
        ));
    }

    #[test]
    fn unresolved_id_fails_before_the_availability_check() {
        let rows = vec![available(7, 120)];
        match plan_booking(&[7, 9], &rows, &BigDecimal::from(500)) {
            Err(ApiError::NotFound(msg)) => assert!(msg.contains('9')),
            other => panic!("expected not-found, got {:?}", other),
        }
    }

    #[test]
    fn booking_uid_is_timestamp_plus_suffix() {
        let uid = generate_booking_uid();
        assert!(uid.starts_with("BK"));
        assert!(uid.len() > 15);
        assert!(uid.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(uid, generate_booking_uid());
    }

    proptest! {
        // Money is conserved: debiting the customer and crediting the manager
        // by the planned total nets to zero for any batch of seat prices.
        #[test]
        fn settlement_conserves_money(prices in prop::collection::vec(1u32..=10_000, 1..16)) {
            let rows: Vec<SeatBookingRow> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| available(i as i64 + 1, *p as i32))
                .collect();
            let ids: Vec<i64> = rows.iter().map(|r| r.booking_id).collect();
            let wallet: BigDecimal = prices.iter().fold(BigDecimal::from(0), |acc, p| acc + BigDecimal::from(*p));

            let plan = plan_booking(&ids, &rows, &wallet).unwrap();

            let customer_delta = -plan.total_price.clone();
            let manager_delta = plan.total_price.clone();
            prop_assert_eq!(customer_delta + manager_delta, BigDecimal::from(0));
        }

        // The total is exactly the sum of the seat prices in the batch.
        #[test]
        fn total_is_sum_of_seat_prices(prices in prop::collection::vec(1u32..=10_000, 1..16)) {
            let rows: Vec<SeatBookingRow> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| available(i as i64 + 1, *p as i32))
                .collect();
            let ids: Vec<i64> = rows.iter().map(|r| r.booking_id).collect();
            let expected = prices.iter().fold(BigDecimal::from(0), |acc, p| acc + BigDecimal::from(*p));

            let plan = plan_booking(&ids, &rows, &expected).unwrap();
            prop_assert_eq!(plan.total_price, expected);
        }
    }
}
