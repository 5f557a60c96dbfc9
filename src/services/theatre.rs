//! Refund arithmetic for the theatre deactivation cascade.
//!
//! Deactivating a theatre cancels its active shows and every BOOKED seat on
//! them. Each booking is refunded individually: the seat price goes back to
//! the customer who booked it and the same amount comes out of the theatre
//! manager's wallet, the exact inverse of the booking settlement.

use bigdecimal::BigDecimal;

/// BOOKED booking joined with its seat price, loaded under row locks across
/// all shows being cancelled.
#[derive(Debug, Clone)]
pub struct BookedSeatRow {
    pub booking_id: i64,
    pub customer_id: i64,
    pub seat_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct Refund {
    pub booking_id: i64,
    pub customer_id: i64,
    pub amount: BigDecimal,
}

#[derive(Debug)]
pub struct CascadePlan {
    pub refunds: Vec<Refund>,
    /// Sum of all refunds, debited from the manager wallet over the cascade.
    pub total_refunded: BigDecimal,
}

pub fn plan_cascade(rows: &[BookedSeatRow]) -> CascadePlan {
    let refunds: Vec<Refund> = rows
        .iter()
        .map(|r| Refund {
            booking_id: r.booking_id,
            customer_id: r.customer_id,
            amount: r.seat_price.clone(),
        })
        .collect();

    let total_refunded = refunds
        .iter()
        .map(|r| &r.amount)
        .fold(BigDecimal::from(0), |acc, amount| acc + amount);

    CascadePlan {
        refunds,
        total_refunded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booked(booking_id: i64, customer_id: i64, price: i32) -> BookedSeatRow {
        BookedSeatRow {
            booking_id,
            customer_id,
            seat_price: BigDecimal::from(price),
        }
    }

    #[test]
    fn empty_cascade_refunds_nothing() {
        let plan = plan_cascade(&[]);
        assert!(plan.refunds.is_empty());
        assert_eq!(plan.total_refunded, BigDecimal::from(0));
    }

    #[test]
    fn refunds_every_booked_seat_once() {
        // two shows with two booked seats each, different customers
        let rows = vec![
            booked(1, 10, 120),
            booked(2, 10, 80),
            booked(3, 11, 200),
            booked(4, 12, 150),
        ];

        let plan = plan_cascade(&rows);

        assert_eq!(plan.refunds.len(), 4);
        assert_eq!(plan.total_refunded, BigDecimal::from(550));
        assert_eq!(plan.refunds[0].booking_id, 1);
        assert_eq!(plan.refunds[0].amount, BigDecimal::from(120));
    }

    #[test]
    fn manager_debit_matches_customer_credits() {
        let rows = vec![booked(1, 10, 300), booked(2, 11, 450)];
        let plan = plan_cascade(&rows);

        let credited = plan
            .refunds
            .iter()
            .map(|r| &r.amount)
            .fold(BigDecimal::from(0), |acc, a| acc + a);

        // conservation: customer credits + manager debit == 0
        assert_eq!(credited - &plan.total_refunded, BigDecimal::from(0));
    }
}
