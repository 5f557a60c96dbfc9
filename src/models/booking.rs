use serde::Serialize;
use sqlx::FromRow;

/// One reservation record per seat per show. Created AVAILABLE when show seats
/// are generated, transitions to BOOKED on a successful reservation and to
/// CANCELLED when the owning theatre is deactivated. Never deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub status: String,
    // Epoch milliseconds at commit time
    pub booking_time: Option<i64>,
    // Human-facing id shared by all seats booked together in one transaction
    pub booking_uid: Option<String>,
    pub customer_id: Option<i64>,
    pub show_id: i64,
    pub show_seat_id: i64,
}
