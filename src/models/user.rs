use bigdecimal::BigDecimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email_id: String,
    pub role: String,
    // Debited/credited only by the booking and theatre lifecycle workflows
    pub wallet_amount: BigDecimal,
    pub theatre_id: Option<i64>,
}
