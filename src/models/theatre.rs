use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theatre {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub email_id: String,
    pub manager_contact: String,
    // Reference name of the stored image blob
    pub image: Option<String>,
    pub status: String,
    pub location_id: i64,
    pub manager_id: i64,
}
