use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::controllers::CommonResponse;
use crate::error::ApiError;
use crate::models::status::{active_status, booking_status, show_status, theatre_status, user_role};
use crate::models::Theatre;
use crate::services::theatre::{plan_cascade, BookedSeatRow};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/theatres",
            get(fetch_theatres_by_status)
                .post(register_theatre)
                .put(update_theatre_details)
                .delete(delete_theatre),
        )
        .route("/theatres/status", put(update_theatre_status))
        .route("/theatres/location", get(fetch_theatres_by_location))
        .route("/theatres/detail", get(fetch_theatre_by_id))
        .route(
            "/theatres/image",
            get(fetch_theatre_image).put(update_theatre_image),
        )
}

/* ---------- helpers ---------- */

const THEATRE_COLUMNS: &str = "id, name, address, description, email_id, \
     manager_contact, image, status, location_id, manager_id";

fn require_id(id: Option<i64>, what: &str) -> Result<i64, ApiError> {
    match id {
        Some(v) if v > 0 => Ok(v),
        _ => Err(ApiError::Validation(format!("missing {}", what))),
    }
}

fn decode_image(payload: &str) -> Result<Vec<u8>, ApiError> {
    general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| ApiError::Validation("invalid image payload".to_string()))
}

fn image_content_type(name: &str) -> &'static str {
    match name.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Serialize)]
struct TheatreListResponse {
    success: bool,
    message: String,
    theatres: Vec<Theatre>,
}

fn theatre_list_response(theatres: Vec<Theatre>) -> (StatusCode, Json<TheatreListResponse>) {
    if theatres.is_empty() {
        (
            StatusCode::OK,
            Json(TheatreListResponse {
                success: false,
                message: "no theatres found".to_string(),
                theatres,
            }),
        )
    } else {
        (
            StatusCode::OK,
            Json(TheatreListResponse {
                success: true,
                message: "theatres fetched successfully".to_string(),
                theatres,
            }),
        )
    }
}

/* ---------- registration and updates ---------- */

// POST /api/theatres
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddTheatreRequest {
    name: String,
    address: String,
    description: Option<String>,
    email_id: String,
    manager_contact: String,
    manager_id: i64,
    location_id: i64,
    // base64 payload; stored through the blob storage collaborator
    image: Option<String>,
    image_extension: Option<String>,
}

async fn register_theatre(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddTheatreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for adding the theatre");

    if req.manager_id <= 0 {
        return Err(ApiError::Validation("missing manager id".to_string()));
    }
    if req.location_id <= 0 {
        return Err(ApiError::Validation("missing location id".to_string()));
    }

    let location_found: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1)")
            .bind(req.location_id)
            .fetch_one(&state.db.pool)
            .await?;
    if !location_found {
        return Err(ApiError::NotFound("location not found".to_string()));
    }

    let manager_role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
        .bind(req.manager_id)
        .fetch_optional(&state.db.pool)
        .await?;
    match manager_role.as_deref() {
        Some(role) if role == user_role::THEATRE_MANAGER => {}
        _ => return Err(ApiError::NotFound("manager not found".to_string())),
    }

    let image = match &req.image {
        Some(payload) => {
            let bytes = decode_image(payload)?;
            let extension = req.image_extension.as_deref().unwrap_or("png");
            Some(state.storage.store(&bytes, extension).await?)
        }
        None => None,
    };

    let mut tx = state.db.pool.begin().await?;

    let theatre: Theatre = sqlx::query_as(&format!(
        r#"
        INSERT INTO theatres
            (name, address, description, email_id, manager_contact, image, status, location_id, manager_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {}
        "#,
        THEATRE_COLUMNS
    ))
    .bind(&req.name)
    .bind(&req.address)
    .bind(&req.description)
    .bind(&req.email_id)
    .bind(&req.manager_contact)
    .bind(&image)
    .bind(theatre_status::PENDING)
    .bind(req.location_id)
    .bind(req.manager_id)
    .fetch_one(&mut *tx)
    .await?;

    // link the manager to their theatre
    sqlx::query("UPDATE users SET theatre_id = $1 WHERE id = $2")
        .bind(theatre.id)
        .bind(req.manager_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((
        StatusCode::OK,
        Json(TheatreListResponse {
            success: true,
            message: "theatre added successfully".to_string(),
            theatres: vec![theatre],
        }),
    ))
}

// PUT /api/theatres/status?theatreId=&status=
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TheatreStatusQuery {
    theatre_id: Option<i64>,
    status: Option<String>,
}

async fn update_theatre_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TheatreStatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for updating the theatre status");

    let theatre_id = require_id(params.theatre_id, "theatre id")?;
    let status = match params.status.as_deref() {
        Some(s)
            if matches!(
                s,
                theatre_status::PENDING | theatre_status::ACTIVE | theatre_status::DEACTIVATED
            ) =>
        {
            s
        }
        Some(_) => {
            return Err(ApiError::Validation(
                "status must be PENDING | ACTIVE | DEACTIVATED".to_string(),
            ))
        }
        None => return Err(ApiError::Validation("missing status input".to_string())),
    };

    let theatre: Option<Theatre> = sqlx::query_as(&format!(
        "UPDATE theatres SET status = $1 WHERE id = $2 RETURNING {}",
        THEATRE_COLUMNS
    ))
    .bind(status)
    .bind(theatre_id)
    .fetch_optional(&state.db.pool)
    .await?;

    let theatre = theatre.ok_or_else(|| ApiError::NotFound("theatre not found".to_string()))?;

    Ok((
        StatusCode::OK,
        Json(TheatreListResponse {
            success: true,
            message: "theatre status updated successfully".to_string(),
            theatres: vec![theatre],
        }),
    ))
}

// PUT /api/theatres
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTheatreDetailRequest {
    theatre_id: i64,
    name: String,
    address: String,
    description: Option<String>,
    email_id: String,
    manager_contact: String,
}

async fn update_theatre_details(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateTheatreDetailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for updating the theatre details");

    if req.theatre_id <= 0 {
        return Err(ApiError::Validation("missing theatre id".to_string()));
    }

    let updated = sqlx::query(
        r#"
        UPDATE theatres
        SET name = $1, address = $2, description = $3, email_id = $4, manager_contact = $5
        WHERE id = $6
        "#,
    )
    .bind(&req.name)
    .bind(&req.address)
    .bind(&req.description)
    .bind(&req.email_id)
    .bind(&req.manager_contact)
    .bind(req.theatre_id)
    .execute(&state.db.pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound("theatre not found".to_string()));
    }

    Ok((
        StatusCode::OK,
        Json(CommonResponse::ok("theatre details updated successfully")),
    ))
}

// PUT /api/theatres/image
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTheatreImageRequest {
    theatre_id: i64,
    image: Option<String>,
    image_extension: Option<String>,
}

async fn update_theatre_image(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateTheatreImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for updating the theatre image");

    if req.theatre_id <= 0 {
        return Err(ApiError::Validation("missing theatre id".to_string()));
    }
    let payload = req
        .image
        .as_deref()
        .ok_or_else(|| ApiError::Validation("image not selected".to_string()))?;

    let existing: Option<Option<String>> =
        sqlx::query_scalar("SELECT image FROM theatres WHERE id = $1")
            .bind(req.theatre_id)
            .fetch_optional(&state.db.pool)
            .await?;
    let existing = existing.ok_or_else(|| ApiError::NotFound("theatre not found".to_string()))?;

    let bytes = decode_image(payload)?;
    let extension = req.image_extension.as_deref().unwrap_or("png");
    let new_image = state.storage.store(&bytes, extension).await?;

    sqlx::query("UPDATE theatres SET image = $1 WHERE id = $2")
        .bind(&new_image)
        .bind(req.theatre_id)
        .execute(&state.db.pool)
        .await?;

    // delete-after-save: the old blob goes only once the new reference is
    // persisted, so a failed save never orphans the theatre's image
    if let Some(old_image) = existing {
        state.storage.delete(&old_image).await?;
    }

    Ok((
        StatusCode::OK,
        Json(CommonResponse::ok("theatre image updated successfully")),
    ))
}

// GET /api/theatres/image?name=
#[derive(Debug, Deserialize)]
struct ImageQuery {
    name: Option<String>,
}

async fn fetch_theatre_image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let name = params
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("missing image name".to_string()))?;

    match state.storage.load(&name).await {
        Ok(bytes) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, image_content_type(&name))
            .body(Body::from(bytes))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())),
        Err(_) => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

/* ---------- theatre queries ---------- */

// GET /api/theatres?status=
#[derive(Debug, Deserialize)]
struct StatusQuery {
    status: Option<String>,
}

async fn fetch_theatres_by_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for fetching theatres by status");

    let status = match params.status.as_deref() {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Err(ApiError::Validation("missing status input".to_string())),
    };

    let theatres: Vec<Theatre> = sqlx::query_as(&format!(
        "SELECT {} FROM theatres WHERE status = $1 ORDER BY id",
        THEATRE_COLUMNS
    ))
    .bind(status)
    .fetch_all(&state.db.pool)
    .await?;

    Ok(theatre_list_response(theatres))
}

// GET /api/theatres/location?locationId=
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationQuery {
    location_id: Option<i64>,
}

async fn fetch_theatres_by_location(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for fetching theatres by location");

    let location_id = require_id(params.location_id, "location id")?;

    let location_found: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1)")
            .bind(location_id)
            .fetch_one(&state.db.pool)
            .await?;
    if !location_found {
        return Err(ApiError::NotFound("location not found".to_string()));
    }

    // customers browse only live theatres at a location
    let theatres: Vec<Theatre> = sqlx::query_as(&format!(
        "SELECT {} FROM theatres WHERE location_id = $1 AND status = $2 ORDER BY id",
        THEATRE_COLUMNS
    ))
    .bind(location_id)
    .bind(active_status::ACTIVE)
    .fetch_all(&state.db.pool)
    .await?;

    Ok(theatre_list_response(theatres))
}

// GET /api/theatres/detail?theatreId=
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TheatreDetailQuery {
    theatre_id: Option<i64>,
}

async fn fetch_theatre_by_id(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TheatreDetailQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for fetching theatre by id");

    let theatre_id = require_id(params.theatre_id, "theatre id")?;

    let theatre: Option<Theatre> = sqlx::query_as(&format!(
        "SELECT {} FROM theatres WHERE id = $1",
        THEATRE_COLUMNS
    ))
    .bind(theatre_id)
    .fetch_optional(&state.db.pool)
    .await?;

    // absent theatre is an empty read here, not a fault
    Ok(theatre_list_response(theatre.into_iter().collect()))
}

/* ---------- deactivation cascade ---------- */

// DELETE /api/theatres?theatreId=
//
// Soft delete: the theatre, its active movies and shows, and every booked
// seat flip status, and each booked seat's price moves back from the manager
// wallet to the customer wallet. The whole cascade commits atomically.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteTheatreQuery {
    theatre_id: Option<i64>,
}

async fn delete_theatre(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteTheatreQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for deleting theatre");

    let theatre_id = require_id(params.theatre_id, "theatre id")?;

    let mut tx = state.db.pool.begin().await?;

    let manager_id: Option<i64> =
        sqlx::query_scalar("SELECT manager_id FROM theatres WHERE id = $1 FOR UPDATE")
            .bind(theatre_id)
            .fetch_optional(&mut *tx)
            .await?;
    let manager_id = manager_id.ok_or_else(|| ApiError::NotFound("theatre not found".to_string()))?;

    sqlx::query("UPDATE theatres SET status = $1 WHERE id = $2")
        .bind(theatre_status::DEACTIVATED)
        .bind(theatre_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE movies SET status = $1 WHERE theatre_id = $2 AND status = $3")
        .bind(active_status::DEACTIVATED)
        .bind(theatre_id)
        .bind(active_status::ACTIVE)
        .execute(&mut *tx)
        .await?;

    let cancelled_shows: Vec<i64> = sqlx::query_scalar(
        "UPDATE shows SET status = $1 WHERE theatre_id = $2 AND status = $3 RETURNING id",
    )
    .bind(show_status::CANCELLED)
    .bind(theatre_id)
    .bind(show_status::ACTIVE)
    .fetch_all(&mut *tx)
    .await?;

    let mut refunded_bookings = 0usize;

    if !cancelled_shows.is_empty() {
        let booked: Vec<(i64, i64, bigdecimal::BigDecimal)> = sqlx::query_as(
            r#"
            SELECT b.id, b.customer_id, ss.price
            FROM bookings b
            JOIN show_seats ss ON ss.id = b.show_seat_id
            WHERE b.show_id = ANY($1) AND b.status = $2 AND b.customer_id IS NOT NULL
            ORDER BY b.id
            FOR UPDATE OF b
            "#,
        )
        .bind(&cancelled_shows)
        .bind(booking_status::BOOKED)
        .fetch_all(&mut *tx)
        .await?;

        let rows: Vec<BookedSeatRow> = booked
            .into_iter()
            .map(|(booking_id, customer_id, seat_price)| BookedSeatRow {
                booking_id,
                customer_id,
                seat_price,
            })
            .collect();

        let plan = plan_cascade(&rows);
        refunded_bookings = plan.refunds.len();

        // each booking is refunded individually, the inverse of its settlement
        for refund in &plan.refunds {
            sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2")
                .bind(booking_status::CANCELLED)
                .bind(refund.booking_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query("UPDATE users SET wallet_amount = wallet_amount + $1 WHERE id = $2")
                .bind(&refund.amount)
                .bind(refund.customer_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query("UPDATE users SET wallet_amount = wallet_amount - $1 WHERE id = $2")
                .bind(&refund.amount)
                .bind(manager_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    info!(
        "theatre {} deactivated: {} shows cancelled, {} bookings refunded",
        theatre_id,
        cancelled_shows.len(),
        refunded_bookings
    );

    Ok((
        StatusCode::OK,
        Json(CommonResponse::ok("theatre deleted successfully")),
    ))
}
