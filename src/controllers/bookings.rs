use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::controllers::CommonResponse;
use crate::error::ApiError;
use crate::models::{status::booking_status, Booking, User};
use crate::services::booking::{parse_booking_ids, plan_booking, SeatBookingRow};
use crate::services::notification::SeatLine;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/bookings",
            get(fetch_bookings_by_status).post(add_show_booking),
        )
        .route("/bookings/theatre", get(fetch_bookings_by_theatre))
        .route("/bookings/customer", get(fetch_bookings_by_customer))
        .route("/bookings/show", get(fetch_bookings_by_show))
}

/* ---------- helpers ---------- */

async fn theatre_exists(pool: &sqlx::PgPool, theatre_id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM theatres WHERE id = $1)")
        .bind(theatre_id)
        .fetch_one(pool)
        .await
}

async fn customer_exists(pool: &sqlx::PgPool, customer_id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(customer_id)
        .fetch_one(pool)
        .await
}

async fn show_exists(pool: &sqlx::PgPool, show_id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM shows WHERE id = $1)")
        .bind(show_id)
        .fetch_one(pool)
        .await
}

fn require_status(status: &Option<String>) -> Result<&str, ApiError> {
    match status.as_deref() {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ApiError::Validation("missing status input".to_string())),
    }
}

fn require_id(id: Option<i64>, what: &str) -> Result<i64, ApiError> {
    match id {
        Some(v) if v > 0 => Ok(v),
        _ => Err(ApiError::Validation(format!("missing {}", what))),
    }
}

const BOOKING_COLUMNS: &str =
    "id, status, booking_time, booking_uid, customer_id, show_id, show_seat_id";

/* ---------- booking workflow ---------- */

// POST /api/bookings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBookingRequest {
    // comma separated booking row ids: "12,15,16"
    booking_ids: String,
    customer_id: i64,
}

async fn add_show_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for adding the show booking");

    if req.customer_id <= 0 {
        return Err(ApiError::Validation("missing customer id".to_string()));
    }
    let requested = parse_booking_ids(&req.booking_ids)?;

    // the whole workflow runs in one transaction; an early return drops the
    // transaction and rolls everything back
    let mut tx = state.db.pool.begin().await?;

    // lock the customer row before the funds check so a concurrent settlement
    // cannot slip between read and debit
    let customer: Option<User> = sqlx::query_as(
        "SELECT id, full_name, email_id, role, wallet_amount, theatre_id \
         FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(req.customer_id)
    .fetch_optional(&mut *tx)
    .await?;

    let customer = customer.ok_or_else(|| ApiError::NotFound("customer not found".to_string()))?;

    // lock the booking rows; a racing request for the same seats blocks here
    // and sees BOOKED after this transaction commits
    let rows: Vec<(i64, String, String, String, BigDecimal)> = sqlx::query_as(
        r#"
        SELECT b.id, b.status, ss.seat_number, ss.seat_type, ss.price
        FROM bookings b
        JOIN show_seats ss ON ss.id = b.show_seat_id
        WHERE b.id = ANY($1)
        ORDER BY b.id
        FOR UPDATE OF b
        "#,
    )
    .bind(&requested)
    .fetch_all(&mut *tx)
    .await?;

    let seat_rows: Vec<SeatBookingRow> = rows
        .iter()
        .map(|(id, status, seat_number, _, price)| SeatBookingRow {
            booking_id: *id,
            status: status.clone(),
            seat_number: seat_number.clone(),
            seat_price: price.clone(),
        })
        .collect();

    let plan = plan_booking(&requested, &seat_rows, &customer.wallet_amount)?;

    // compare-and-swap on status: only rows still AVAILABLE flip to BOOKED
    let updated = sqlx::query(
        r#"
        UPDATE bookings
        SET status = $1, customer_id = $2, booking_uid = $3, booking_time = $4
        WHERE id = ANY($5) AND status = $6
        "#,
    )
    .bind(booking_status::BOOKED)
    .bind(req.customer_id)
    .bind(&plan.booking_uid)
    .bind(plan.booking_time)
    .bind(&plan.booking_ids)
    .bind(booking_status::AVAILABLE)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() != plan.booking_ids.len() as u64 {
        return Err(ApiError::Conflict(
            "some of the selected seats are already booked".to_string(),
        ));
    }

    sqlx::query("UPDATE users SET wallet_amount = wallet_amount - $1 WHERE id = $2")
        .bind(&plan.total_price)
        .bind(req.customer_id)
        .execute(&mut *tx)
        .await?;

    // credit the manager of the theatre owning the first booking's show; the
    // batch is assumed single-show
    let manager_id: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT u.id
        FROM users u
        JOIN theatres t ON t.manager_id = u.id
        JOIN shows s ON s.theatre_id = t.id
        JOIN bookings b ON b.show_id = s.id
        WHERE b.id = $1
        "#,
    )
    .bind(plan.booking_ids[0])
    .fetch_optional(&mut *tx)
    .await?;

    let manager_id =
        manager_id.ok_or_else(|| ApiError::NotFound("theatre manager not found".to_string()))?;

    sqlx::query("UPDATE users SET wallet_amount = wallet_amount + $1 WHERE id = $2")
        .bind(&plan.total_price)
        .bind(manager_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "booking {} committed for customer {}, total {}",
        plan.booking_uid, req.customer_id, plan.total_price
    );

    // confirmation goes out after commit, off the request path; delivery
    // failure never affects the booking
    let seats: Vec<SeatLine> = rows
        .iter()
        .map(|(_, _, seat_number, seat_type, price)| SeatLine {
            seat_number: seat_number.clone(),
            seat_type: seat_type.clone(),
            price: price.clone(),
        })
        .collect();
    let notifier = state.notifier.clone();
    let booking_uid = plan.booking_uid.clone();
    let total = plan.total_price.clone();
    tokio::spawn(async move {
        notifier
            .send_booking_confirmation(
                &customer.email_id,
                &customer.full_name,
                &seats,
                &booking_uid,
                &total,
            )
            .await;
    });

    Ok((
        StatusCode::OK,
        Json(CommonResponse::ok(
            "Congratulations! Your show booking has been successfully completed",
        )),
    ))
}

/* ---------- booking queries ---------- */

#[derive(Debug, Serialize)]
struct BookingListResponse {
    success: bool,
    message: String,
    bookings: Vec<Booking>,
}

fn booking_list_response(bookings: Vec<Booking>) -> (StatusCode, Json<BookingListResponse>) {
    if bookings.is_empty() {
        (
            StatusCode::OK,
            Json(BookingListResponse {
                success: false,
                message: "no bookings found".to_string(),
                bookings,
            }),
        )
    } else {
        (
            StatusCode::OK,
            Json(BookingListResponse {
                success: true,
                message: "bookings fetched successfully".to_string(),
                bookings,
            }),
        )
    }
}

// GET /api/bookings?status=
#[derive(Debug, Deserialize)]
struct StatusQuery {
    status: Option<String>,
}

async fn fetch_bookings_by_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for fetching show bookings by status");

    let status = require_status(&params.status)?;

    let bookings: Vec<Booking> = sqlx::query_as(&format!(
        "SELECT {} FROM bookings WHERE status = $1 ORDER BY id",
        BOOKING_COLUMNS
    ))
    .bind(status)
    .fetch_all(&state.db.pool)
    .await?;

    Ok(booking_list_response(bookings))
}

// GET /api/bookings/theatre?theatreId=&status=
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TheatreBookingsQuery {
    theatre_id: Option<i64>,
    status: Option<String>,
}

async fn fetch_bookings_by_theatre(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TheatreBookingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for fetching show bookings by theatre");

    let status = require_status(&params.status)?;
    let theatre_id = require_id(params.theatre_id, "theatre id")?;

    if !theatre_exists(&state.db.pool, theatre_id).await? {
        return Err(ApiError::NotFound("theatre not found".to_string()));
    }

    let bookings: Vec<Booking> = sqlx::query_as(
        r#"
        SELECT b.id, b.status, b.booking_time, b.booking_uid,
               b.customer_id, b.show_id, b.show_seat_id
        FROM bookings b
        JOIN shows s ON s.id = b.show_id
        WHERE s.theatre_id = $1 AND b.status = $2
        ORDER BY b.id
        "#,
    )
    .bind(theatre_id)
    .bind(status)
    .fetch_all(&state.db.pool)
    .await?;

    Ok(booking_list_response(bookings))
}

// GET /api/bookings/customer?customerId=&status=
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerBookingsQuery {
    customer_id: Option<i64>,
    status: Option<String>,
}

async fn fetch_bookings_by_customer(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CustomerBookingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for fetching show bookings by customer");

    let status = require_status(&params.status)?;
    let customer_id = require_id(params.customer_id, "customer id")?;

    if !customer_exists(&state.db.pool, customer_id).await? {
        return Err(ApiError::NotFound("customer not found".to_string()));
    }

    let bookings: Vec<Booking> = sqlx::query_as(&format!(
        "SELECT {} FROM bookings WHERE customer_id = $1 AND status = $2 ORDER BY id",
        BOOKING_COLUMNS
    ))
    .bind(customer_id)
    .bind(status)
    .fetch_all(&state.db.pool)
    .await?;

    Ok(booking_list_response(bookings))
}

// GET /api/bookings/show?showId=
//
// The only query with a projection step: bookings come back as seat-booking
// views so the seating chart can be rendered with live booking state.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShowBookingsQuery {
    show_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeatBookingView {
    id: i64,
    seat_number: String,
    seat_type: String,
    seat_position: String,
    price: BigDecimal,
    status: String,
}

#[derive(Debug, Serialize)]
struct SeatBookingListResponse {
    success: bool,
    message: String,
    bookings: Vec<SeatBookingView>,
}

async fn fetch_bookings_by_show(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ShowBookingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("request received for fetching show bookings by show");

    let show_id = require_id(params.show_id, "show id")?;

    if !show_exists(&state.db.pool, show_id).await? {
        return Err(ApiError::NotFound("show not found".to_string()));
    }

    let rows: Vec<(i64, String, String, String, BigDecimal, String)> = sqlx::query_as(
        r#"
        SELECT b.id, ss.seat_number, ss.seat_type, ss.seat_position, ss.price, b.status
        FROM bookings b
        JOIN show_seats ss ON ss.id = b.show_seat_id
        WHERE b.show_id = $1
        ORDER BY ss.seat_number
        "#,
    )
    .bind(show_id)
    .fetch_all(&state.db.pool)
    .await?;

    let bookings: Vec<SeatBookingView> = rows
        .into_iter()
        .map(
            |(id, seat_number, seat_type, seat_position, price, status)| SeatBookingView {
                id,
                seat_number,
                seat_type,
                seat_position,
                price,
                status,
            },
        )
        .collect();

    let response = if bookings.is_empty() {
        SeatBookingListResponse {
            success: false,
            message: "no bookings found".to_string(),
            bookings,
        }
    } else {
        SeatBookingListResponse {
            success: true,
            message: "bookings fetched successfully".to_string(),
            bookings,
        }
    };

    Ok((StatusCode::OK, Json(response)))
}
