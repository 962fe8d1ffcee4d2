use crate::{
    extractor::AuthorizedUser,
    model::booking::{BookingMessageResponse, BookingsResponse, CreateBookingRequest, DateQuery},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use garde::Validate;
use kernel::model::{
    booking::event::{CreateBooking, DeleteBooking, UpdateBooking},
    id::BookingId,
};
use registry::AppRegistry;
use serde_json::json;
use shared::error::{validation_messages, AppError, AppResult};

pub async fn show_booking_list(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    registry
        .booking_repository()
        .find_by_user_id(user.id())
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

pub async fn check_spaces(
    _user: AuthorizedUser,
    Query(query): Query<DateQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Response> {
    if let Err(report) = query.validate(&()) {
        return Ok(bad_request_with_errors(&report));
    }

    let free_spaces = registry
        .availability_repository()
        .available_spaces(query.date()?)
        .await?;

    Ok(Json(json!({
        "status": true,
        "date": query.raw_date(),
        "free_spaces": free_spaces,
    }))
    .into_response())
}

pub async fn check_prices(
    _user: AuthorizedUser,
    Query(query): Query<DateQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Response> {
    if let Err(report) = query.validate(&()) {
        return Ok(bad_request_with_errors(&report));
    }

    let price = registry.price_repository().price_for(query.date()?).await?;

    Ok(Json(json!({
        "status": true,
        "date": query.raw_date(),
        "price": price,
    }))
    .into_response())
}

pub async fn register_booking(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingMessageResponse>> {
    req.validate(&())?;

    let event = CreateBooking::new(user.id(), req.booking_from()?, req.days);
    registry
        .booking_repository()
        .create(event)
        .await
        .map(|booking| Json(BookingMessageResponse::new("Booking created successfully!", booking)))
}

pub async fn show_booking(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingMessageResponse>> {
    let booking = registry
        .booking_repository()
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("booking ({}) was not found", booking_id)))?;

    if !booking.is_owned_by(user.id()) {
        return Err(AppError::ForbiddenOperation);
    }

    Ok(Json(BookingMessageResponse::new(
        "Your current booking.",
        booking,
    )))
}

pub async fn update_booking(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingMessageResponse>> {
    req.validate(&())?;

    let event = UpdateBooking::new(booking_id, user.id(), req.booking_from()?, req.days);
    registry
        .booking_repository()
        .update(event)
        .await
        .map(|booking| Json(BookingMessageResponse::new("Booking updated successfully!", booking)))
}

pub async fn delete_booking(
    user: AuthorizedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<serde_json::Value>> {
    let event = DeleteBooking {
        booking_id,
        requested_user: user.id(),
    };
    registry.booking_repository().delete(event).await?;

    Ok(Json(json!({
        "status": true,
        "message": "Booking deleted successfully!",
    })))
}

// check 系エンドポイントは 400 で返す（登録系の 422 と使い分ける）
fn bad_request_with_errors(report: &garde::Report) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "status": false,
            "message": "Validation error",
            "errors": validation_messages(report),
        })),
    )
        .into_response()
}
