use crate::model::id::{BookingId, UserId};
use chrono::NaiveDate;
use derive_new::new;

#[derive(new)]
pub struct CreateBooking {
    pub user_id: UserId,
    pub booking_from: NaiveDate,
    pub days: i64,
}

#[derive(new)]
pub struct UpdateBooking {
    pub booking_id: BookingId,
    pub requested_user: UserId,
    pub booking_from: NaiveDate,
    pub days: i64,
}

#[derive(Debug)]
pub struct DeleteBooking {
    pub booking_id: BookingId,
    pub requested_user: UserId,
}
