use chrono::{DateTime, Local, NaiveDate, Utc};
use garde::Validate;
use kernel::model::{
    booking::{Booking, Space},
    id::{BookingId, SpaceId, UserId},
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

// 予約対象日のルール: Y-m-d 形式で、今日より後であること
fn is_bookable_date(value: &str, _ctx: &()) -> garde::Result {
    let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) else {
        return Err(garde::Error::new("does not match the format Y-m-d"));
    };
    if date <= Local::now().date_naive() {
        return Err(garde::Error::new("must be a date after today"));
    }
    Ok(())
}

pub(crate) fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| AppError::UnprocessableEntity(format!("invalid date: {value}")))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[garde(custom(is_bookable_date))]
    pub booking_from: String,
    #[garde(range(min = 1))]
    pub days: i64,
}

impl CreateBookingRequest {
    pub fn booking_from(&self) -> AppResult<NaiveDate> {
        parse_date(&self.booking_from)
    }
}

/// bookings-check / price-check 共通のクエリパラメータ
#[derive(Debug, Deserialize, Validate)]
pub struct DateQuery {
    #[garde(required, inner(custom(is_bookable_date)))]
    pub date: Option<String>,
}

impl DateQuery {
    pub fn date(&self) -> AppResult<NaiveDate> {
        let raw = self
            .date
            .as_deref()
            .ok_or_else(|| AppError::UnprocessableEntity("date is required".into()))?;
        parse_date(raw)
    }

    pub fn raw_date(&self) -> &str {
        self.date.as_deref().unwrap_or_default()
    }
}

#[derive(Serialize)]
pub struct BookingsResponse {
    pub status: bool,
    pub bookings: Vec<BookingResponse>,
}

impl From<Vec<Booking>> for BookingsResponse {
    fn from(value: Vec<Booking>) -> Self {
        Self {
            status: true,
            bookings: value.into_iter().map(BookingResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct BookingResponse {
    pub id: BookingId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub spaces: Vec<SpaceResponse>,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let Booking {
            booking_id,
            user_id,
            created_at,
            spaces,
        } = value;
        Self {
            id: booking_id,
            user_id,
            created_at,
            spaces: spaces.into_iter().map(SpaceResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct SpaceResponse {
    pub id: SpaceId,
    pub booking_id: BookingId,
    pub date: NaiveDate,
}

impl From<Space> for SpaceResponse {
    fn from(value: Space) -> Self {
        let Space {
            space_id,
            booking_id,
            date,
        } = value;
        Self {
            id: space_id,
            booking_id,
            date,
        }
    }
}

/// 作成・取得・更新の成功レスポンス
#[derive(Serialize)]
pub struct BookingMessageResponse {
    pub status: bool,
    pub message: &'static str,
    pub booking: BookingResponse,
}

impl BookingMessageResponse {
    pub fn new(message: &'static str, booking: Booking) -> Self {
        Self {
            status: true,
            message,
            booking: booking.into(),
        }
    }
}
