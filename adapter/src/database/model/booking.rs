use kernel::model::{
    booking::{Booking, Space},
    id::{BookingId, SpaceId, UserId},
};
use sqlx::types::chrono::{DateTime, NaiveDate, Utc};

// bookings テーブルの 1 行。Space は別クエリで取得するため持たない。
#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

// From トレイトの実装の代わりに、引数をとる into_booking メソッドを定義し実装する
impl BookingRow {
    pub fn into_booking(self, spaces: Vec<Space>) -> Booking {
        let BookingRow {
            booking_id,
            user_id,
            created_at,
        } = self;
        Booking {
            booking_id,
            user_id,
            created_at,
            spaces,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct SpaceRow {
    pub space_id: SpaceId,
    pub booking_id: BookingId,
    pub booked_on: NaiveDate,
}

impl From<SpaceRow> for Space {
    fn from(value: SpaceRow) -> Self {
        let SpaceRow {
            space_id,
            booking_id,
            booked_on,
        } = value;
        Space {
            space_id,
            booking_id,
            date: booked_on,
        }
    }
}
