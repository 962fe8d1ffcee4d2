use crate::model::id::{BookingId, SpaceId, UserId};
use chrono::{DateTime, Duration, NaiveDate, Utc};

pub mod event;

/// 予約の集約。所有ユーザーと予約日 1 日分ごとの Space を持つ。
#[derive(Debug)]
pub struct Booking {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub spaces: Vec<Space>,
}

impl Booking {
    /// 予約の所有チェック。取得・更新・削除の前に必ず呼ぶこと。
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// 1 日分のスペース消費を表す
#[derive(Debug)]
pub struct Space {
    pub space_id: SpaceId,
    pub booking_id: BookingId,
    pub date: NaiveDate,
}

/// 予約が占有する日付の列を返す。from を含む連続した days 日分。
pub fn booking_dates(from: NaiveDate, days: i64) -> impl Iterator<Item = NaiveDate> {
    (0..days).map(move |i| from + Duration::days(i))
}
