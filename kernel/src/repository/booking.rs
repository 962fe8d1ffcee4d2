use crate::model::{
    booking::{
        event::{CreateBooking, DeleteBooking, UpdateBooking},
        Booking,
    },
    id::{BookingId, UserId},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    // 予約を作成し、保存後の集約（Space 含む）を返す
    async fn create(&self, event: CreateBooking) -> AppResult<Booking>;
    // 予約の日付範囲を丸ごと置き換える
    async fn update(&self, event: UpdateBooking) -> AppResult<Booking>;
    // 予約と、それが持つ Space をすべて削除する
    async fn delete(&self, event: DeleteBooking) -> AppResult<()>;
    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>>;
    // ユーザーが所有する予約の一覧を作成順で返す
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>>;
}
