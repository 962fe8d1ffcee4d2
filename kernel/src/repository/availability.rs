use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    // from から days 日分すべてに空きがあるか
    async fn are_days_available(&self, from: NaiveDate, days: i64) -> AppResult<bool>;
    // 指定日の残りスペース数（0 未満にはならない）
    async fn available_spaces(&self, date: NaiveDate) -> AppResult<i64>;
}
