use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;

#[async_trait]
pub trait PriceRepository: Send + Sync {
    // 指定日に有効な価格を返す。該当なし・下限割れの場合は下限価格。
    async fn price_for(&self, date: NaiveDate) -> AppResult<i32>;
}
