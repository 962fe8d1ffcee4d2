use crate::database::ConnectionPool;
use async_trait::async_trait;
use chrono::NaiveDate;
use derive_new::new;
use kernel::repository::price::PriceRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct PriceRepositoryImpl {
    db: ConnectionPool,
    minimum_price: i32,
}

#[async_trait]
impl PriceRepository for PriceRepositoryImpl {
    // 有効期間は [valid_from, valid_to)。期間が重なる場合は
    // valid_from が最も新しい行を採用する。
    async fn price_for(&self, date: NaiveDate) -> AppResult<i32> {
        let price = sqlx::query_scalar::<_, i32>(
            r#"
                SELECT price
                FROM prices
                WHERE valid_from <= $1 AND valid_to > $1
                ORDER BY valid_from DESC
                LIMIT 1
            "#,
        )
        .bind(date)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        // 該当する価格が無い、または下限を下回る場合は下限価格を返す
        Ok(match price {
            Some(price) if price >= self.minimum_price => price,
            _ => self.minimum_price,
        })
    }
}
