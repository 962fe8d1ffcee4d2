use crate::database::ConnectionPool;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use derive_new::new;
use kernel::repository::availability::AvailabilityRepository;
use shared::error::{AppError, AppResult};

// [$1, $2] の範囲で満席になっている日を 1 件探すクエリ。
// BookingRepositoryImpl のトランザクション内空き確認もこれを使う。
pub(crate) const FULLY_BOOKED_DATE_QUERY: &str = r#"
    SELECT booked_on
    FROM spaces
    WHERE booked_on >= $1 AND booked_on <= $2
    GROUP BY booked_on
    HAVING COUNT(*) >= $3
    LIMIT 1
"#;

#[derive(new)]
pub struct AvailabilityRepositoryImpl {
    db: ConnectionPool,
    // 1 日あたりの総スペース数
    spaces: i64,
}

#[async_trait]
impl AvailabilityRepository for AvailabilityRepositoryImpl {
    // from から days 日分の範囲に、満席の日が 1 日でもあれば false を返す。
    // 範囲は予約が実際に占有する [from, from + days - 1]。
    async fn are_days_available(&self, from: NaiveDate, days: i64) -> AppResult<bool> {
        let to = from + Duration::days(days - 1);
        let full_date = sqlx::query_scalar::<_, NaiveDate>(FULLY_BOOKED_DATE_QUERY)
            .bind(from)
            .bind(to)
            .bind(self.spaces)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(full_date.is_none())
    }

    async fn available_spaces(&self, date: NaiveDate) -> AppResult<i64> {
        let used = sqlx::query_scalar::<_, i64>(
            r#"
                SELECT COUNT(*)
                FROM spaces
                WHERE booked_on = $1
            "#,
        )
        .bind(date)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        // 定員超過があっても負の値は返さない
        Ok((self.spaces - used).max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kernel::model::id::{BookingId, SpaceId, UserId};

    // spaces テーブルに直接 1 日分のレコードを積むテスト用ヘルパー
    async fn fixture_spaces_on(pool: &sqlx::PgPool, date: NaiveDate, n: i64) -> anyhow::Result<()> {
        let user_id = UserId::new();
        sqlx::query(
            "INSERT INTO users (user_id, user_name, email, password_hash) VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind("Test User")
        .bind(format!("{}@example.com", user_id))
        .bind("dummy-hash")
        .execute(pool)
        .await?;

        let booking_id = BookingId::new();
        sqlx::query("INSERT INTO bookings (booking_id, user_id) VALUES ($1, $2)")
            .bind(booking_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        for _ in 0..n {
            sqlx::query("INSERT INTO spaces (space_id, booking_id, booked_on) VALUES ($1, $2, $3)")
                .bind(SpaceId::new())
                .bind(booking_id)
                .bind(date)
                .execute(pool)
                .await?;
        }
        Ok(())
    }

    fn tomorrow() -> NaiveDate {
        Utc::now().date_naive() + Duration::days(1)
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_days_are_available_when_no_bookings(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = AvailabilityRepositoryImpl::new(ConnectionPool::new(pool), 10);
        assert!(repo.are_days_available(tomorrow(), 10).await?);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_days_are_not_available_when_one_day_is_full(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = AvailabilityRepositoryImpl::new(ConnectionPool::new(pool.clone()), 2);
        let from = tomorrow();

        // 範囲の最終日だけを満席にする
        fixture_spaces_on(&pool, from + Duration::days(2), 2).await?;

        assert!(!repo.are_days_available(from, 3).await?);
        // 満席日の手前までなら空いている
        assert!(repo.are_days_available(from, 2).await?);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_available_spaces_counts_remaining(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = AvailabilityRepositoryImpl::new(ConnectionPool::new(pool.clone()), 10);
        let date = tomorrow();

        assert_eq!(repo.available_spaces(date).await?, 10);

        fixture_spaces_on(&pool, date, 4).await?;
        assert_eq!(repo.available_spaces(date).await?, 6);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_available_spaces_never_negative(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = AvailabilityRepositoryImpl::new(ConnectionPool::new(pool.clone()), 2);
        let date = tomorrow();

        // 定員より多いレコードが存在しても 0 で止まる
        fixture_spaces_on(&pool, date, 5).await?;
        assert_eq!(repo.available_spaces(date).await?, 0);
        Ok(())
    }
}
