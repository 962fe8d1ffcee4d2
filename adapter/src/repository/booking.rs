use crate::database::{
    model::booking::{BookingRow, SpaceRow},
    ConnectionPool,
};
use crate::repository::availability::FULLY_BOOKED_DATE_QUERY;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use derive_new::new;
use kernel::model::{
    booking::{
        booking_dates,
        event::{CreateBooking, DeleteBooking, UpdateBooking},
        Booking, Space,
    },
    id::{BookingId, SpaceId, UserId},
};
use kernel::repository::booking::BookingRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
    // 1 日あたりの総スペース数
    spaces: i64,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    // 予約操作を行う
    async fn create(&self, event: CreateBooking) -> AppResult<Booking> {
        let mut tx = self.db.begin().await?;

        // 空き確認と INSERT を同一トランザクションで行い、
        // 定員超過の競合を防ぐためトランザクション分離レベルを
        // SERIALIZABLE に設定する
        self.set_transaction_serializable(&mut tx).await?;

        // 予約対象の全日付に空きがあるかを確認する。
        // 1 日でも満席ならここで打ち切る。
        self.assert_days_available(&mut tx, event.booking_from, event.days)
            .await?;

        let booking_id = BookingId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO bookings (booking_id, user_id)
                VALUES ($1, $2)
            "#,
        )
        .bind(booking_id)
        .bind(event.user_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been created".into(),
            ));
        }

        self.insert_spaces(&mut tx, booking_id, event.booking_from, event.days)
            .await?;

        // 保存直後の状態を読み直して返す
        let booking = self.fetch_booking_with_spaces(&mut tx, booking_id).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(booking)
    }

    // 予約の日付範囲を丸ごと置き換える
    async fn update(&self, event: UpdateBooking) -> AppResult<Booking> {
        let mut tx = self.db.begin().await?;

        self.set_transaction_serializable(&mut tx).await?;

        // 事前のチェックとして、以下を調べる。
        // - 指定の予約 ID をもつ予約が存在するか
        // - 存在した場合、リクエストしたユーザーが所有者か
        // - 希望の日付範囲に空きがあるか
        //
        // 空き確認はこの予約が現在持っている Space も数に含める。
        {
            let row = self.fetch_booking_row(&mut *tx, event.booking_id).await?;

            let Some(row) = row else {
                return Err(AppError::EntityNotFound(format!(
                    "booking ({}) was not found",
                    event.booking_id
                )));
            };

            if row.user_id != event.requested_user {
                return Err(AppError::ForbiddenOperation);
            }

            self.assert_days_available(&mut tx, event.booking_from, event.days)
                .await?;
        }

        // 既存の Space をすべて消してから新しい範囲を入れ直す。
        // 途中で失敗した場合はトランザクションごとロールバックされる。
        sqlx::query(
            r#"
                DELETE FROM spaces WHERE booking_id = $1
            "#,
        )
        .bind(event.booking_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        self.insert_spaces(&mut tx, event.booking_id, event.booking_from, event.days)
            .await?;

        let booking = self
            .fetch_booking_with_spaces(&mut tx, event.booking_id)
            .await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(booking)
    }

    // 予約と、それが持つ Space をすべて削除する
    async fn delete(&self, event: DeleteBooking) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        {
            let row = self.fetch_booking_row(&mut *tx, event.booking_id).await?;

            let Some(row) = row else {
                return Err(AppError::EntityNotFound(format!(
                    "booking ({}) was not found",
                    event.booking_id
                )));
            };

            if row.user_id != event.requested_user {
                return Err(AppError::ForbiddenOperation);
            }
        }

        // Space を先に消してから予約本体を消す（孤児を残さない）
        sqlx::query(
            r#"
                DELETE FROM spaces WHERE booking_id = $1
            "#,
        )
        .bind(event.booking_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let res = sqlx::query(
            r#"
                DELETE FROM bookings WHERE booking_id = $1
            "#,
        )
        .bind(event.booking_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been deleted".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        let row = self
            .fetch_booking_row(self.db.inner_ref(), booking_id)
            .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let spaces = self.fetch_spaces(self.db.inner_ref(), booking_id).await?;
                Ok(Some(row.into_booking(spaces)))
            }
        }
    }

    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
                SELECT booking_id, user_id, created_at
                FROM bookings
                WHERE user_id = $1
                ORDER BY created_at ASC, booking_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            let spaces = self
                .fetch_spaces(self.db.inner_ref(), row.booking_id)
                .await?;
            bookings.push(row.into_booking(spaces));
        }

        Ok(bookings)
    }
}

impl BookingRepositoryImpl {
    // create, update メソッドでのトランザクションを利用するにあたり
    // トランザクション分離レベルを SERIALIZABLE にするために
    // 内部的に使うメソッド
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    // [from, from + days - 1] の範囲に満席の日があれば CapacityExceeded を返す
    async fn assert_days_available(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        from: NaiveDate,
        days: i64,
    ) -> AppResult<()> {
        let to = from + Duration::days(days - 1);
        let full_date = sqlx::query_scalar::<_, NaiveDate>(FULLY_BOOKED_DATE_QUERY)
            .bind(from)
            .bind(to)
            .bind(self.spaces)
            .fetch_optional(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        if full_date.is_some() {
            return Err(AppError::CapacityExceeded);
        }

        Ok(())
    }

    // from から days 日分の Space を 1 日 1 行で INSERT する
    async fn insert_spaces(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        booking_id: BookingId,
        from: NaiveDate,
        days: i64,
    ) -> AppResult<()> {
        for date in booking_dates(from, days) {
            let res = sqlx::query(
                r#"
                    INSERT INTO spaces (space_id, booking_id, booked_on)
                    VALUES ($1, $2, $3)
                "#,
            )
            .bind(SpaceId::new())
            .bind(booking_id)
            .bind(date)
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if res.rows_affected() < 1 {
                return Err(AppError::NoRowsAffectedError(
                    "No space record has been created".into(),
                ));
            }
        }

        Ok(())
    }

    async fn fetch_booking_row<'a, E>(
        &self,
        executor: E,
        booking_id: BookingId,
    ) -> AppResult<Option<BookingRow>>
    where
        E: sqlx::PgExecutor<'a>,
    {
        sqlx::query_as(
            r#"
                SELECT booking_id, user_id, created_at
                FROM bookings
                WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::SpecificOperationError)
    }

    async fn fetch_spaces<'a, E>(&self, executor: E, booking_id: BookingId) -> AppResult<Vec<Space>>
    where
        E: sqlx::PgExecutor<'a>,
    {
        let rows: Vec<SpaceRow> = sqlx::query_as(
            r#"
                SELECT space_id, booking_id, booked_on
                FROM spaces
                WHERE booking_id = $1
                ORDER BY booked_on ASC
            "#,
        )
        .bind(booking_id)
        .fetch_all(executor)
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Space::from).collect())
    }

    async fn fetch_booking_with_spaces(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        booking_id: BookingId,
    ) -> AppResult<Booking> {
        let row = self
            .fetch_booking_row(&mut **tx, booking_id)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!("booking ({}) was not found", booking_id))
            })?;
        let spaces = self.fetch_spaces(&mut **tx, booking_id).await?;
        Ok(row.into_booking(spaces))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn fixture_user(pool: &sqlx::PgPool) -> anyhow::Result<UserId> {
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
        Ok(user_id)
    }

    fn tomorrow() -> NaiveDate {
        Utc::now().date_naive() + Duration::days(1)
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_create_booking_inserts_one_space_per_day(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()), 10);
        let user_id = fixture_user(&pool).await?;
        let from = tomorrow();

        let booking = repo.create(CreateBooking::new(user_id, from, 10)).await?;

        assert_eq!(booking.user_id, user_id);
        assert_eq!(booking.spaces.len(), 10);
        for (i, space) in booking.spaces.iter().enumerate() {
            assert_eq!(space.date, from + Duration::days(i as i64));
            assert_eq!(space.booking_id, booking.booking_id);
        }
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_create_booking_fails_when_capacity_exceeded(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()), 2);
        let user_id = fixture_user(&pool).await?;
        let from = tomorrow();

        repo.create(CreateBooking::new(user_id, from, 3)).await?;
        repo.create(CreateBooking::new(user_id, from, 3)).await?;

        // 定員 2 のもとで 3 件目は入らない
        let res = repo.create(CreateBooking::new(user_id, from, 3)).await;
        assert!(matches!(res, Err(AppError::CapacityExceeded)));
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_capacity_is_checked_per_date(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()), 1);
        let user_id = fixture_user(&pool).await?;
        let from = tomorrow();

        // 初日だけを埋める
        repo.create(CreateBooking::new(user_id, from, 1)).await?;

        // 初日を含む範囲は不可
        let res = repo.create(CreateBooking::new(user_id, from, 2)).await;
        assert!(matches!(res, Err(AppError::CapacityExceeded)));

        // 翌日からなら可
        let booking = repo
            .create(CreateBooking::new(user_id, from + Duration::days(1), 2))
            .await?;
        assert_eq!(booking.spaces.len(), 2);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_update_booking_replaces_date_range(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()), 10);
        let user_id = fixture_user(&pool).await?;
        let from = tomorrow();

        let booking = repo.create(CreateBooking::new(user_id, from, 10)).await?;
        let updated = repo
            .update(UpdateBooking::new(booking.booking_id, user_id, from, 3))
            .await?;

        assert_eq!(updated.booking_id, booking.booking_id);
        assert_eq!(updated.spaces.len(), 3);
        assert_eq!(updated.spaces[0].date, from);
        assert_eq!(updated.spaces[2].date, from + Duration::days(2));

        // 古い範囲の Space が残っていないこと
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM spaces WHERE booking_id = $1",
        )
        .bind(booking.booking_id)
        .fetch_one(&pool)
        .await?;
        assert_eq!(count, 3);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_update_booking_by_non_owner_is_forbidden(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()), 10);
        let owner = fixture_user(&pool).await?;
        let other = fixture_user(&pool).await?;
        let from = tomorrow();

        let booking = repo.create(CreateBooking::new(owner, from, 2)).await?;

        let res = repo
            .update(UpdateBooking::new(booking.booking_id, other, from, 3))
            .await;
        assert!(matches!(res, Err(AppError::ForbiddenOperation)));

        // 元の予約は手つかずのまま
        let unchanged = repo.find_by_id(booking.booking_id).await?.unwrap();
        assert_eq!(unchanged.spaces.len(), 2);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_delete_booking_removes_spaces(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()), 10);
        let user_id = fixture_user(&pool).await?;
        let from = tomorrow();

        let booking = repo.create(CreateBooking::new(user_id, from, 5)).await?;
        repo.delete(DeleteBooking {
            booking_id: booking.booking_id,
            requested_user: user_id,
        })
        .await?;

        assert!(repo.find_by_id(booking.booking_id).await?.is_none());

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM spaces WHERE booking_id = $1",
        )
        .bind(booking.booking_id)
        .fetch_one(&pool)
        .await?;
        assert_eq!(count, 0);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_delete_booking_by_non_owner_is_forbidden(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()), 10);
        let owner = fixture_user(&pool).await?;
        let other = fixture_user(&pool).await?;
        let from = tomorrow();

        let booking = repo.create(CreateBooking::new(owner, from, 2)).await?;
        let res = repo
            .delete(DeleteBooking {
                booking_id: booking.booking_id,
                requested_user: other,
            })
            .await;
        assert!(matches!(res, Err(AppError::ForbiddenOperation)));
        assert!(repo.find_by_id(booking.booking_id).await?.is_some());
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_find_by_user_id_lists_only_own_bookings(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()), 10);
        let user1 = fixture_user(&pool).await?;
        let user2 = fixture_user(&pool).await?;
        let from = tomorrow();

        repo.create(CreateBooking::new(user1, from, 1)).await?;
        repo.create(CreateBooking::new(user2, from, 1)).await?;
        repo.create(CreateBooking::new(user2, from, 1)).await?;

        let bookings = repo.find_by_user_id(user2).await?;
        assert_eq!(bookings.len(), 2);
        assert!(bookings.iter().all(|b| b.user_id == user2));
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_update_missing_booking_is_not_found(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()), 10);
        let user_id = fixture_user(&pool).await?;

        let res = repo
            .update(UpdateBooking::new(BookingId::new(), user_id, tomorrow(), 1))
            .await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
        Ok(())
    }
}
