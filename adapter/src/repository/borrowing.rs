use async_trait::async_trait;
use chrono::NaiveDate;
use derive_new::new;
use kernel::{
    model::{
        borrowing::{
            event::{CreateBorrowing, ReturnBorrowing},
            Borrowing, BorrowingListQuery,
        },
        id::{BorrowingId, PaymentId, UserId},
        payment::{fine_amount, Payment, PaymentKind, PaymentStatus},
        role::Role,
    },
    repository::borrowing::BorrowingRepository,
};
use shared::error::{AppError, AppResult};
use sqlx::PgConnection;

use crate::database::{
    model::borrowing::{BorrowingRow, ReturnTargetRow},
    ConnectionPool,
};

#[derive(new)]
pub struct BorrowingRepositoryImpl {
    db: ConnectionPool,
}

const BORROWING_ROW_SELECT: &str = r#"
    SELECT
        b.borrowing_id,
        b.borrow_date,
        b.expected_return_date,
        b.actual_return_date,
        u.user_id,
        u.name AS user_name,
        u.email AS user_email,
        bk.book_id,
        bk.title AS book_title,
        bk.author AS book_author,
        bk.daily_fee AS book_daily_fee
    FROM borrowings AS b
    INNER JOIN users AS u USING (user_id)
    INNER JOIN books AS bk USING (book_id)
"#;

impl BorrowingRepositoryImpl {
    async fn fetch_by_id(
        conn: &mut PgConnection,
        borrowing_id: BorrowingId,
    ) -> AppResult<Option<BorrowingRow>> {
        let query = format!("{BORROWING_ROW_SELECT} WHERE b.borrowing_id = $1");
        sqlx::query_as::<_, BorrowingRow>(&query)
            .bind(borrowing_id.raw())
            .fetch_optional(conn)
            .await
            .map_err(AppError::SpecificOperationError)
    }
}

#[async_trait]
impl BorrowingRepository for BorrowingRepositoryImpl {
    async fn create(&self, event: CreateBorrowing) -> AppResult<Borrowing> {
        let mut tx = self.db.begin().await?;

        // 在庫の引き当て。条件付き UPDATE なので在庫ゼロのときは行が更新されない
        let res = sqlx::query(
            "UPDATE books SET inventory = inventory - 1 WHERE book_id = $1 AND inventory >= 1",
        )
        .bind(event.book_id.raw())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM books WHERE book_id = $1)")
                    .bind(event.book_id.raw())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(AppError::SpecificOperationError)?;
            return Err(if exists {
                AppError::OutOfStock
            } else {
                AppError::EntityNotFound("指定された蔵書が見つかりませんでした".into())
            });
        }

        let borrowing_id = BorrowingId::new();
        sqlx::query(
            r#"
                INSERT INTO borrowings (
                    borrowing_id, user_id, book_id, borrow_date, expected_return_date
                )
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(borrowing_id.raw())
        .bind(event.user_id.raw())
        .bind(event.book_id.raw())
        .bind(event.borrow_date)
        .bind(event.expected_return_date)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let row = Self::fetch_by_id(&mut *tx, borrowing_id)
            .await?
            .ok_or_else(|| AppError::NoRowAffectedError("No borrowing record created".into()))?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(row.into())
    }

    async fn return_book(
        &self,
        event: ReturnBorrowing,
    ) -> AppResult<(Borrowing, Option<Payment>)> {
        let mut tx = self.db.begin().await?;

        // 行ロックを取り、同一貸出に対する並行した返却要求を直列化する
        let target = sqlx::query_as::<_, ReturnTargetRow>(
            r#"
                SELECT
                    b.borrowing_id,
                    b.book_id,
                    b.expected_return_date,
                    b.actual_return_date,
                    bk.daily_fee
                FROM borrowings AS b
                INNER JOIN books AS bk USING (book_id)
                WHERE b.borrowing_id = $1 AND ($2 OR b.user_id = $3)
                FOR UPDATE OF b
            "#,
        )
        .bind(event.borrowing_id.raw())
        .bind(matches!(event.role, Role::Staff))
        .bind(event.actor.raw())
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?
        .ok_or_else(|| AppError::EntityNotFound("指定された貸出が見つかりませんでした".into()))?;

        if target.actual_return_date.is_some() {
            return Err(AppError::AlreadyReturned);
        }

        sqlx::query("UPDATE borrowings SET actual_return_date = $2 WHERE borrowing_id = $1")
            .bind(target.borrowing_id)
            .bind(event.returned_on)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        // 返却された 1 冊を在庫に戻す。上限の検査は行わない
        sqlx::query("UPDATE books SET inventory = inventory + 1 WHERE book_id = $1")
            .bind(target.book_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        let overdue_days = (event.returned_on - target.expected_return_date).num_days();
        let fine = if overdue_days > 0 {
            let amount = fine_amount(overdue_days, target.daily_fee, event.fine_multiplier);
            let payment_id = PaymentId::new();
            sqlx::query(
                r#"
                    INSERT INTO payments (
                        payment_id, borrowing_id, kind, status, session_id, session_url, money_to_pay
                    )
                    VALUES ($1, $2, $3, $4, '', '', $5)
                "#,
            )
            .bind(payment_id.raw())
            .bind(target.borrowing_id)
            .bind(PaymentKind::Fine.as_ref())
            .bind(PaymentStatus::Pending.as_ref())
            .bind(amount)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
            Some(Payment {
                id: payment_id,
                borrowing_id: event.borrowing_id,
                kind: PaymentKind::Fine,
                status: PaymentStatus::Pending,
                session_id: String::new(),
                session_url: String::new(),
                money_to_pay: amount,
            })
        } else {
            None
        };

        let row = Self::fetch_by_id(&mut *tx, event.borrowing_id)
            .await?
            .ok_or_else(|| AppError::NoRowAffectedError("No borrowing record updated".into()))?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok((row.into(), fine))
    }

    async fn find_all(&self, query: BorrowingListQuery) -> AppResult<Vec<Borrowing>> {
        let sql = format!(
            r#"
                {BORROWING_ROW_SELECT}
                WHERE ($1::uuid IS NULL OR b.user_id = $1)
                  AND ($2::boolean IS NULL OR (b.actual_return_date IS NULL) = $2)
                ORDER BY b.borrow_date DESC, b.borrowing_id
            "#
        );
        let rows = sqlx::query_as::<_, BorrowingRow>(&sql)
            .bind(query.effective_owner().map(UserId::raw))
            .bind(query.is_active)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(rows.into_iter().map(Borrowing::from).collect())
    }

    async fn find_owned(
        &self,
        borrowing_id: BorrowingId,
        owner: UserId,
    ) -> AppResult<Option<Borrowing>> {
        let sql = format!("{BORROWING_ROW_SELECT} WHERE b.borrowing_id = $1 AND b.user_id = $2");
        let row = sqlx::query_as::<_, BorrowingRow>(&sql)
            .bind(borrowing_id.raw())
            .bind(owner.raw())
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(row.map(Borrowing::from))
    }

    async fn find_overdue(&self, as_of: NaiveDate) -> AppResult<Vec<Borrowing>> {
        let sql = format!(
            r#"
                {BORROWING_ROW_SELECT}
                WHERE b.actual_return_date IS NULL AND b.expected_return_date < $1
                ORDER BY b.expected_return_date
            "#
        );
        let rows = sqlx::query_as::<_, BorrowingRow>(&sql)
            .bind(as_of)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(rows.into_iter().map(Borrowing::from).collect())
    }
}
