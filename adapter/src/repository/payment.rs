use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        id::{PaymentId, UserId},
        payment::{
            event::CreatePayment, PaidPayment, Payment, PaymentListQuery, PaymentStatus,
        },
    },
    repository::payment::PaymentRepository,
};
use shared::error::{AppError, AppResult};

use crate::database::{
    model::payment::{PaymentRow, PaymentWithContactRow},
    ConnectionPool,
};

#[derive(new)]
pub struct PaymentRepositoryImpl {
    db: ConnectionPool,
}

const PAYMENT_ROW_SELECT: &str = r#"
    SELECT
        p.payment_id,
        p.borrowing_id,
        p.kind,
        p.status,
        p.session_id,
        p.session_url,
        p.money_to_pay
    FROM payments AS p
"#;

#[async_trait]
impl PaymentRepository for PaymentRepositoryImpl {
    async fn create(&self, event: CreatePayment) -> AppResult<Payment> {
        let payment_id = PaymentId::new();
        sqlx::query(
            r#"
                INSERT INTO payments (
                    payment_id, borrowing_id, kind, status, session_id, session_url, money_to_pay
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(payment_id.raw())
        .bind(event.borrowing_id.raw())
        .bind(event.kind.as_ref())
        .bind(PaymentStatus::Pending.as_ref())
        .bind(&event.session_id)
        .bind(&event.session_url)
        .bind(event.money_to_pay)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(Payment {
            id: payment_id,
            borrowing_id: event.borrowing_id,
            kind: event.kind,
            status: PaymentStatus::Pending,
            session_id: event.session_id,
            session_url: event.session_url,
            money_to_pay: event.money_to_pay,
        })
    }

    async fn find_by_id(&self, payment_id: PaymentId) -> AppResult<Option<Payment>> {
        let sql = format!("{PAYMENT_ROW_SELECT} WHERE p.payment_id = $1");
        let row = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(payment_id.raw())
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        row.map(Payment::try_from).transpose()
    }

    async fn mark_paid_by_session(&self, session_id: &str) -> AppResult<Option<PaidPayment>> {
        let mut tx = self.db.begin().await?;

        // 状態遷移の検査と更新を同一トランザクション内の行ロックの下で行う
        let row = sqlx::query_as::<_, PaymentWithContactRow>(
            r#"
                SELECT
                    p.payment_id,
                    p.borrowing_id,
                    p.kind,
                    p.status,
                    p.session_id,
                    p.session_url,
                    p.money_to_pay,
                    u.email AS borrower_email,
                    bk.title AS book_title
                FROM payments AS p
                INNER JOIN borrowings AS b USING (borrowing_id)
                INNER JOIN users AS u USING (user_id)
                INNER JOIN books AS bk USING (book_id)
                WHERE p.session_id = $1
                FOR UPDATE OF p
            "#,
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Ok(None);
        };

        // Cancelled は終端状態。Paid への復帰は認めない
        if row.status()? == PaymentStatus::Cancelled {
            return Err(AppError::UnprocessableEntity(
                "キャンセル済みの決済を支払い済みにはできません".into(),
            ));
        }

        sqlx::query("UPDATE payments SET status = $2 WHERE payment_id = $1")
            .bind(row.payment_id)
            .bind(PaymentStatus::Paid.as_ref())
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(Some(row.into_paid_payment(PaymentStatus::Paid)?))
    }

    async fn mark_cancelled(&self, payment_id: PaymentId) -> AppResult<Payment> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
                UPDATE payments SET status = $2
                WHERE payment_id = $1
                RETURNING payment_id, borrowing_id, kind, status,
                          session_id, session_url, money_to_pay
            "#,
        )
        .bind(payment_id.raw())
        .bind(PaymentStatus::Cancelled.as_ref())
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .ok_or_else(|| AppError::EntityNotFound("Payment not found.".into()))?;
        Payment::try_from(row)
    }

    async fn find_all(&self, query: PaymentListQuery) -> AppResult<Vec<Payment>> {
        let sql = format!(
            r#"
                {PAYMENT_ROW_SELECT}
                INNER JOIN borrowings AS b USING (borrowing_id)
                WHERE ($1::uuid IS NULL OR b.user_id = $1)
                ORDER BY p.payment_id
            "#
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(query.effective_owner().map(UserId::raw))
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        rows.into_iter().map(Payment::try_from).collect()
    }
}
