use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::PaymentId,
    payment::{event::CreatePayment, PaidPayment, Payment, PaymentListQuery},
};

#[mockall::automock]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, event: CreatePayment) -> AppResult<Payment>;
    async fn find_by_id(&self, payment_id: PaymentId) -> AppResult<Option<Payment>>;
    // セッション ID に紐づく決済を Paid に遷移させる。
    // すでに Paid の場合は同じ値を書き直すだけで拒否しない。Cancelled からの復帰は拒否する
    async fn mark_paid_by_session(&self, session_id: &str) -> AppResult<Option<PaidPayment>>;
    async fn mark_cancelled(&self, payment_id: PaymentId) -> AppResult<Payment>;
    async fn find_all(&self, query: PaymentListQuery) -> AppResult<Vec<Payment>>;
}
