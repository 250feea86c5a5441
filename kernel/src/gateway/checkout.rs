use async_trait::async_trait;
use derive_new::new;
use shared::error::AppResult;

// 外部チェックアウトプロバイダに作成を依頼するセッションの内容
#[derive(Debug, Clone, PartialEq, new)]
pub struct CreateSession {
    pub amount_minor_units: i64,
    pub currency: String,
    pub product_name: String,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub payment_status: SessionPaymentStatus,
    pub payment_intent_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub charge_ids: Vec<String>,
}

#[mockall::automock]
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_session(&self, event: CreateSession) -> AppResult<CheckoutSession>;
    async fn retrieve_session(&self, session_id: &str) -> AppResult<SessionState>;
    // ベストエフォート。失敗しても呼び出し元の決済操作は継続する
    async fn expire_session(&self, session_id: &str) -> AppResult<()>;
    async fn retrieve_payment_intent(&self, payment_intent_id: &str)
        -> AppResult<PaymentIntent>;
    async fn create_refund(&self, charge_id: &str) -> AppResult<()>;
}
