use kernel::model::{
    id::{BorrowingId, PaymentId},
    payment::{self, Payment},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub borrowing_id: BorrowingId,
}

#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub checkout_url: String,
    pub payment_id: PaymentId,
}

#[derive(Deserialize)]
pub struct SuccessQuery {
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub payment_id: PaymentId,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub detail: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentKind {
    Payment,
    Fine,
}

impl From<payment::PaymentKind> for PaymentKind {
    fn from(value: payment::PaymentKind) -> Self {
        match value {
            payment::PaymentKind::Payment => PaymentKind::Payment,
            payment::PaymentKind::Fine => PaymentKind::Fine,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
}

impl From<payment::PaymentStatus> for PaymentStatus {
    fn from(value: payment::PaymentStatus) -> Self {
        match value {
            payment::PaymentStatus::Pending => PaymentStatus::Pending,
            payment::PaymentStatus::Paid => PaymentStatus::Paid,
            payment::PaymentStatus::Cancelled => PaymentStatus::Cancelled,
        }
    }
}

#[derive(Serialize)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub borrowing_id: BorrowingId,
    #[serde(rename = "type")]
    pub kind: PaymentKind,
    pub status: PaymentStatus,
    pub session_id: String,
    pub session_url: String,
    pub money_to_pay: Decimal,
}

impl From<Payment> for PaymentResponse {
    fn from(value: Payment) -> Self {
        let Payment {
            id,
            borrowing_id,
            kind,
            status,
            session_id,
            session_url,
            money_to_pay,
        } = value;
        PaymentResponse {
            id,
            borrowing_id,
            kind: kind.into(),
            status: status.into(),
            session_id,
            session_url,
            money_to_pay,
        }
    }
}
