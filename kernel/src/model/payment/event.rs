use derive_new::new;
use rust_decimal::Decimal;

use super::PaymentKind;
use crate::model::id::BorrowingId;

// 作成される決済は常に Pending で始まる
#[derive(Debug, new)]
pub struct CreatePayment {
    pub borrowing_id: BorrowingId,
    pub kind: PaymentKind,
    pub session_id: String,
    pub session_url: String,
    pub money_to_pay: Decimal,
}
