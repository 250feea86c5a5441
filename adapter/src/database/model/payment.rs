use kernel::model::{
    id::{BorrowingId, PaymentId},
    payment::{PaidPayment, Payment, PaymentKind, PaymentStatus},
};
use rust_decimal::Decimal;
use shared::error::AppError;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub struct PaymentRow {
    pub payment_id: Uuid,
    pub borrowing_id: Uuid,
    pub kind: String,
    pub status: String,
    pub session_id: String,
    pub session_url: String,
    pub money_to_pay: Decimal,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(value: PaymentRow) -> Result<Self, Self::Error> {
        let PaymentRow {
            payment_id,
            borrowing_id,
            kind,
            status,
            session_id,
            session_url,
            money_to_pay,
        } = value;
        Ok(Payment {
            id: PaymentId::from(payment_id),
            borrowing_id: BorrowingId::from(borrowing_id),
            kind: parse_kind(&kind)?,
            status: parse_status(&status)?,
            session_id,
            session_url,
            money_to_pay,
        })
    }
}

// 決済成功通知に使う借り手・蔵書情報込みの行
#[derive(sqlx::FromRow)]
pub struct PaymentWithContactRow {
    pub payment_id: Uuid,
    pub borrowing_id: Uuid,
    pub kind: String,
    pub status: String,
    pub session_id: String,
    pub session_url: String,
    pub money_to_pay: Decimal,
    pub borrower_email: String,
    pub book_title: String,
}

impl PaymentWithContactRow {
    pub fn into_paid_payment(self, status: PaymentStatus) -> Result<PaidPayment, AppError> {
        let payment = Payment {
            id: PaymentId::from(self.payment_id),
            borrowing_id: BorrowingId::from(self.borrowing_id),
            kind: parse_kind(&self.kind)?,
            status,
            session_id: self.session_id,
            session_url: self.session_url,
            money_to_pay: self.money_to_pay,
        };
        Ok(PaidPayment {
            payment,
            borrower_email: self.borrower_email,
            book_title: self.book_title,
        })
    }

    pub fn status(&self) -> Result<PaymentStatus, AppError> {
        parse_status(&self.status)
    }
}

fn parse_kind(value: &str) -> Result<PaymentKind, AppError> {
    value
        .parse::<PaymentKind>()
        .map_err(|e| AppError::ConversionEntityError(e.to_string()))
}

fn parse_status(value: &str) -> Result<PaymentStatus, AppError> {
    value
        .parse::<PaymentStatus>()
        .map_err(|e| AppError::ConversionEntityError(e.to_string()))
}
