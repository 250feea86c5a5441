use chrono::NaiveDate;
use rust_decimal::Decimal;

// 運用者チャンネルへ送るライフサイクルイベント
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    NewBorrowing {
        borrower_email: String,
        book_title: String,
        expected_return_date: NaiveDate,
    },
    PaymentSucceeded {
        borrower_email: String,
        book_title: String,
        amount: Decimal,
    },
    Overdue {
        borrower_email: String,
        book_title: String,
        expected_return_date: NaiveDate,
    },
}
