use chrono::NaiveDate;
use kernel::model::{
    book::BorrowedBook,
    borrowing::Borrowing,
    id::{BookId, BorrowingId, UserId},
    user::Borrower,
};
use rust_decimal::Decimal;
use uuid::Uuid;

// 借り手と蔵書を結合した貸出 1 件分の行
#[derive(sqlx::FromRow)]
pub struct BorrowingRow {
    pub borrowing_id: Uuid,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub book_id: Uuid,
    pub book_title: String,
    pub book_author: String,
    pub book_daily_fee: Decimal,
}

impl From<BorrowingRow> for Borrowing {
    fn from(value: BorrowingRow) -> Self {
        let BorrowingRow {
            borrowing_id,
            borrow_date,
            expected_return_date,
            actual_return_date,
            user_id,
            user_name,
            user_email,
            book_id,
            book_title,
            book_author,
            book_daily_fee,
        } = value;
        Borrowing {
            id: BorrowingId::from(borrowing_id),
            borrower: Borrower {
                id: UserId::from(user_id),
                name: user_name,
                email: user_email,
            },
            book: BorrowedBook {
                id: BookId::from(book_id),
                title: book_title,
                author: book_author,
                daily_fee: book_daily_fee,
            },
            borrow_date,
            expected_return_date,
            actual_return_date,
        }
    }
}

// 返却処理で行ロックとともに取得する最小限の列
#[derive(sqlx::FromRow)]
pub struct ReturnTargetRow {
    pub borrowing_id: Uuid,
    pub book_id: Uuid,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub daily_fee: Decimal,
}
