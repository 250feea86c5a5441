use chrono::NaiveDate;
use kernel::model::{
    book::BorrowedBook,
    borrowing::Borrowing,
    id::{BookId, BorrowingId, UserId},
    user::Borrower,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct CreateBorrowingRequest {
    pub book_id: BookId,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
}

// クエリ文字列はそのまま受け取り、解釈はハンドラ側で行う
#[derive(Deserialize, Default)]
pub struct BorrowingListQueryParams {
    pub user_id: Option<String>,
    pub is_active: Option<String>,
}

impl BorrowingListQueryParams {
    // "true"/"1"（大文字小文字を区別しない）のみ真。指定があってそれ以外なら偽
    pub fn is_active_flag(&self) -> Option<bool> {
        self.is_active
            .as_ref()
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1"))
    }
}

#[derive(Debug, Serialize)]
pub struct BorrowerResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<Borrower> for BorrowerResponse {
    fn from(value: Borrower) -> Self {
        let Borrower { id, name, email } = value;
        BorrowerResponse { id, name, email }
    }
}

#[derive(Debug, Serialize)]
pub struct BorrowedBookResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub daily_fee: Decimal,
}

impl From<BorrowedBook> for BorrowedBookResponse {
    fn from(value: BorrowedBook) -> Self {
        let BorrowedBook {
            id,
            title,
            author,
            daily_fee,
        } = value;
        BorrowedBookResponse {
            id,
            title,
            author,
            daily_fee,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BorrowingResponse {
    pub id: BorrowingId,
    pub user: BorrowerResponse,
    pub book: BorrowedBookResponse,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
}

impl From<Borrowing> for BorrowingResponse {
    fn from(value: Borrowing) -> Self {
        let Borrowing {
            id,
            borrower,
            book,
            borrow_date,
            expected_return_date,
            actual_return_date,
        } = value;
        BorrowingResponse {
            id,
            user: borrower.into(),
            book: book.into(),
            borrow_date,
            expected_return_date,
            actual_return_date,
        }
    }
}
