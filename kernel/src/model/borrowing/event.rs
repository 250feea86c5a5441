use chrono::NaiveDate;
use derive_new::new;
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult};

use crate::model::{
    id::{BookId, BorrowingId, UserId},
    role::Role,
};

#[derive(Debug)]
pub struct CreateBorrowing {
    pub user_id: UserId,
    pub book_id: BookId,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
}

impl CreateBorrowing {
    // 日付の前後関係はどの状態にも触れる前に検証する
    pub fn new(
        user_id: UserId,
        book_id: BookId,
        borrow_date: NaiveDate,
        expected_return_date: NaiveDate,
    ) -> AppResult<Self> {
        if expected_return_date < borrow_date {
            return Err(AppError::InvalidDateRange);
        }
        Ok(Self {
            user_id,
            book_id,
            borrow_date,
            expected_return_date,
        })
    }
}

#[derive(Debug, new)]
pub struct ReturnBorrowing {
    pub borrowing_id: BorrowingId,
    pub actor: UserId,
    pub role: Role,
    pub returned_on: NaiveDate,
    pub fine_multiplier: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expected_return_date_may_equal_borrow_date() {
        let day = date(2025, 7, 1);
        assert!(CreateBorrowing::new(UserId::new(), BookId::new(), day, day).is_ok());
    }

    #[test]
    fn expected_return_date_before_borrow_date_is_rejected() {
        let result = CreateBorrowing::new(
            UserId::new(),
            BookId::new(),
            date(2025, 7, 5),
            date(2025, 7, 1),
        );
        assert!(matches!(result, Err(AppError::InvalidDateRange)));
    }
}
