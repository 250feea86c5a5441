use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;

use crate::model::{
    borrowing::{
        event::{CreateBorrowing, ReturnBorrowing},
        Borrowing, BorrowingListQuery,
    },
    id::{BorrowingId, UserId},
    payment::Payment,
};

#[mockall::automock]
#[async_trait]
pub trait BorrowingRepository: Send + Sync {
    // 貸出操作。在庫の引き当てと貸出レコードの作成を同一トランザクションで行う
    async fn create(&self, event: CreateBorrowing) -> AppResult<Borrowing>;
    // 返却操作。返却済みの貸出には AlreadyReturned を返し、
    // 延滞していた場合は Pending の違約金決済を併せて作成する
    async fn return_book(&self, event: ReturnBorrowing)
        -> AppResult<(Borrowing, Option<Payment>)>;
    // 権限に応じて絞り込んだ貸出一覧
    async fn find_all(&self, query: BorrowingListQuery) -> AppResult<Vec<Borrowing>>;
    // 指定の利用者自身が借り手である貸出を取得する
    async fn find_owned(
        &self,
        borrowing_id: BorrowingId,
        owner: UserId,
    ) -> AppResult<Option<Borrowing>>;
    // 返却予定日を過ぎた未返却の貸出をすべて取得する
    async fn find_overdue(&self, as_of: NaiveDate) -> AppResult<Vec<Borrowing>>;
}
