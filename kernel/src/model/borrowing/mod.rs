use chrono::NaiveDate;
use derive_new::new;

use super::{
    book::BorrowedBook,
    id::{BorrowingId, UserId},
    role::Role,
    user::Borrower,
};

pub mod event;

// 1 冊の蔵書を 1 人の利用者に貸し出した記録。
// actual_return_date が None の間は貸出中で、返却操作で一度だけ設定される
#[derive(Debug, Clone)]
pub struct Borrowing {
    pub id: BorrowingId,
    pub borrower: Borrower,
    pub book: BorrowedBook,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
}

impl Borrowing {
    pub fn is_active(&self) -> bool {
        self.actual_return_date.is_none()
    }

    // 返却日（未返却なら基準日）が返却予定日を何日超過しているか
    pub fn overdue_days(&self, as_of: NaiveDate) -> i64 {
        let end = self.actual_return_date.unwrap_or(as_of);
        (end - self.expected_return_date).num_days()
    }
}

// 一覧取得の絞り込み条件。呼び出し側の権限を明示的に受け取る
#[derive(Debug, PartialEq, new)]
pub struct BorrowingListQuery {
    pub actor: UserId,
    pub role: Role,
    pub owner: Option<UserId>,
    pub is_active: Option<bool>,
}

impl BorrowingListQuery {
    // 実際に適用する所有者の絞り込み。
    // 非スタッフは指定値にかかわらず常に自身の貸出のみ参照できる
    pub fn effective_owner(&self) -> Option<UserId> {
        match self.role {
            Role::User => Some(self.actor),
            Role::Staff => self.owner,
        }
    }
}
