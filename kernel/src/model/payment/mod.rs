use derive_new::new;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use shared::error::{AppError, AppResult};
use strum::{AsRefStr, EnumString};

use super::{
    id::{BorrowingId, PaymentId, UserId},
    role::Role,
};

pub mod event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentKind {
    Payment,
    Fine,
}

// Pending から Paid または Cancelled への一方向の遷移のみ許す。
// 遷移は mark_paid / mark_cancelled 系の明示的な操作に限る
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Payment {
    pub id: PaymentId,
    pub borrowing_id: BorrowingId,
    pub kind: PaymentKind,
    pub status: PaymentStatus,
    // 外部チェックアウトプロバイダへの参照。システムが生成する違約金では空になる
    pub session_id: String,
    pub session_url: String,
    pub money_to_pay: Decimal,
}

// 決済成功の通知に必要な関連情報込みの決済レコード
#[derive(Debug)]
pub struct PaidPayment {
    pub payment: Payment,
    pub borrower_email: String,
    pub book_title: String,
}

#[derive(Debug, PartialEq, new)]
pub struct PaymentListQuery {
    pub actor: UserId,
    pub role: Role,
}

impl PaymentListQuery {
    // 非スタッフは自身の貸出に紐づく決済のみ参照できる
    pub fn effective_owner(&self) -> Option<UserId> {
        match self.role {
            Role::User => Some(self.actor),
            Role::Staff => None,
        }
    }
}

// 延滞日数と日額料金から違約金額を求める。overdue_days > 0 の場合にのみ呼ばれる
pub fn fine_amount(overdue_days: i64, daily_fee: Decimal, multiplier: Decimal) -> Decimal {
    (Decimal::from(overdue_days) * daily_fee * multiplier).round_dp(2)
}

// 貸出期間と日額料金から決済総額を最小通貨単位（セント）で求める。端数は切り捨てる
pub fn checkout_amount_minor_units(days: i64, daily_fee: Decimal) -> AppResult<i64> {
    (Decimal::from(days) * daily_fee * Decimal::ONE_HUNDRED)
        .trunc()
        .to_i64()
        .ok_or_else(|| AppError::ConversionEntityError("決済金額が表現可能な範囲を超えています".into()))
}

pub fn from_minor_units(minor_units: i64) -> Decimal {
    Decimal::new(minor_units, 2)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn fine_is_days_times_fee_times_multiplier() {
        // 日額 2.00、倍率 1 で 5 日延滞した場合は 10.00
        assert_eq!(fine_amount(5, dec!(2.0), dec!(1)), dec!(10.00));
    }

    #[test]
    fn fine_honors_the_multiplier() {
        assert_eq!(fine_amount(3, dec!(1.50), dec!(2)), dec!(9.00));
        assert_eq!(fine_amount(1, dec!(0.33), dec!(1.5)), dec!(0.50));
    }

    #[test]
    fn checkout_amount_rounds_down_to_whole_cents() {
        // 4 日 × 2.00 = 800 セント
        assert_eq!(checkout_amount_minor_units(4, dec!(2.0)).unwrap(), 800);
        // 3 日 × 0.333 = 99.9 セント → 99 セントに切り捨て
        assert_eq!(checkout_amount_minor_units(3, dec!(0.333)).unwrap(), 99);
    }

    #[test]
    fn minor_units_convert_back_to_decimal() {
        assert_eq!(from_minor_units(800), dec!(8.00));
        assert_eq!(from_minor_units(99), dec!(0.99));
    }

    #[test]
    fn non_staff_payment_queries_are_scoped_to_the_actor() {
        let actor = UserId::new();
        assert_eq!(
            PaymentListQuery::new(actor, Role::User).effective_owner(),
            Some(actor)
        );
        assert_eq!(
            PaymentListQuery::new(actor, Role::Staff).effective_owner(),
            None
        );
    }
}
