use std::time::Duration;

use chrono::{NaiveDate, Utc};
use kernel::model::notification::NotificationEvent;
use registry::AppRegistry;
use shared::error::AppResult;

// 返却予定日を過ぎた未返却の貸出を定期的に検出して通知する常駐タスク。
// 貸出・決済の状態には一切書き込まない
pub async fn run_overdue_scanner(registry: AppRegistry) {
    let period = Duration::from_secs(registry.scheduler_config().scan_period);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        match scan_overdue_borrowings(&registry, Utc::now().date_naive()).await {
            Ok(notified) => {
                tracing::info!(notified, "延滞貸出スキャンを実行しました");
            }
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "延滞貸出スキャンに失敗しました"
                );
            }
        }
    }
}

pub async fn scan_overdue_borrowings(
    registry: &AppRegistry,
    today: NaiveDate,
) -> AppResult<usize> {
    let overdue = registry.borrowing_repository().find_overdue(today).await?;
    let mut notified = 0;
    for borrowing in overdue {
        let event = NotificationEvent::Overdue {
            borrower_email: borrowing.borrower.email.clone(),
            book_title: borrowing.book.title.clone(),
            expected_return_date: borrowing.expected_return_date,
        };
        // 1 件の配送失敗で残りを止めない
        if let Err(e) = registry.notifier().notify(event).await {
            tracing::warn!(
                borrowing_id = %borrowing.id,
                error.message = %e,
                "延滞通知の送信に失敗しました"
            );
            continue;
        }
        notified += 1;
    }
    Ok(notified)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use kernel::{notifier::MockNotifier, repository::borrowing::MockBorrowingRepository};

    use super::*;
    use crate::testing::{self, TestRegistryBuilder};

    #[tokio::test]
    async fn scanner_notifies_once_per_overdue_borrowing_and_mutates_nothing() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let due = NaiveDate::from_ymd_opt(2025, 7, 5).unwrap();

        let mut borrowing_repository = MockBorrowingRepository::new();
        borrowing_repository
            .expect_find_overdue()
            .withf(move |as_of| *as_of == today)
            .times(1)
            .returning(move |_| {
                Ok(vec![
                    testing::active_borrowing(due),
                    testing::active_borrowing(due),
                ])
            });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|event| matches!(event, NotificationEvent::Overdue { .. }))
            .times(2)
            .returning(|_| Ok(()));

        let registry = TestRegistryBuilder {
            borrowing_repository,
            notifier,
            ..TestRegistryBuilder::default()
        }
        .build();

        let notified = scan_overdue_borrowings(&registry, today).await.unwrap();
        assert_eq!(notified, 2);
    }

    #[tokio::test]
    async fn scanner_continues_after_a_failed_delivery() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let due = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();

        let mut borrowing_repository = MockBorrowingRepository::new();
        borrowing_repository.expect_find_overdue().returning(move |_| {
            Ok(vec![
                testing::active_borrowing(due),
                testing::active_borrowing(due),
            ])
        });

        let mut notifier = MockNotifier::new();
        let mut calls = 0;
        notifier.expect_notify().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(shared::error::AppError::NotificationError("down".into()))
            } else {
                Ok(())
            }
        });

        let registry = TestRegistryBuilder {
            borrowing_repository,
            notifier,
            ..TestRegistryBuilder::default()
        }
        .build();

        let notified = scan_overdue_borrowings(&registry, today).await.unwrap();
        assert_eq!(notified, 1);
    }
}
