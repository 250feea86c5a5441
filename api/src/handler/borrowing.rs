use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use kernel::model::{
    borrowing::{
        event::{CreateBorrowing, ReturnBorrowing},
        BorrowingListQuery,
    },
    id::{BorrowingId, UserId},
    notification::NotificationEvent,
    role::Role,
};
use registry::AppRegistry;
use shared::error::AppResult;

use crate::{
    extractor::AuthorizedUser,
    model::borrowing::{BorrowingListQueryParams, BorrowingResponse, CreateBorrowingRequest},
    notification::dispatch_notification,
};

pub async fn register_borrowing(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBorrowingRequest>,
) -> AppResult<Json<BorrowingResponse>> {
    let event = CreateBorrowing::new(
        user.id(),
        req.book_id,
        req.borrow_date,
        req.expected_return_date,
    )?;
    let borrowing = registry.borrowing_repository().create(event).await?;

    dispatch_notification(
        registry.notifier(),
        NotificationEvent::NewBorrowing {
            borrower_email: borrowing.borrower.email.clone(),
            book_title: borrowing.book.title.clone(),
            expected_return_date: borrowing.expected_return_date,
        },
    );

    Ok(Json(borrowing.into()))
}

pub async fn show_borrowing_list(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Query(params): Query<BorrowingListQueryParams>,
) -> AppResult<Json<Vec<BorrowingResponse>>> {
    let role = if user.is_staff() { Role::Staff } else { Role::User };
    let owner = params
        .user_id
        .as_deref()
        .map(UserId::from_str)
        .transpose()?;
    let query = BorrowingListQuery::new(user.id(), role, owner, params.is_active_flag());
    let borrowings = registry.borrowing_repository().find_all(query).await?;
    Ok(Json(
        borrowings.into_iter().map(BorrowingResponse::from).collect(),
    ))
}

pub async fn return_borrowing(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Path(borrowing_id): Path<BorrowingId>,
) -> AppResult<Json<BorrowingResponse>> {
    let role = if user.is_staff() { Role::Staff } else { Role::User };
    let event = ReturnBorrowing::new(
        borrowing_id,
        user.id(),
        role,
        Utc::now().date_naive(),
        registry.fine_multiplier(),
    );
    let (borrowing, fine) = registry.borrowing_repository().return_book(event).await?;

    // 違約金の作成自体は通知しない。通知は決済が Paid になったときに送られる
    if let Some(fine) = fine {
        tracing::info!(
            payment_id = %fine.id,
            amount = %fine.money_to_pay,
            "延滞違約金を作成しました"
        );
    }

    Ok(Json(borrowing.into()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use kernel::{
        model::{book::BorrowedBook, borrowing::Borrowing, id::BookId, user::Borrower},
        repository::borrowing::MockBorrowingRepository,
    };
    use rust_decimal_macros::dec;
    use shared::error::AppError;

    use super::*;
    use crate::testing::{authorized_user, TestRegistryBuilder};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn borrowing_for(owner: UserId, expected: NaiveDate) -> Borrowing {
        Borrowing {
            id: BorrowingId::new(),
            borrower: Borrower {
                id: owner,
                name: "user".into(),
                email: "user@example.com".into(),
            },
            book: BorrowedBook {
                id: BookId::new(),
                title: "Book".into(),
                author: "Author".into(),
                daily_fee: dec!(2.00),
            },
            borrow_date: date(2025, 7, 1),
            expected_return_date: expected,
            actual_return_date: None,
        }
    }

    #[tokio::test]
    async fn register_borrowing_returns_the_created_record() {
        let user = authorized_user(Role::User);
        let actor = user.id();
        let expected = date(2025, 7, 5);

        let mut notifier = kernel::notifier::MockNotifier::new();
        notifier.expect_notify().returning(|_| Ok(()));

        let mut borrowing_repository = MockBorrowingRepository::new();
        borrowing_repository
            .expect_create()
            .withf(move |event| event.user_id == actor && event.borrow_date == date(2025, 7, 1))
            .times(1)
            .returning(move |event| {
                let mut b = borrowing_for(event.user_id, event.expected_return_date);
                b.book.id = event.book_id;
                Ok(b)
            });

        let registry = TestRegistryBuilder {
            borrowing_repository,
            notifier,
            ..TestRegistryBuilder::default()
        }
        .build();

        let req = CreateBorrowingRequest {
            book_id: BookId::new(),
            borrow_date: date(2025, 7, 1),
            expected_return_date: expected,
        };
        let Json(res) = register_borrowing(user, State(registry), Json(req))
            .await
            .unwrap();
        assert_eq!(res.expected_return_date, expected);
        assert!(res.actual_return_date.is_none());
    }

    #[tokio::test]
    async fn register_borrowing_rejects_reversed_dates_before_touching_state() {
        let user = authorized_user(Role::User);
        // リポジトリには期待を設定しない。呼ばれたらテストは失敗する
        let registry = TestRegistryBuilder::default().build();

        let req = CreateBorrowingRequest {
            book_id: BookId::new(),
            borrow_date: date(2025, 7, 5),
            expected_return_date: date(2025, 7, 1),
        };
        let err = register_borrowing(user, State(registry), Json(req))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidDateRange));
    }

    #[tokio::test]
    async fn register_borrowing_propagates_out_of_stock() {
        let user = authorized_user(Role::User);
        let mut borrowing_repository = MockBorrowingRepository::new();
        borrowing_repository
            .expect_create()
            .returning(|_| Err(AppError::OutOfStock));

        let registry = TestRegistryBuilder {
            borrowing_repository,
            ..TestRegistryBuilder::default()
        }
        .build();

        let req = CreateBorrowingRequest {
            book_id: BookId::new(),
            borrow_date: date(2025, 7, 1),
            expected_return_date: date(2025, 7, 5),
        };
        let err = register_borrowing(user, State(registry), Json(req))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OutOfStock));
    }

    #[tokio::test]
    async fn non_staff_list_is_scoped_to_the_actor_even_with_a_user_id_filter() {
        let user = authorized_user(Role::User);
        let actor = user.id();
        let someone_else = UserId::new();

        let mut borrowing_repository = MockBorrowingRepository::new();
        borrowing_repository
            .expect_find_all()
            .withf(move |query| {
                query.role == Role::User && query.effective_owner() == Some(actor)
            })
            .times(1)
            .returning(|_| Ok(vec![]));

        let registry = TestRegistryBuilder {
            borrowing_repository,
            ..TestRegistryBuilder::default()
        }
        .build();

        let params = BorrowingListQueryParams {
            user_id: Some(someone_else.to_string()),
            is_active: None,
        };
        let Json(res) = show_borrowing_list(user, State(registry), Query(params))
            .await
            .unwrap();
        assert!(res.is_empty());
    }

    #[tokio::test]
    async fn staff_list_passes_the_owner_filter_through() {
        let user = authorized_user(Role::Staff);
        let target = UserId::new();

        let mut borrowing_repository = MockBorrowingRepository::new();
        borrowing_repository
            .expect_find_all()
            .withf(move |query| {
                query.role == Role::Staff
                    && query.effective_owner() == Some(target)
                    && query.is_active == Some(true)
            })
            .times(1)
            .returning(|_| Ok(vec![]));

        let registry = TestRegistryBuilder {
            borrowing_repository,
            ..TestRegistryBuilder::default()
        }
        .build();

        let params = BorrowingListQueryParams {
            user_id: Some(target.to_string()),
            is_active: Some("TRUE".into()),
        };
        show_borrowing_list(user, State(registry), Query(params))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn second_return_surfaces_already_returned() {
        let user = authorized_user(Role::User);
        let mut borrowing_repository = MockBorrowingRepository::new();
        borrowing_repository
            .expect_return_book()
            .times(1)
            .returning(|_| Err(AppError::AlreadyReturned));

        let registry = TestRegistryBuilder {
            borrowing_repository,
            ..TestRegistryBuilder::default()
        }
        .build();

        let err = return_borrowing(user, State(registry), Path(BorrowingId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyReturned));
    }

    #[tokio::test]
    async fn return_borrowing_passes_the_configured_fine_multiplier() {
        let user = authorized_user(Role::User);
        let actor = user.id();

        let mut borrowing_repository = MockBorrowingRepository::new();
        borrowing_repository
            .expect_return_book()
            .withf(move |event| {
                event.actor == actor
                    && event.role == Role::User
                    && event.fine_multiplier == dec!(1)
            })
            .times(1)
            .returning(move |event| {
                let mut b = borrowing_for(event.actor, date(2025, 7, 5));
                b.actual_return_date = Some(event.returned_on);
                Ok((b, None))
            });

        let registry = TestRegistryBuilder {
            borrowing_repository,
            ..TestRegistryBuilder::default()
        }
        .build();

        let Json(res) = return_borrowing(user, State(registry), Path(BorrowingId::new()))
            .await
            .unwrap();
        assert!(res.actual_return_date.is_some());
    }
}
