use axum::{
    extract::{Query, State},
    Json,
};
use kernel::{
    gateway::checkout::{CreateSession, SessionPaymentStatus},
    model::{
        notification::NotificationEvent,
        payment::{
            checkout_amount_minor_units, event::CreatePayment, from_minor_units, PaymentKind,
            PaymentListQuery,
        },
        role::Role,
    },
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::payment::{
        CancelRequest, CheckoutRequest, CheckoutSessionResponse, MessageResponse, PaymentResponse,
        SuccessQuery,
    },
    notification::dispatch_notification,
};

pub async fn create_checkout_session(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<Json<CheckoutSessionResponse>> {
    // 貸出は依頼者自身のものに限る
    let borrowing = registry
        .borrowing_repository()
        .find_owned(req.borrowing_id, user.id())
        .await?
        .ok_or_else(|| AppError::EntityNotFound("Borrowing not found.".into()))?;

    let days = (borrowing.expected_return_date - borrowing.borrow_date).num_days();
    let amount_minor_units = checkout_amount_minor_units(days, borrowing.book.daily_fee)?;

    let checkout = registry.checkout_config();
    // セッション作成はローカルトランザクションの外で行い、
    // ネットワーク I/O の間に決済行のロックを持たない
    let session = registry
        .checkout_gateway()
        .create_session(CreateSession::new(
            amount_minor_units,
            checkout.currency.clone(),
            borrowing.book.title.clone(),
            format!(
                "{}?session_id={{CHECKOUT_SESSION_ID}}",
                checkout.success_url
            ),
            checkout.cancel_url.clone(),
            user.user.email.clone(),
        ))
        .await?;

    let payment = registry
        .payment_repository()
        .create(CreatePayment::new(
            borrowing.id,
            PaymentKind::Payment,
            session.id,
            session.url.clone(),
            from_minor_units(amount_minor_units),
        ))
        .await?;

    Ok(Json(CheckoutSessionResponse {
        checkout_url: session.url,
        payment_id: payment.id,
    }))
}

// 決済プロバイダからのリダイレクトで呼ばれるため認証は要求しない
pub async fn checkout_success(
    State(registry): State<AppRegistry>,
    Query(query): Query<SuccessQuery>,
) -> AppResult<Json<MessageResponse>> {
    let session = registry
        .checkout_gateway()
        .retrieve_session(&query.session_id)
        .await?;
    if session.payment_status != SessionPaymentStatus::Paid {
        return Err(AppError::PaymentNotCompleted);
    }

    let paid = registry
        .payment_repository()
        .mark_paid_by_session(&query.session_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("Payment record not found.".into()))?;

    // Paid への遷移が確定したときのみ通知する
    dispatch_notification(
        registry.notifier(),
        NotificationEvent::PaymentSucceeded {
            borrower_email: paid.borrower_email,
            book_title: paid.book_title,
            amount: paid.payment.money_to_pay,
        },
    );

    Ok(Json(MessageResponse {
        detail: "Payment successful.".into(),
    }))
}

pub async fn checkout_cancel(
    State(registry): State<AppRegistry>,
    Json(req): Json<CancelRequest>,
) -> AppResult<Json<MessageResponse>> {
    let payment = registry
        .payment_repository()
        .find_by_id(req.payment_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("Payment not found.".into()))?;

    // セッションの失効はベストエフォート。失敗しても処理を続行する
    if let Err(e) = registry
        .checkout_gateway()
        .expire_session(&payment.session_id)
        .await
    {
        tracing::warn!(
            payment_id = %payment.id,
            error.message = %e,
            "チェックアウトセッションの失効に失敗しました"
        );
    }

    let session = registry
        .checkout_gateway()
        .retrieve_session(&payment.session_id)
        .await?;

    // 決済インテントがまだ無ければ返金は不要でキャンセルのみ
    let Some(intent_id) = session.payment_intent_id else {
        registry
            .payment_repository()
            .mark_cancelled(payment.id)
            .await?;
        return Ok(Json(MessageResponse {
            detail: "Checkout session cancelled.".into(),
        }));
    };

    let intent = registry
        .checkout_gateway()
        .retrieve_payment_intent(&intent_id)
        .await?;
    let Some(charge_id) = intent.charge_ids.first() else {
        // 返金できるチャージが無い場合は決済の状態に触れない
        return Err(AppError::NoChargeToRefund);
    };

    registry.checkout_gateway().create_refund(charge_id).await?;
    registry
        .payment_repository()
        .mark_cancelled(payment.id)
        .await?;

    Ok(Json(MessageResponse {
        detail: "Payment refunded and cancelled.".into(),
    }))
}

pub async fn show_payment_list(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Vec<PaymentResponse>>> {
    let role = if user.is_staff() { Role::Staff } else { Role::User };
    let query = PaymentListQuery::new(user.id(), role);
    let payments = registry.payment_repository().find_all(query).await?;
    Ok(Json(
        payments.into_iter().map(PaymentResponse::from).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use kernel::{
        gateway::checkout::{
            CheckoutSession, MockCheckoutGateway, PaymentIntent, SessionState,
        },
        model::{
            id::{BorrowingId, PaymentId},
            payment::{PaidPayment, Payment, PaymentStatus as KernelPaymentStatus},
        },
        notifier::MockNotifier,
        repository::{borrowing::MockBorrowingRepository, payment::MockPaymentRepository},
    };
    use rust_decimal_macros::dec;

    use super::*;
    use crate::testing::{authorized_user, TestRegistryBuilder};

    fn pending_payment(session_id: &str) -> Payment {
        Payment {
            id: PaymentId::new(),
            borrowing_id: BorrowingId::new(),
            kind: PaymentKind::Payment,
            status: KernelPaymentStatus::Pending,
            session_id: session_id.into(),
            session_url: "https://checkout.example.com/pay".into(),
            money_to_pay: dec!(8.00),
        }
    }

    #[tokio::test]
    async fn create_checkout_session_charges_whole_cents_rounded_down() {
        let user = authorized_user(Role::User);
        let owner = user.id();

        // 2025-07-01 から 2025-07-05 の 4 日間、日額 2.00 → 800 セント
        let mut borrowing_repository = MockBorrowingRepository::new();
        borrowing_repository
            .expect_find_owned()
            .withf(move |_, o| *o == owner)
            .times(1)
            .returning(move |id, o| {
                let mut b = crate::testing::active_borrowing(
                    NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
                );
                b.id = id;
                b.borrower.id = o;
                Ok(Some(b))
            });

        let mut checkout_gateway = MockCheckoutGateway::new();
        checkout_gateway
            .expect_create_session()
            .withf(|event| {
                event.amount_minor_units == 800
                    && event.currency == "usd"
                    && event.product_name == "Book"
                    && event.success_url.ends_with("?session_id={CHECKOUT_SESSION_ID}")
            })
            .times(1)
            .returning(|_| {
                Ok(CheckoutSession {
                    id: "cs_1".into(),
                    url: "https://checkout.example.com/pay".into(),
                })
            });

        let mut payment_repository = MockPaymentRepository::new();
        payment_repository
            .expect_create()
            .withf(|event| {
                event.session_id == "cs_1"
                    && event.kind == PaymentKind::Payment
                    && event.money_to_pay == dec!(8.00)
            })
            .times(1)
            .returning(|event| {
                Ok(Payment {
                    id: PaymentId::new(),
                    borrowing_id: event.borrowing_id,
                    kind: event.kind,
                    status: KernelPaymentStatus::Pending,
                    session_id: event.session_id,
                    session_url: event.session_url,
                    money_to_pay: event.money_to_pay,
                })
            });

        let registry = TestRegistryBuilder {
            borrowing_repository,
            checkout_gateway,
            payment_repository,
            ..TestRegistryBuilder::default()
        }
        .build();

        let req = CheckoutRequest {
            borrowing_id: BorrowingId::new(),
        };
        let Json(res) = create_checkout_session(user, State(registry), Json(req))
            .await
            .unwrap();
        assert_eq!(res.checkout_url, "https://checkout.example.com/pay");
    }

    #[tokio::test]
    async fn create_checkout_session_misses_borrowings_of_other_users() {
        let user = authorized_user(Role::User);

        let mut borrowing_repository = MockBorrowingRepository::new();
        borrowing_repository
            .expect_find_owned()
            .returning(|_, _| Ok(None));

        // ゲートウェイと決済リポジトリには期待を設定しない。呼ばれたら失敗する
        let registry = TestRegistryBuilder {
            borrowing_repository,
            ..TestRegistryBuilder::default()
        }
        .build();

        let req = CheckoutRequest {
            borrowing_id: BorrowingId::new(),
        };
        let err = create_checkout_session(user, State(registry), Json(req))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
    }

    #[tokio::test]
    async fn checkout_success_marks_the_payment_paid_and_notifies() {
        let mut checkout_gateway = MockCheckoutGateway::new();
        checkout_gateway
            .expect_retrieve_session()
            .withf(|id| id == "cs_1")
            .returning(|_| {
                Ok(SessionState {
                    payment_status: SessionPaymentStatus::Paid,
                    payment_intent_id: Some("pi_1".into()),
                })
            });

        let mut payment_repository = MockPaymentRepository::new();
        payment_repository
            .expect_mark_paid_by_session()
            .withf(|id| id == "cs_1")
            .times(1)
            .returning(|session_id| {
                let mut payment = pending_payment(session_id);
                payment.status = KernelPaymentStatus::Paid;
                Ok(Some(PaidPayment {
                    payment,
                    borrower_email: "user@example.com".into(),
                    book_title: "Book".into(),
                }))
            });

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().returning(|_| Ok(()));

        let registry = TestRegistryBuilder {
            checkout_gateway,
            payment_repository,
            notifier,
            ..TestRegistryBuilder::default()
        }
        .build();

        let query = SuccessQuery {
            session_id: "cs_1".into(),
        };
        let Json(res) = checkout_success(State(registry), Query(query)).await.unwrap();
        assert_eq!(res.detail, "Payment successful.");
    }

    #[tokio::test]
    async fn checkout_success_on_unpaid_session_leaves_the_payment_untouched() {
        let mut checkout_gateway = MockCheckoutGateway::new();
        checkout_gateway.expect_retrieve_session().returning(|_| {
            Ok(SessionState {
                payment_status: SessionPaymentStatus::Unpaid,
                payment_intent_id: None,
            })
        });

        // mark_paid_by_session に期待を設定しない。呼ばれたらテストは失敗する
        let registry = TestRegistryBuilder {
            checkout_gateway,
            ..TestRegistryBuilder::default()
        }
        .build();

        let query = SuccessQuery {
            session_id: "cs_1".into(),
        };
        let err = checkout_success(State(registry), Query(query))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PaymentNotCompleted));
    }

    #[tokio::test]
    async fn checkout_success_without_a_matching_record_is_not_found() {
        let mut checkout_gateway = MockCheckoutGateway::new();
        checkout_gateway.expect_retrieve_session().returning(|_| {
            Ok(SessionState {
                payment_status: SessionPaymentStatus::Paid,
                payment_intent_id: None,
            })
        });

        let mut payment_repository = MockPaymentRepository::new();
        payment_repository
            .expect_mark_paid_by_session()
            .returning(|_| Ok(None));

        let registry = TestRegistryBuilder {
            checkout_gateway,
            payment_repository,
            ..TestRegistryBuilder::default()
        }
        .build();

        let query = SuccessQuery {
            session_id: "unknown".into(),
        };
        let err = checkout_success(State(registry), Query(query))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
    }

    #[tokio::test]
    async fn cancel_without_an_intent_just_cancels_the_session() {
        let payment = pending_payment("cs_1");
        let payment_id = payment.id;

        let mut payment_repository = MockPaymentRepository::new();
        {
            let payment = payment.clone();
            payment_repository
                .expect_find_by_id()
                .returning(move |_| Ok(Some(payment.clone())));
        }
        payment_repository
            .expect_mark_cancelled()
            .withf(move |id| *id == payment_id)
            .times(1)
            .returning(|id| {
                let mut payment = pending_payment("cs_1");
                payment.id = id;
                payment.status = KernelPaymentStatus::Cancelled;
                Ok(payment)
            });

        let mut checkout_gateway = MockCheckoutGateway::new();
        checkout_gateway
            .expect_expire_session()
            .times(1)
            .returning(|_| Ok(()));
        checkout_gateway.expect_retrieve_session().returning(|_| {
            Ok(SessionState {
                payment_status: SessionPaymentStatus::Unpaid,
                payment_intent_id: None,
            })
        });

        let registry = TestRegistryBuilder {
            payment_repository,
            checkout_gateway,
            ..TestRegistryBuilder::default()
        }
        .build();

        let req = CancelRequest { payment_id };
        let Json(res) = checkout_cancel(State(registry), Json(req)).await.unwrap();
        assert_eq!(res.detail, "Checkout session cancelled.");
    }

    #[tokio::test]
    async fn cancel_with_one_charge_refunds_exactly_once() {
        let payment = pending_payment("cs_1");
        let payment_id = payment.id;

        let mut payment_repository = MockPaymentRepository::new();
        {
            let payment = payment.clone();
            payment_repository
                .expect_find_by_id()
                .returning(move |_| Ok(Some(payment.clone())));
        }
        payment_repository
            .expect_mark_cancelled()
            .times(1)
            .returning(|id| {
                let mut payment = pending_payment("cs_1");
                payment.id = id;
                payment.status = KernelPaymentStatus::Cancelled;
                Ok(payment)
            });

        let mut checkout_gateway = MockCheckoutGateway::new();
        // 失効の失敗は致命的ではない
        checkout_gateway
            .expect_expire_session()
            .returning(|_| Err(AppError::GatewayError("expire failed".into())));
        checkout_gateway.expect_retrieve_session().returning(|_| {
            Ok(SessionState {
                payment_status: SessionPaymentStatus::Paid,
                payment_intent_id: Some("pi_1".into()),
            })
        });
        checkout_gateway
            .expect_retrieve_payment_intent()
            .withf(|id| id == "pi_1")
            .returning(|_| {
                Ok(PaymentIntent {
                    charge_ids: vec!["ch_1".into()],
                })
            });
        checkout_gateway
            .expect_create_refund()
            .withf(|id| id == "ch_1")
            .times(1)
            .returning(|_| Ok(()));

        let registry = TestRegistryBuilder {
            payment_repository,
            checkout_gateway,
            ..TestRegistryBuilder::default()
        }
        .build();

        let req = CancelRequest { payment_id };
        let Json(res) = checkout_cancel(State(registry), Json(req)).await.unwrap();
        assert_eq!(res.detail, "Payment refunded and cancelled.");
    }

    #[tokio::test]
    async fn cancel_with_no_charges_fails_and_leaves_the_payment_pending() {
        let payment = pending_payment("cs_1");
        let payment_id = payment.id;

        let mut payment_repository = MockPaymentRepository::new();
        payment_repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(payment.clone())));
        // mark_cancelled に期待を設定しない。呼ばれたらテストは失敗する

        let mut checkout_gateway = MockCheckoutGateway::new();
        checkout_gateway
            .expect_expire_session()
            .returning(|_| Ok(()));
        checkout_gateway.expect_retrieve_session().returning(|_| {
            Ok(SessionState {
                payment_status: SessionPaymentStatus::Unpaid,
                payment_intent_id: Some("pi_1".into()),
            })
        });
        checkout_gateway
            .expect_retrieve_payment_intent()
            .returning(|_| Ok(PaymentIntent { charge_ids: vec![] }));

        let registry = TestRegistryBuilder {
            payment_repository,
            checkout_gateway,
            ..TestRegistryBuilder::default()
        }
        .build();

        let req = CancelRequest { payment_id };
        let err = checkout_cancel(State(registry), Json(req)).await.unwrap_err();
        assert!(matches!(err, AppError::NoChargeToRefund));
    }

    #[tokio::test]
    async fn non_staff_payment_list_is_scoped_to_the_actor() {
        let user = authorized_user(Role::User);
        let actor = user.id();

        let mut payment_repository = MockPaymentRepository::new();
        payment_repository
            .expect_find_all()
            .withf(move |query| query.effective_owner() == Some(actor))
            .times(1)
            .returning(|_| Ok(vec![]));

        let registry = TestRegistryBuilder {
            payment_repository,
            ..TestRegistryBuilder::default()
        }
        .build();

        let Json(res) = show_payment_list(user, State(registry)).await.unwrap();
        assert!(res.is_empty());
    }
}
