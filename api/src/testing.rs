use std::sync::Arc;

use chrono::NaiveDate;
use kernel::{
    gateway::checkout::MockCheckoutGateway,
    model::{
        auth::AccessToken,
        book::BorrowedBook,
        borrowing::Borrowing,
        id::{BookId, BorrowingId, UserId},
        role::Role,
        user::{Borrower, User},
    },
    notifier::MockNotifier,
    repository::{
        auth::MockAuthRepository, book::MockBookRepository, borrowing::MockBorrowingRepository,
        health::MockHealthCheckRepository, payment::MockPaymentRepository,
        user::MockUserRepository,
    },
};
use registry::{AppRegistry, AppRegistryParts};
use rust_decimal_macros::dec;
use shared::config::{
    AppConfig, AuthConfig, CheckoutConfig, DatabaseConfig, FineConfig, NotifierConfig,
    RedisConfig, SchedulerConfig,
};

pub(crate) fn test_app_config() -> AppConfig {
    AppConfig {
        database: DatabaseConfig {
            host: "localhost".into(),
            port: 5432,
            username: "app".into(),
            password: "passwd".into(),
            database: "app".into(),
        },
        redis: RedisConfig {
            host: "localhost".into(),
            port: 6379,
        },
        auth: AuthConfig { ttl: 86400 },
        checkout: CheckoutConfig {
            secret_key: "sk_test_dummy".into(),
            api_base: "https://api.stripe.com".into(),
            currency: "usd".into(),
            success_url: "https://example.com/api/payment/success".into(),
            cancel_url: "https://example.com/api/payment/cancel".into(),
            timeout: 10,
        },
        notifier: NotifierConfig {
            bot_token: "dummy-token".into(),
            admin_chat_id: 1,
        },
        fine: FineConfig {
            multiplier: dec!(1),
        },
        scheduler: SchedulerConfig { scan_period: 86400 },
    }
}

// 各テストが必要なモックだけ差し替えて AppRegistry を組み立てるためのビルダー
#[derive(Default)]
pub(crate) struct TestRegistryBuilder {
    pub health_check_repository: MockHealthCheckRepository,
    pub book_repository: MockBookRepository,
    pub borrowing_repository: MockBorrowingRepository,
    pub payment_repository: MockPaymentRepository,
    pub user_repository: MockUserRepository,
    pub auth_repository: MockAuthRepository,
    pub checkout_gateway: MockCheckoutGateway,
    pub notifier: MockNotifier,
}

impl TestRegistryBuilder {
    pub fn build(self) -> AppRegistry {
        AppRegistry::from_parts(AppRegistryParts {
            app_config: test_app_config(),
            health_check_repository: Arc::new(self.health_check_repository),
            book_repository: Arc::new(self.book_repository),
            borrowing_repository: Arc::new(self.borrowing_repository),
            payment_repository: Arc::new(self.payment_repository),
            user_repository: Arc::new(self.user_repository),
            auth_repository: Arc::new(self.auth_repository),
            checkout_gateway: Arc::new(self.checkout_gateway),
            notifier: Arc::new(self.notifier),
        })
    }
}

pub(crate) fn authorized_user(role: Role) -> crate::extractor::AuthorizedUser {
    crate::extractor::AuthorizedUser {
        access_token: AccessToken("test-token".into()),
        user: User {
            id: UserId::new(),
            name: "user".into(),
            email: "user@example.com".into(),
            role,
        },
    }
}

pub(crate) fn active_borrowing(expected_return_date: NaiveDate) -> Borrowing {
    Borrowing {
        id: BorrowingId::new(),
        borrower: Borrower {
            id: UserId::new(),
            name: "user".into(),
            email: "user@example.com".into(),
        },
        book: BorrowedBook {
            id: BookId::new(),
            title: "Book".into(),
            author: "Author".into(),
            daily_fee: dec!(2.00),
        },
        borrow_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        expected_return_date,
        actual_return_date: None,
    }
}
