use std::sync::Arc;

use adapter::{
    database::ConnectionPool,
    gateway::stripe::StripeCheckoutGateway,
    notifier::telegram::TelegramNotifier,
    redis::RedisClient,
    repository::{
        auth::AuthRepositoryImpl, book::BookRepositoryImpl, borrowing::BorrowingRepositoryImpl,
        health::HealthCheckRepositoryImpl, payment::PaymentRepositoryImpl,
        user::UserRepositoryImpl,
    },
};
use kernel::{
    gateway::checkout::CheckoutGateway,
    notifier::Notifier,
    repository::{
        auth::AuthRepository, book::BookRepository, borrowing::BorrowingRepository,
        health::HealthCheckRepository, payment::PaymentRepository, user::UserRepository,
    },
};
use rust_decimal::Decimal;
use shared::{
    config::{AppConfig, CheckoutConfig, SchedulerConfig},
    error::AppResult,
};

// DI コンテナ。プロセス起動時に一度だけ構築し、各ハンドラに共有する
#[derive(Clone)]
pub struct AppRegistry {
    app_config: Arc<AppConfig>,
    health_check_repository: Arc<dyn HealthCheckRepository>,
    book_repository: Arc<dyn BookRepository>,
    borrowing_repository: Arc<dyn BorrowingRepository>,
    payment_repository: Arc<dyn PaymentRepository>,
    user_repository: Arc<dyn UserRepository>,
    auth_repository: Arc<dyn AuthRepository>,
    checkout_gateway: Arc<dyn CheckoutGateway>,
    notifier: Arc<dyn Notifier>,
}

impl AppRegistry {
    pub fn new(
        pool: ConnectionPool,
        kv: Arc<RedisClient>,
        app_config: AppConfig,
    ) -> AppResult<Self> {
        let checkout_gateway = Arc::new(StripeCheckoutGateway::new(&app_config.checkout)?);
        let notifier = Arc::new(TelegramNotifier::new(&app_config.notifier)?);
        Ok(Self {
            health_check_repository: Arc::new(HealthCheckRepositoryImpl::new(pool.clone())),
            book_repository: Arc::new(BookRepositoryImpl::new(pool.clone())),
            borrowing_repository: Arc::new(BorrowingRepositoryImpl::new(pool.clone())),
            payment_repository: Arc::new(PaymentRepositoryImpl::new(pool.clone())),
            user_repository: Arc::new(UserRepositoryImpl::new(pool.clone())),
            auth_repository: Arc::new(AuthRepositoryImpl::new(pool, kv, app_config.auth.ttl)),
            checkout_gateway,
            notifier,
            app_config: Arc::new(app_config),
        })
    }

    // 実装の差し替えが必要な場面（テストでのモック注入）に使うコンストラクタ
    pub fn from_parts(parts: AppRegistryParts) -> Self {
        let AppRegistryParts {
            app_config,
            health_check_repository,
            book_repository,
            borrowing_repository,
            payment_repository,
            user_repository,
            auth_repository,
            checkout_gateway,
            notifier,
        } = parts;
        Self {
            app_config: Arc::new(app_config),
            health_check_repository,
            book_repository,
            borrowing_repository,
            payment_repository,
            user_repository,
            auth_repository,
            checkout_gateway,
            notifier,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn book_repository(&self) -> Arc<dyn BookRepository> {
        self.book_repository.clone()
    }

    pub fn borrowing_repository(&self) -> Arc<dyn BorrowingRepository> {
        self.borrowing_repository.clone()
    }

    pub fn payment_repository(&self) -> Arc<dyn PaymentRepository> {
        self.payment_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn auth_repository(&self) -> Arc<dyn AuthRepository> {
        self.auth_repository.clone()
    }

    pub fn checkout_gateway(&self) -> Arc<dyn CheckoutGateway> {
        self.checkout_gateway.clone()
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    pub fn checkout_config(&self) -> &CheckoutConfig {
        &self.app_config.checkout
    }

    pub fn scheduler_config(&self) -> &SchedulerConfig {
        &self.app_config.scheduler
    }

    pub fn fine_multiplier(&self) -> Decimal {
        self.app_config.fine.multiplier
    }
}

pub struct AppRegistryParts {
    pub app_config: AppConfig,
    pub health_check_repository: Arc<dyn HealthCheckRepository>,
    pub book_repository: Arc<dyn BookRepository>,
    pub borrowing_repository: Arc<dyn BorrowingRepository>,
    pub payment_repository: Arc<dyn PaymentRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub auth_repository: Arc<dyn AuthRepository>,
    pub checkout_gateway: Arc<dyn CheckoutGateway>,
    pub notifier: Arc<dyn Notifier>,
}
