use anyhow::{Context, Result};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub checkout: CheckoutConfig,
    pub notifier: NotifierConfig,
    pub fine: FineConfig,
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    pub fn new() -> Result<AppConfig> {
        let database = DatabaseConfig {
            host: env_var("DATABASE_HOST")?,
            port: env_var("DATABASE_PORT")?.parse()?,
            username: env_var("DATABASE_USERNAME")?,
            password: env_var("DATABASE_PASSWORD")?,
            database: env_var("DATABASE_NAME")?,
        };
        let redis = RedisConfig {
            host: env_var("REDIS_HOST")?,
            port: env_var("REDIS_PORT")?.parse()?,
        };
        let auth = AuthConfig {
            ttl: env_var_or("AUTH_TOKEN_TTL", "86400")?.parse()?,
        };
        let checkout = CheckoutConfig {
            secret_key: env_var("CHECKOUT_SECRET_KEY")?,
            api_base: env_var_or("CHECKOUT_API_BASE", "https://api.stripe.com")?,
            currency: env_var_or("CHECKOUT_CURRENCY", "usd")?,
            success_url: env_var("CHECKOUT_SUCCESS_URL")?,
            cancel_url: env_var("CHECKOUT_CANCEL_URL")?,
            timeout: env_var_or("CHECKOUT_TIMEOUT_SECONDS", "10")?.parse()?,
        };
        let notifier = NotifierConfig {
            bot_token: env_var("TELEGRAM_BOT_TOKEN")?,
            admin_chat_id: env_var("TELEGRAM_ADMIN_CHAT_ID")?.parse()?,
        };
        let fine = FineConfig {
            multiplier: env_var_or("FINE_MULTIPLIER", "1")?.parse()?,
        };
        let scheduler = SchedulerConfig {
            scan_period: env_var_or("OVERDUE_SCAN_PERIOD_SECONDS", "86400")?.parse()?,
        };
        Ok(AppConfig {
            database,
            redis,
            auth,
            checkout,
            notifier,
            fine,
            scheduler,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("環境変数 {key} が設定されていません"))
}

fn env_var_or(key: &str, default: &str) -> Result<String> {
    Ok(std::env::var(key).unwrap_or_else(|_| default.to_string()))
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    // アクセストークンの有効期間（秒）
    pub ttl: u64,
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub secret_key: String,
    pub api_base: String,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    // 決済プロバイダ API 呼び出しのタイムアウト（秒）
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub bot_token: String,
    pub admin_chat_id: i64,
}

#[derive(Debug, Clone)]
pub struct FineConfig {
    pub multiplier: Decimal,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    // 延滞スキャンの実行間隔（秒）
    pub scan_period: u64,
}
