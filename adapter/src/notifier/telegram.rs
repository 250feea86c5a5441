use std::time::Duration;

use async_trait::async_trait;
use kernel::{model::notification::NotificationEvent, notifier::Notifier};
use serde_json::json;
use shared::{
    config::NotifierConfig,
    error::{AppError, AppResult},
};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

// 運用者向けの Telegram チャンネルにライフサイクルイベントを流す
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
    admin_chat_id: i64,
}

impl TelegramNotifier {
    pub fn new(config: &NotifierConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| AppError::NotificationError(e.to_string()))?;
        Ok(Self {
            client,
            bot_token: config.bot_token.clone(),
            admin_chat_id: config.admin_chat_id,
        })
    }

    fn format_message(event: &NotificationEvent) -> String {
        match event {
            NotificationEvent::NewBorrowing {
                borrower_email,
                book_title,
                expected_return_date,
            } => format!(
                "New borrowing created:\nUser: {borrower_email}\nBook: {book_title}\nDue: {expected_return_date}"
            ),
            NotificationEvent::PaymentSucceeded {
                borrower_email,
                book_title,
                amount,
            } => format!(
                "Payment successful:\nUser: {borrower_email}\nBook: {book_title}\nAmount: ${amount}"
            ),
            NotificationEvent::Overdue {
                borrower_email,
                book_title,
                expected_return_date,
            } => format!(
                "Overdue borrowing detected:\nUser: {borrower_email}\nBook: {book_title}\nDue since: {expected_return_date}"
            ),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, event: NotificationEvent) -> AppResult<()> {
        let url = format!("{TELEGRAM_API_BASE}/bot{}/sendMessage", self.bot_token);
        let body = json!({
            "chat_id": self.admin_chat_id,
            "text": Self::format_message(&event),
        });
        let res = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::NotificationError(e.to_string()))?;
        if !res.status().is_success() {
            return Err(AppError::NotificationError(format!(
                "notification channel returned {}",
                res.status()
            )));
        }
        Ok(())
    }
}
