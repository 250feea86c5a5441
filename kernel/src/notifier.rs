use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::notification::NotificationEvent;

// 運用者チャンネルへの非同期通知。配送失敗が呼び出し元の処理を失敗させてはならない
#[mockall::automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: NotificationEvent) -> AppResult<()>;
}
