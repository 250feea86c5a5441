use std::sync::Arc;

use kernel::{model::notification::NotificationEvent, notifier::Notifier};

// 通知はリクエスト処理をブロックしない。配送失敗はログに残すのみで呼び出し元へは返さない
pub(crate) fn dispatch_notification(notifier: Arc<dyn Notifier>, event: NotificationEvent) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(event).await {
            tracing::warn!(
                error.cause_chain = ?e,
                error.message = %e,
                "通知の送信に失敗しました"
            );
        }
    });
}
