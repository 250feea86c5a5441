use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("貸出可能な在庫がありません")]
    OutOfStock,
    #[error("この貸出はすでに返却済みです")]
    AlreadyReturned,
    #[error("返却予定日には貸出日以降の日付を指定してください")]
    InvalidDateRange,
    #[error("決済が完了していません")]
    PaymentNotCompleted,
    #[error("返金対象のチャージが存在しません")]
    NoChargeToRefund,
    #[error("決済プロバイダとの通信に失敗しました: {0}")]
    GatewayError(String),
    #[error("通知を送信できませんでした: {0}")]
    NotificationError(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    // sqlx::Errorを引数にするヴァリアントが複数あるので、[from]は使えず、[source]で代用している
    #[error("トランザクションを実行できませんでした。")]
    TransactionError(#[source] sqlx::Error),
    #[error("データベース処理実行中にエラーが発生しました。")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("No rows affected: {0}")]
    NoRowAffectedError(String),
    #[error("{0}")]
    KeyValueStoreError(#[from] redis::RedisError),
    #[error("{0}")]
    BcryptError(#[from] bcrypt::BcryptError),
    #[error("{0}")]
    ConvertToUuidError(#[from] uuid::Error),
    #[error("ログインに失敗しました")]
    UnauthenticatedError,
    #[error("認可情報が間違っています")]
    UnauthorizedError,
    #[error("許可されていない操作です")]
    ForbiddenOperation,
    #[error("{0}")]
    ConversionEntityError(String),
}

impl AppError {
    // クライアントが分岐に使う機械可読な理由コード
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::UnprocessableEntity(_) => "unprocessable_entity",
            AppError::EntityNotFound(_) => "not_found",
            AppError::OutOfStock => "out_of_stock",
            AppError::AlreadyReturned => "already_returned",
            AppError::InvalidDateRange => "invalid_date_range",
            AppError::PaymentNotCompleted => "not_completed",
            AppError::NoChargeToRefund => "no_charge",
            AppError::GatewayError(_) => "gateway_error",
            AppError::NotificationError(_) => "notification_error",
            AppError::ValidationError(_) => "validation_error",
            AppError::ConvertToUuidError(_) => "invalid_id",
            AppError::UnauthenticatedError => "unauthenticated",
            AppError::UnauthorizedError => "unauthorized",
            AppError::ForbiddenOperation => "forbidden",
            _ => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::OutOfStock
            | AppError::AlreadyReturned
            | AppError::InvalidDateRange
            | AppError::PaymentNotCompleted
            | AppError::NoChargeToRefund
            | AppError::GatewayError(_)
            | AppError::ValidationError(_)
            | AppError::ConvertToUuidError(_) => StatusCode::BAD_REQUEST,
            AppError::UnauthenticatedError | AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::UnauthorizedError => StatusCode::UNAUTHORIZED,
            e @ (AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowAffectedError(_)
            | AppError::KeyValueStoreError(_)
            | AppError::BcryptError(_)
            | AppError::NotificationError(_)
            | AppError::ConversionEntityError(_)) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Unexpected error happened"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(json!({
            "error": self.reason(),
            "detail": self.to_string(),
        }));
        (status_code, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
