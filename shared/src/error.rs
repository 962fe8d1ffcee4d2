use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("Booking cannot be created due to lack of availability.")]
    CapacityExceeded,
    #[error("Booking does not belong to the user.")]
    ForbiddenOperation,
    #[error("Authentication is required.")]
    UnauthenticatedError,
    #[error("Login failed.")]
    UnauthorizedError,
    #[error("トランザクションを実行できませんでした。")]
    TransactionError(#[source] sqlx::Error),
    #[error("データベース処理実行中にエラーが発生しました。")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("No rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("パスワードの処理に失敗しました。")]
    PasswordHashError(#[from] bcrypt::BcryptError),
    #[error("KVS の操作中にエラーが発生しました。")]
    KeyValueStoreError(#[from] redis::RedisError),
    #[error("{0}")]
    ConversionEntityError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = match self {
            AppError::UnprocessableEntity(_) | AppError::ValidationError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::CapacityExceeded => StatusCode::BAD_REQUEST,
            AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::UnauthenticatedError | AppError::UnauthorizedError => {
                StatusCode::UNAUTHORIZED
            }
            e @ (AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::PasswordHashError(_)
            | AppError::KeyValueStoreError(_)
            | AppError::ConversionEntityError(_)) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Unexpected error happened"
                );
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "status": false,
                        "message": "Unexpected error happened",
                    })),
                )
                    .into_response();
            }
        };

        // バリデーションエラーはフィールド単位のメッセージをそのまま返す
        if let AppError::ValidationError(report) = &self {
            return (status_code, Json(json!(validation_messages(report)))).into_response();
        }

        (
            status_code,
            Json(json!({
                "status": false,
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}

/// garde のレポートをフィールド名ごとのメッセージ一覧に変換する
pub fn validation_messages(report: &garde::Report) -> BTreeMap<String, Vec<String>> {
    let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (path, error) in report.iter() {
        errors
            .entry(path.to_string())
            .or_default()
            .push(error.to_string());
    }
    errors
}

pub type AppResult<T> = Result<T, AppError>;
