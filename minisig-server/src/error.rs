//! 簽名服務統一錯誤類型定義
//!
//! 本模塊定義了服務運行過程中可能遇到的所有錯誤類型，
//! 並負責把它們映射為 HTTP 響應。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use minisig_signer::SignerError;
use thiserror::Error;
use tracing::{debug, error};

/// 簽名服務錯誤類型
#[derive(Error, Debug)]
pub enum ServerError {
    /// 配置錯誤
    ///
    /// 當配置文件格式錯誤或參數值無效時返回此錯誤
    #[error("Configuration error: {0}")]
    Config(String),

    /// 密鑰庫錯誤
    ///
    /// 當無法加載公鑰或私鑰時返回此錯誤（啟動失敗）
    #[error("Keystore error: {0}")]
    Keystore(String),

    /// 簽名庫錯誤
    ///
    /// 摘要驗證錯誤會返回給調用方，其餘只記錄在服務端日誌
    #[error(transparent)]
    Signer(#[from] SignerError),

    /// I/O 錯誤
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 通用錯誤
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 類型別名
pub type Result<T> = std::result::Result<T, ServerError>;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::Signer(ref err) if err.is_caller_error() => {
                debug!("Rejected request: {}", err);
                (StatusCode::BAD_REQUEST, err.to_string()).into_response()
            }
            other => {
                // 不向調用方洩露任何失敗細節
                error!("Request failed: {}", other);
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (status, status.canonical_reason().unwrap_or_default()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_bad_request() {
        let err = ServerError::from(SignerError::Validation("digest is empty".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_is_opaque() {
        let err = ServerError::from(SignerError::Internal("secret detail".to_string()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
