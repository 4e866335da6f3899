//! minisign 摘要簽名服務
//!
//! 本 crate 實現了一個 HTTP 簽名服務，負責:
//! 1. 接收客戶端提交的 BLAKE2b-512 摘要（十六進制）
//! 2. 使用長期 minisign 密鑰對摘要簽名（附帶 trusted comment）
//! 3. 發布對應的公鑰
//!
//! # 架構
//!
//! ```text
//! ┌──────────────┐
//! │    Router    │  ← axum 路由 + 訪問日誌
//! └──────┬───────┘
//!        │
//!   ┌────┴─────┬──────────┐
//!   ▼          ▼          ▼
//! Signer     Page      Config
//! (minisig-  (index)   Keystore
//!  signer)
//! ```
//!
//! # 示例用法
//!
//! ```no_run
//! use minisig_server::{config::load_config, keystore::load_signer, server};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config(None)?;
//!     let signer = Arc::new(load_signer(&config)?);
//!
//!     let state = server::AppState::new(&config.name, &config.base_url, signer);
//!     let app = server::create_router(state);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

// 公開模塊
pub mod config;
pub mod error;
pub mod keystore;
pub mod page;
pub mod server;
pub mod types;

// Re-export 常用類型
pub use error::{Result, ServerError};
pub use types::ServerConfig;
