//! 共享數據類型定義
//!
//! 本模塊定義簽名服務各個子系統共享的數據結構

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 簽名服務配置
///
/// 來源優先級：命令行參數 > `MINISIG_*` 環境變量 > 配置文件 > 默認值
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// 服務名稱（顯示在首頁）
    pub name: String,

    /// 服務基礎 URL，同時作為簽名者身份（trusted comment 的 `by` 字段）
    pub base_url: String,

    /// 監聽地址；`:8080` 表示監聽所有網卡
    pub listen: String,

    /// minisign 公鑰文件
    pub public_key_path: PathBuf,

    /// minisign 私鑰文件
    pub secret_key_path: PathBuf,

    /// 私鑰密碼（默認為空字符串）
    #[serde(skip_serializing)]
    pub secret_key_password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "minisig.me".to_string(),
            base_url: "https://minisig.me".to_string(),
            listen: ":8080".to_string(),
            public_key_path: PathBuf::from("minisign.pub"),
            secret_key_path: default_secret_key_path(),
            secret_key_password: String::new(),
        }
    }
}

/// `$HOME/.minisign/minisign.key`，與 minisign 默認位置一致
pub fn default_secret_key_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".minisign")
        .join("minisign.key")
}
