//! 配置管理模塊
//!
//! 負責加載和驗證簽名服務配置

use crate::error::{Result, ServerError};
use crate::types::ServerConfig;
use config::{Config, Environment, File};
use std::net::SocketAddr;
use std::path::Path;

/// 環境變量前綴，例如 `MINISIG_BASE_URL`、`MINISIG_SECRET_KEY_PASSWORD`
pub const ENV_PREFIX: &str = "MINISIG";

/// 從配置文件與環境變量加載配置
///
/// # 參數
/// - `config_path`: 配置文件路徑（支持 TOML、JSON、YAML）；`None` 時只讀取環境變量
///
/// # 返回
/// - `Ok(ServerConfig)`: 成功加載的配置（未指定的字段使用默認值）
/// - `Err(ServerError)`: 配置文件格式錯誤或字段值無效
///
/// # 示例
/// ```no_run
/// use minisig_server::config::load_config;
/// use std::path::Path;
///
/// let config = load_config(Some(Path::new("minisig.toml"))).expect("Failed to load config");
/// println!("Base URL: {}", config.base_url);
/// ```
pub fn load_config(config_path: Option<&Path>) -> Result<ServerConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path));
    }

    let config = builder
        .add_source(Environment::with_prefix(ENV_PREFIX))
        .build()
        .map_err(|e| ServerError::Config(format!("Failed to load config: {}", e)))?;

    config
        .try_deserialize()
        .map_err(|e| ServerError::Config(format!("Failed to parse config: {}", e)))
}

/// 驗證配置的有效性
///
/// 檢查:
/// - 服務名稱不為空
/// - URL 格式是否正確
/// - 監聽地址能否解析
pub fn validate_config(config: &ServerConfig) -> Result<()> {
    if config.name.trim().is_empty() {
        return Err(ServerError::Config("name must not be empty".to_string()));
    }

    if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
        return Err(ServerError::Config(format!(
            "Invalid base URL: {}",
            config.base_url
        )));
    }

    if config.base_url.contains(['\n', '\r']) {
        return Err(ServerError::Config(
            "base URL must be a single line".to_string(),
        ));
    }

    resolve_listen_addr(&config.listen)?;

    Ok(())
}

/// 解析監聽地址；`:port` 形式綁定到所有 IPv4 網卡
pub fn resolve_listen_addr(listen: &str) -> Result<SocketAddr> {
    let candidate = if listen.starts_with(':') {
        format!("0.0.0.0{}", listen)
    } else {
        listen.to_string()
    };

    candidate
        .parse()
        .map_err(|e| ServerError::Config(format!("Invalid listen address {}: {}", listen, e)))
}
