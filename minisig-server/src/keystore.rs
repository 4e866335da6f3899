//! minisign 密鑰加載模塊
//!
//! 啟動時加載一次公鑰與私鑰，之後在整個進程生命週期內只讀共享。
//! 任何加載失敗都會阻止服務啟動。
//!
//! 不支持密鑰生成、輪換或重新加載；請使用 `minisign -G` 生成密鑰。

use crate::error::{Result, ServerError};
use crate::types::ServerConfig;
use minisig_signer::{KeyPair, Signer};
use tracing::info;

/// 按配置加載密鑰並構造簽名器
///
/// # 錯誤
///
/// - 公鑰或私鑰文件不存在或格式錯誤
/// - 私鑰密碼錯誤（校驗和不匹配）
/// - 公鑰與私鑰不屬於同一密鑰對
pub fn load_signer(config: &ServerConfig) -> Result<Signer> {
    info!("🔐 Loading public key: {}", config.public_key_path.display());
    info!("🔐 Loading secret key: {}", config.secret_key_path.display());

    let keys = KeyPair::from_files(
        &config.public_key_path,
        &config.secret_key_path,
        &config.secret_key_password,
    )
    .map_err(|e| {
        ServerError::Keystore(format!(
            "Failed to load keypair (public key {}, secret key {}): {}",
            config.public_key_path.display(),
            config.secret_key_path.display(),
            e
        ))
    })?;

    info!("   - Key ID: {}", keys.public_key().key_id());
    info!("   - Public key: {}", keys.public_key());

    Ok(Signer::new(config.base_url.clone(), keys)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_public_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            public_key_path: dir.path().join("minisign.pub"),
            secret_key_path: dir.path().join("minisign.key"),
            ..ServerConfig::default()
        };

        match load_signer(&config) {
            Err(ServerError::Keystore(msg)) => {
                assert!(msg.contains("minisign.pub"));
                assert!(msg.contains("IO error"));
            }
            other => panic!("Expected Keystore error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_malformed_secret_key() {
        let dir = tempfile::tempdir().unwrap();
        let public_path = dir.path().join("minisign.pub");
        let secret_path = dir.path().join("minisign.key");
        std::fs::write(
            &public_path,
            "untrusted comment: minisign public key E7620F1842B4E81F\nRWQf6LRCGA9i53mlYecO4IzT51TGPpvWucNSCh1CBM0QTaLn73Y7GFO3\n",
        )
        .unwrap();
        std::fs::write(&secret_path, "untrusted comment: broken\nAAAA\n").unwrap();

        let config = ServerConfig {
            public_key_path: public_path,
            secret_key_path: secret_path,
            ..ServerConfig::default()
        };

        match load_signer(&config) {
            Err(ServerError::Keystore(msg)) => {
                assert!(msg.contains("Invalid secret key length"))
            }
            other => panic!("Expected Keystore error, got {:?}", other.map(|_| ())),
        }
    }
}
