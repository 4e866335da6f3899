//! HTTP 路由與處理器
//!
//! | Method | Path            | 說明                          |
//! |--------|-----------------|-------------------------------|
//! | GET    | `/`             | 使用說明首頁                  |
//! | POST   | `/sign`         | 表單字段 `digest`，返回簽名   |
//! | GET    | `/minisign.pub` | 公鑰                          |

use crate::error::Result;
use crate::page::render_index;
use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Router,
};
use chrono::Utc;
use minisig_signer::{decode_hex_digest, DigestSigner};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// 所有處理器共享的只讀狀態
#[derive(Clone)]
pub struct AppState {
    pub name: Arc<str>,
    pub base_url: Arc<str>,
    pub signer: Arc<dyn DigestSigner>,
}

impl AppState {
    pub fn new(name: &str, base_url: &str, signer: Arc<dyn DigestSigner>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            signer,
        }
    }
}

/// 創建路由（含訪問日誌層）
///
/// 訪問日誌在 INFO 級別輸出，每個請求一行（方法、路徑、狀態碼、耗時）。
pub fn create_router(state: AppState) -> Router {
    let access_log = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/", get(index))
        .route("/sign", post(sign))
        .route("/minisign.pub", get(public_key))
        .layer(access_log)
        .with_state(state)
}

/// GET /
async fn index(State(state): State<AppState>) -> impl IntoResponse {
    Html(render_index(&state.name, &state.base_url))
}

#[derive(Debug, Default, Deserialize)]
pub struct SignForm {
    #[serde(default)]
    pub digest: String,
}

/// POST /sign
///
/// 缺少表單與空的 `digest` 一樣返回 400 "digest is empty"。
async fn sign(
    State(state): State<AppState>,
    form: Option<Form<SignForm>>,
) -> Result<impl IntoResponse> {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let now = Utc::now();

    let digest = decode_hex_digest(form.digest.trim().as_bytes())?;
    let mut signature = state.signer.sign(&digest, now)?;
    signature.push(b'\n');

    info!("Signed digest {} at {}", digest.to_hex(), now.timestamp());

    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], signature))
}

/// GET /minisign.pub
async fn public_key(State(state): State<AppState>) -> impl IntoResponse {
    let body = format!("{}\n", state.signer.public_key_document());

    ([(header::CONTENT_TYPE, TEXT_PLAIN)], body)
}
