pub mod handlers;
pub mod upload;

use crate::config::toml_config::AppConfig;
use crate::core::extractor::PdfTextExtractor;
use crate::domain::model::TreasuryAccount;
use crate::domain::ports::{DocumentRenderer, TextExtractor};
use crate::render::DocxRenderer;
use crate::utils::error::{ErrorCategory, OficioError, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use self::upload::UploadStore;

#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn TextExtractor>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub uploads: UploadStore,
    pub treasury: Arc<TreasuryAccount>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            extractor: Arc::new(PdfTextExtractor::new()),
            renderer: Arc::new(DocxRenderer::new(&config.render)),
            uploads: UploadStore::new(&config.server.upload_dir)?,
            treasury: Arc::new(config.treasury.clone()),
        })
    }
}

impl IntoResponse for OficioError {
    fn into_response(self) -> Response {
        let status = match self.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::Extraction => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(
                "❌ {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
        } else {
            tracing::warn!("⚠️ {}", self);
        }

        (status, Json(json!({ "erro": self.user_friendly_message() }))).into_response()
    }
}

pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/upload", post(handlers::upload_pdf))
        .route("/gerar-oficio", post(handlers::generate_oficio))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let app = create_router(state, config.max_upload_bytes());

    let addr = config.bind_address();
    tracing::info!("🚀 Starting server on {}", addr);
    tracing::info!("📁 Uploads stored under {}", config.server.upload_dir);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
