use crate::core::ledger::assemble;
use crate::domain::model::{OficioRequest, UploadResponse};
use crate::render::download_name;
use crate::server::AppState;
use crate::utils::error::{OficioError, Result};
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /upload：multipart 欄位 `file`
pub async fn upload_pdf(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Multipart rejected: {}", e);
        OficioError::validation("Arquivo inválido.")
    })?;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OficioError::validation(format!("Requisição multipart inválida: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| OficioError::validation(format!("Falha ao ler o arquivo: {}", e)))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = match upload {
        Some((name, bytes)) if !name.trim().is_empty() => (name, bytes),
        _ => return Err(OficioError::validation("Arquivo inválido.")),
    };

    tracing::info!("📥 Received upload '{}' ({} bytes)", file_name, bytes.len());
    let stored = state.uploads.persist(&file_name, &bytes)?;

    let extractor = state.extractor.clone();
    let treasury = state.treasury.clone();
    let ledger = tokio::task::spawn_blocking(move || {
        // `stored` 在此作用域結束時刪除
        let raw_text = extractor.extract_path(stored.path())?;
        Ok::<_, OficioError>(assemble(raw_text, &treasury))
    })
    .await
    .map_err(|e| OficioError::IoError(std::io::Error::other(e)))??;

    tracing::info!(
        "✅ '{}': {} records, {} blocks rejected, debit account {}",
        file_name,
        ledger.records.len(),
        ledger.rejected.len(),
        ledger.debit_account
    );

    Ok(Json(UploadResponse::from(ledger)))
}

/// POST /gerar-oficio：回傳 .docx 下載
pub async fn generate_oficio(
    State(state): State<AppState>,
    payload: std::result::Result<Json<OficioRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) =
        payload.map_err(|e| OficioError::validation(format!("JSON inválido: {}", e.body_text())))?;

    let renderer = state.renderer.clone();
    let (request, bytes) = tokio::task::spawn_blocking(move || {
        let bytes = renderer.render(&request)?;
        Ok::<_, OficioError>((request, bytes))
    })
    .await
    .map_err(|e| OficioError::IoError(std::io::Error::other(e)))??;

    let numero = request.numero_oficio.as_deref().unwrap_or_default();
    let disposition = content_disposition(&download_name(numero));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(DOCX_MIME)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// ASCII 後備檔名加上 RFC 5987 的 UTF-8 檔名
fn content_disposition(file_name: &str) -> HeaderValue {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '-',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    let encoded: String = file_name
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-' | b'_' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect();

    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
