use crate::domain::ports::TextExtractor;
use crate::utils::error::{OficioError, Result};
use lopdf::content::Operation;
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::Path;

/// TJ 陣列中大於此值的負位移視為字間空白
const TJ_SPACE_THRESHOLD: i64 = -100;

/// lopdf 逐頁抽取文字並依頁序串接。
///
/// 每個換行操作（`Td`/`TD` 有垂直位移、`T*`、`'`、`"`、`Tm`、`ET`）輸出一個 `\n`，
/// 讓同一個文字物件內的多行仍各自成行。
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_document(doc: &Document) -> Result<String> {
        if doc.is_encrypted() {
            return Err(OficioError::extraction("document is encrypted"));
        }

        let pages = doc.get_pages();
        tracing::debug!("PDF has {} pages", pages.len());

        let mut text = String::new();
        let mut failed = 0;
        for (page_number, page_id) in &pages {
            match page_text(doc, *page_id) {
                Ok(page) => {
                    text.push_str(&page);
                    line_break(&mut text);
                }
                Err(e) => {
                    // 單頁失敗略過，其餘頁面照常處理
                    tracing::warn!("⚠️ Skipping page {}: {}", page_number, e);
                    failed += 1;
                }
            }
        }

        if !pages.is_empty() && failed == pages.len() {
            return Err(OficioError::extraction(format!(
                "no readable page out of {}",
                pages.len()
            )));
        }

        Ok(text)
    }
}

fn page_text(doc: &Document, page_id: ObjectId) -> lopdf::Result<String> {
    let encodings: BTreeMap<Vec<u8>, &str> = doc
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect();
    let content = doc.get_and_decode_page_content(page_id)?;

    let mut text = String::new();
    let mut encoding = None;
    for operation in &content.operations {
        apply_operation(&mut text, &mut encoding, &encodings, operation);
    }
    Ok(text)
}

fn apply_operation<'a>(
    text: &mut String,
    encoding: &mut Option<&'a str>,
    encodings: &BTreeMap<Vec<u8>, &'a str>,
    operation: &Operation,
) {
    let operands = &operation.operands;
    match operation.operator.as_str() {
        "Tf" => {
            *encoding = operands
                .first()
                .and_then(|name| name.as_name().ok())
                .and_then(|name| encodings.get(name).copied());
        }
        "Tj" | "TJ" => collect_text(text, *encoding, operands),
        "'" => {
            line_break(text);
            collect_text(text, *encoding, operands);
        }
        // aw ac string
        "\"" => {
            line_break(text);
            collect_text(text, *encoding, operands.get(2..).unwrap_or_default());
        }
        "Td" | "TD" => {
            let dy = operands.get(1).and_then(|o| o.as_float().ok()).unwrap_or(0.0);
            if dy != 0.0 {
                line_break(text);
            } else if !text.is_empty() && !text.ends_with(char::is_whitespace) {
                text.push(' ');
            }
        }
        "T*" | "Tm" | "ET" => line_break(text),
        _ => {}
    }
}

fn collect_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => text.push_str(&Document::decode_text(encoding, bytes)),
            Object::Array(items) => collect_text(text, encoding, items),
            Object::Integer(offset) if *offset < TJ_SPACE_THRESHOLD => text.push(' '),
            Object::Real(offset) if (*offset as i64) < TJ_SPACE_THRESHOLD => text.push(' '),
            _ => {}
        }
    }
}

fn line_break(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract_path(&self, path: &Path) -> Result<String> {
        let doc = Document::load(path)
            .map_err(|e| OficioError::extraction(format!("{}: {}", path.display(), e)))?;
        Self::extract_document(&doc)
    }

    fn extract_bytes(&self, bytes: &[u8]) -> Result<String> {
        let doc = Document::load_mem(bytes).map_err(|e| OficioError::extraction(e.to_string()))?;
        Self::extract_document(&doc)
    }
}
