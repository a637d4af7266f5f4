pub mod date;
pub mod docx;

use crate::config::toml_config::RenderConfig;
use crate::domain::model::OficioRequest;
use crate::domain::ports::DocumentRenderer;
use crate::utils::error::{OficioError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_required_field};
use chrono::NaiveDate;
use std::io::{Read, Write};
use std::path::PathBuf;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::ZipArchive;

use self::docx::{BodyWriter, RunStyle};

/// 下載檔名
pub fn download_name(numero: &str) -> String {
    format!("OFICIO {} - AUTORIZAÇÃO DE PAGAMENTO.docx", numero)
}

pub struct DocxRenderer {
    template_path: Option<PathBuf>,
    work_dir: PathBuf,
    city: String,
    date: Option<NaiveDate>,
}

impl DocxRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            template_path: config.template_path.as_ref().map(PathBuf::from),
            work_dir: config.work_dir(),
            city: config.city.clone(),
            date: None,
        }
    }

    /// 固定日期（測試用），否則使用當天
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    fn date_text(&self) -> String {
        let date = self
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        date::format_long_date(date)
    }

    /// 表格與簽名區塊
    fn body_content(&self, request: &OficioRequest) -> Result<String> {
        let mut body = BodyWriter::new();
        body.empty_paragraph()?;

        let tables = request.tabelas.as_deref().unwrap_or_default();
        for (idx, table) in tables.iter().enumerate() {
            body.account_table(table)?;
            // 表格之間留一行
            if idx + 1 < tables.len() {
                body.empty_paragraph()?;
            }
        }

        body.empty_paragraph()?;

        for name in [&request.assinatura1, &request.assinatura2]
            .into_iter()
            .flatten()
        {
            match request.signature(name) {
                Some(signature) => body.signature_block(signature)?,
                None => tracing::warn!("Signature '{}' not found in assinaturas, skipping", name),
            }
        }

        body.into_xml()
    }

    fn standalone_document(&self, numero: &str, date: &str, body: &str) -> Result<String> {
        let mut header = BodyWriter::new();
        header.paragraph(
            &format!("OFÍCIO Nº {}", numero),
            false,
            RunStyle {
                bold: true,
                half_points: None,
            },
        )?;
        header.paragraph(&format!("{}, {}", self.city, date), false, RunStyle::default())?;
        header.paragraph("Assunto: Autorização de pagamento", false, RunStyle::default())?;

        docx::minimal_document(&format!("{}{}", header.into_xml()?, body))
    }

    fn write_package<W: Write + std::io::Seek>(
        &self,
        writer: W,
        numero: &str,
        date: &str,
        body: &str,
    ) -> Result<()> {
        let mut zip = ZipWriter::new(writer);

        match &self.template_path {
            Some(template) => {
                tracing::debug!("Filling template {}", template.display());
                let file = std::fs::File::open(template).map_err(|e| {
                    OficioError::render(format!("template {}: {}", template.display(), e))
                })?;
                let mut archive = ZipArchive::new(file)?;
                let mut found_document = false;

                for i in 0..archive.len() {
                    let mut entry = archive.by_index(i)?;
                    let name = entry.name().to_string();
                    if entry.is_dir() {
                        zip.add_directory(name, SimpleFileOptions::default())?;
                        continue;
                    }

                    let mut data = Vec::new();
                    entry.read_to_end(&mut data)?;

                    if name == docx::DOCUMENT_PART {
                        found_document = true;
                        let xml = String::from_utf8(data).map_err(|_| {
                            OficioError::render("template document.xml is not UTF-8")
                        })?;
                        let filled = docx::fill_template(&xml, numero, date, body)?;
                        zip.start_file(name, SimpleFileOptions::default())?;
                        zip.write_all(filled.as_bytes())?;
                    } else {
                        zip.start_file(name, SimpleFileOptions::default())?;
                        zip.write_all(&data)?;
                    }
                }

                if !found_document {
                    return Err(OficioError::render(format!(
                        "template {} has no {}",
                        template.display(),
                        docx::DOCUMENT_PART
                    )));
                }
            }
            None => {
                zip.start_file("[Content_Types].xml", SimpleFileOptions::default())?;
                zip.write_all(docx::CONTENT_TYPES.as_bytes())?;
                zip.start_file("_rels/.rels", SimpleFileOptions::default())?;
                zip.write_all(docx::PACKAGE_RELS.as_bytes())?;
                zip.start_file(docx::DOCUMENT_PART, SimpleFileOptions::default())?;
                zip.write_all(self.standalone_document(numero, date, body)?.as_bytes())?;
            }
        }

        zip.finish()?;
        Ok(())
    }
}

impl DocumentRenderer for DocxRenderer {
    fn render(&self, request: &OficioRequest) -> Result<Vec<u8>> {
        let numero = validate_required_field("numeroOficio", &request.numero_oficio)?;
        validate_non_empty_string("numeroOficio", numero)?;
        validate_required_field("tabelas", &request.tabelas)?;

        let date = self.date_text();
        let body = self.body_content(request)?;

        // 暫存檔在離開作用域時刪除（成功或失敗皆然）
        std::fs::create_dir_all(&self.work_dir)?;
        let mut temp = tempfile::Builder::new()
            .prefix("oficio-")
            .suffix(".docx")
            .tempfile_in(&self.work_dir)?;
        self.write_package(temp.as_file_mut(), numero, &date, &body)?;

        let mut bytes = Vec::new();
        temp.reopen()?.read_to_end(&mut bytes)?;

        tracing::info!(
            "📝 Rendered ofício {} ({} tables, {} bytes)",
            numero,
            request.tabelas.as_ref().map_or(0, Vec::len),
            bytes.len()
        );
        Ok(bytes)
    }
}
