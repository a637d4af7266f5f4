use crate::core::ledger::assemble;
use crate::core::{ConfigProvider, Pipeline, Storage, TextExtractor};
use crate::domain::model::{format_brl_amount, Ledger, PayeeRecord};
use crate::utils::error::{OficioError, Result};
use serde::Serialize;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const OUTPUT_ARCHIVE: &str = "oficio_ledger.zip";

/// CLI 用的管道：讀 PDF -> 解析 -> 打包 JSON/CSV
pub struct PdfPipeline<S: Storage, C: ConfigProvider, E: TextExtractor> {
    storage: S,
    config: C,
    extractor: E,
}

impl<S: Storage, C: ConfigProvider, E: TextExtractor> PdfPipeline<S, C, E> {
    pub fn new(storage: S, config: C, extractor: E) -> Self {
        Self {
            storage,
            config,
            extractor,
        }
    }
}

#[derive(Serialize)]
struct LedgerExport<'a> {
    conta_debito: &'a str,
    fonte_alerta: bool,
    total_liquido: String,
    fornecedores: &'a [PayeeRecord],
    rejeitados: Vec<String>,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    nome: &'a str,
    cnpj: &'a str,
    banco: &'a str,
    agencia: &'a str,
    conta: &'a str,
    valor_liquido: &'a str,
    fonte: &'a str,
    desconto: &'a str,
    revisao: &'a str,
}

fn ledger_csv(records: &[PayeeRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(CsvRow {
            nome: &record.nome,
            cnpj: &record.cnpj,
            banco: &record.banco,
            agencia: &record.agencia,
            conta: &record.conta,
            valor_liquido: &record.valor_liquido,
            fonte: &record.fonte,
            desconto: &record.desconto,
            revisao: record.review_flag().describe(),
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| OficioError::IoError(e.into_error()))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, E: TextExtractor> Pipeline for PdfPipeline<S, C, E> {
    async fn extract(&self) -> Result<String> {
        let input = self.config.input_path();
        tracing::debug!("Reading PDF from: {}", input);

        let bytes = tokio::fs::read(input)
            .await
            .map_err(|e| OficioError::extraction(format!("{}: {}", input, e)))?;
        self.extractor.extract_bytes(&bytes)
    }

    async fn transform(&self, raw_text: String) -> Result<Ledger> {
        Ok(assemble(raw_text, self.config.treasury()))
    }

    async fn load(&self, ledger: Ledger) -> Result<String> {
        let formats = self.config.output_formats();
        let output_path = format!("{}/{}", self.config.output_path(), OUTPUT_ARCHIVE);

        // 建立 ZIP
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            if formats.iter().any(|f| f == "json") {
                let export = LedgerExport {
                    conta_debito: ledger.debit_account.as_str(),
                    fonte_alerta: ledger.fund_source_alert,
                    total_liquido: format_brl_amount(ledger.total_net()),
                    fornecedores: &ledger.records,
                    rejeitados: ledger.rejected.iter().map(ToString::to_string).collect(),
                };
                zip.start_file("ledger.json", SimpleFileOptions::default())?;
                zip.write_all(serde_json::to_string_pretty(&export)?.as_bytes())?;
            }

            if formats.iter().any(|f| f == "csv") {
                zip.start_file("fornecedores.csv", SimpleFileOptions::default())?;
                zip.write_all(&ledger_csv(&ledger.records)?)?;
            }

            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(OUTPUT_ARCHIVE, &zip_data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TreasuryAccount;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct StaticText(&'static str);

    impl TextExtractor for StaticText {
        fn extract_path(&self, _path: &Path) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn extract_bytes(&self, _bytes: &[u8]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct TestConfig {
        formats: Vec<String>,
        treasury: TreasuryAccount,
    }

    impl ConfigProvider for TestConfig {
        fn input_path(&self) -> &str {
            "/nonexistent/ordem.pdf"
        }

        fn output_path(&self) -> &str {
            "./out"
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn treasury(&self) -> &TreasuryAccount {
            &self.treasury
        }
    }

    const TEXT: &str = "CONTA 0001234567-8\nEMPENHO 7 ACME LTDA 12.345.678/0001-90\n\
        10,00\n990,00\nBanco: 104 AG: 1 CC: 2-3\n";

    fn pipeline(formats: &[&str]) -> (PdfPipeline<MockStorage, TestConfig, StaticText>, MockStorage) {
        let storage = MockStorage::new();
        let config = TestConfig {
            formats: formats.iter().map(|f| f.to_string()).collect(),
            treasury: TreasuryAccount::default(),
        };
        (
            PdfPipeline::new(storage.clone(), config, StaticText(TEXT)),
            storage,
        )
    }

    #[tokio::test]
    async fn test_load_writes_json_and_csv() {
        let (pipeline, storage) = pipeline(&["json", "csv"]);
        let ledger = pipeline.transform(TEXT.to_string()).await.unwrap();
        assert_eq!(ledger.records.len(), 2);

        let path = pipeline.load(ledger).await.unwrap();
        assert_eq!(path, "./out/oficio_ledger.zip");

        let data = storage.get_file(OUTPUT_ARCHIVE).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut json = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("ledger.json").unwrap(), &mut json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["conta_debito"], "0001234567-8");
        assert_eq!(value["total_liquido"], "1.000,00");

        let mut csv_text = String::new();
        std::io::Read::read_to_string(
            &mut archive.by_name("fornecedores.csv").unwrap(),
            &mut csv_text,
        )
        .unwrap();
        assert!(csv_text.starts_with("nome,cnpj,banco,agencia,conta,valor_liquido,fonte,desconto,revisao"));
        assert!(csv_text.contains("ACME LTDA"));
        assert!(csv_text.contains("Desconto - Fazer transferência no sistema contábil"));
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_extraction_error() {
        let (pipeline, _) = pipeline(&["json"]);
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, OficioError::ExtractionError { .. }));
    }
}
