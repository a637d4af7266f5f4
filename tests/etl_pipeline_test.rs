mod common;

use oficio_etl::core::pipeline::OUTPUT_ARCHIVE;
use oficio_etl::core::ConfigProvider;
use oficio_etl::utils::error::OficioError;
use oficio_etl::{EtlEngine, LocalStorage, PdfPipeline, PdfTextExtractor, TreasuryAccount};
use std::io::{Cursor, Read};
use tempfile::TempDir;

struct JobConfig {
    input: String,
    output: String,
    formats: Vec<String>,
    treasury: TreasuryAccount,
}

impl JobConfig {
    fn new(temp_dir: &TempDir, formats: &[&str]) -> Self {
        Self {
            input: temp_dir.path().join("ordem.pdf").to_string_lossy().into_owned(),
            output: temp_dir.path().join("out").to_string_lossy().into_owned(),
            formats: formats.iter().map(|f| f.to_string()).collect(),
            treasury: TreasuryAccount::default(),
        }
    }
}

impl ConfigProvider for JobConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn treasury(&self) -> &TreasuryAccount {
        &self.treasury
    }
}

fn engine(config: JobConfig) -> EtlEngine<PdfPipeline<LocalStorage, JobConfig, PdfTextExtractor>> {
    let storage = LocalStorage::new(config.output.clone());
    EtlEngine::new(PdfPipeline::new(storage, config, PdfTextExtractor::new()))
}

#[tokio::test]
async fn test_engine_writes_ledger_archive() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("ordem.pdf"), common::sample_order_pdf()).unwrap();

    let output_path = engine(JobConfig::new(&temp_dir, &["json", "csv"]))
        .run()
        .await
        .unwrap();
    assert!(output_path.ends_with(OUTPUT_ARCHIVE));

    let data = std::fs::read(temp_dir.path().join("out").join(OUTPUT_ARCHIVE)).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();

    let mut json = String::new();
    archive
        .by_name("ledger.json")
        .unwrap()
        .read_to_string(&mut json)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["conta_debito"], "9876543210-2");
    assert_eq!(value["fonte_alerta"], true);
    assert_eq!(value["total_liquido"], "4.484,56");
    assert_eq!(value["fornecedores"].as_array().unwrap().len(), 4);
    assert_eq!(value["rejeitados"].as_array().unwrap().len(), 1);

    let mut csv_text = String::new();
    archive
        .by_name("fornecedores.csv")
        .unwrap()
        .read_to_string(&mut csv_text)
        .unwrap();
    // 標題列 + 4 筆
    assert_eq!(csv_text.lines().count(), 5);
}

#[tokio::test]
async fn test_engine_json_only() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("ordem.pdf"), common::sample_order_pdf()).unwrap();

    engine(JobConfig::new(&temp_dir, &["json"])).run().await.unwrap();

    let data = std::fs::read(temp_dir.path().join("out").join(OUTPUT_ARCHIVE)).unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
    assert_eq!(archive.len(), 1);
    assert!(archive.file_names().any(|name| name == "ledger.json"));
}

#[tokio::test]
async fn test_engine_fails_on_missing_pdf() {
    let temp_dir = TempDir::new().unwrap();

    let err = engine(JobConfig::new(&temp_dir, &["json"]))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, OficioError::ExtractionError { .. }));
    assert!(!temp_dir.path().join("out").exists());
}
