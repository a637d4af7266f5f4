mod common;

use oficio_etl::domain::model::{DebitAccount, ReviewFlag};
use oficio_etl::domain::ports::TextExtractor;
use oficio_etl::utils::error::{BlockRejection, OficioError};
use oficio_etl::{assemble, PdfTextExtractor, TreasuryAccount};

#[test]
fn test_pages_are_concatenated_in_order() {
    let text = PdfTextExtractor::new()
        .extract_bytes(&common::sample_order_pdf())
        .unwrap();

    let first = text.find("EMPENHO 1021").unwrap();
    let last = text.find("EMPENHO 1024").unwrap();
    assert!(first < last);
    assert!(text.contains("ACME COMERCIO LTDA"));
    assert!(text.contains("CONTA 9876543210-2"));
}

#[test]
fn test_sample_order_end_to_end() {
    let raw_text = PdfTextExtractor::new()
        .extract_bytes(&common::sample_order_pdf())
        .unwrap();
    let ledger = assemble(raw_text, &TreasuryAccount::default());

    let names: Vec<_> = ledger.records.iter().map(|r| r.nome.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "ACME COMERCIO LTDA",
            "PREFEITURA MUNICIPAL DE UBERABA",
            "BETA SERVICOS",
            "DELTA"
        ]
    );

    let acme = &ledger.records[0];
    assert_eq!(acme.cnpj, "12.345.678/0001-90");
    assert_eq!(acme.banco, "104");
    assert_eq!(acme.agencia, "0123-4");
    assert_eq!(acme.conta, "45678-9");
    assert_eq!(acme.fonte, "1.500.000");
    assert_eq!(acme.desconto, "1.234,56");
    assert_eq!(acme.valor_liquido, "2.000,00");
    assert_eq!(acme.review_flag(), ReviewFlag::Discount);

    assert_eq!(ledger.records[1].valor_liquido, "1.234,56");
    assert_eq!(ledger.records[1].conta, "118.252-8");

    // GAMA 沒有 CC，被拒但仍觸發 superávit 警示
    assert_eq!(ledger.rejected.len(), 1);
    assert_eq!(ledger.rejected[0].block_index, 2);
    assert_eq!(ledger.rejected[0].reason, BlockRejection::MissingAccount);
    assert!(ledger.fund_source_alert);

    assert_eq!(
        ledger.debit_account,
        DebitAccount::Known("9876543210-2".to_string())
    );
}

#[test]
fn test_single_text_object_keeps_line_structure() {
    let raw_text = PdfTextExtractor::new()
        .extract_bytes(&common::sample_order_pdf_single_object())
        .unwrap();

    // 來源代碼必須獨立成行
    assert!(raw_text.contains("\n1.500.000\n"));
    assert!(raw_text.contains("\n2.100.300\n"));
    assert!(raw_text.contains("\n22.333.444/0001-55\n0,00\n750,00\n"));

    let ledger = assemble(raw_text, &TreasuryAccount::default());
    assert!(ledger.fund_source_alert);
    assert_eq!(ledger.records.len(), 4);
    assert_eq!(ledger.rejected.len(), 1);

    let acme = &ledger.records[0];
    assert_eq!(acme.nome, "ACME COMERCIO LTDA");
    assert_eq!(acme.fonte, "1.500.000");
    assert_eq!(acme.desconto, "1.234,56");
    assert_eq!(acme.valor_liquido, "2.000,00");

    let delta = &ledger.records[3];
    assert_eq!(delta.nome, "DELTA");
    assert_eq!(delta.desconto, "0,00");
    assert_eq!(delta.valor_liquido, "750,00");
    assert!(!ledger
        .records
        .iter()
        .any(|r| r.valor_liquido == "550,00"));

    assert_eq!(ledger.debit_account.as_str(), "9876543210-2");
}

#[test]
fn test_pdf_without_markers_gives_empty_ledger() {
    let pdf = common::build_pdf(&[&["RELATORIO MENSAL", "TOTAL 1.000,00"]]);
    let raw_text = PdfTextExtractor::new().extract_bytes(&pdf).unwrap();
    let ledger = assemble(raw_text, &TreasuryAccount::default());

    assert!(ledger.records.is_empty());
    assert!(!ledger.fund_source_alert);
    assert_eq!(ledger.debit_account.as_str(), "Desconhecida");
    assert!(ledger.raw_text.contains("RELATORIO MENSAL"));
}

#[test]
fn test_non_pdf_upload_is_extraction_error() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("ordem.pdf");
    std::fs::write(&path, "<html><body>ORDEM DE PAGAMENTO</body></html>").unwrap();

    let err = PdfTextExtractor::new().extract_path(&path).unwrap_err();
    assert!(matches!(err, OficioError::ExtractionError { .. }));
}

#[test]
fn test_extract_from_path() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("ordem.pdf");
    std::fs::write(&path, common::sample_order_pdf()).unwrap();

    let text = PdfTextExtractor::new().extract_path(&path).unwrap();
    assert!(text.contains("BETA SERVICOS"));
}
