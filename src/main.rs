use clap::Parser;
use oficio_etl::config::{Cli, Command, ExtractArgs, ExtractJob, RenderArgs};
use oficio_etl::domain::model::{format_brl_amount, ReviewFlag};
use oficio_etl::domain::ports::{DocumentRenderer, TextExtractor};
use oficio_etl::render::download_name;
use oficio_etl::utils::error::{ErrorSeverity, OficioError};
use oficio_etl::utils::{logger, validation::Validate};
use oficio_etl::{
    assemble, AppConfig, DocxRenderer, EtlEngine, LocalStorage, OficioRequest, PdfPipeline,
    PdfTextExtractor,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting oficio CLI");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    let config = match AppConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(e);
    }

    let result = match cli.command {
        Command::Extract(args) => run_extract(args, &config).await,
        Command::Render(args) => run_render(args, &config),
    };

    match result {
        Ok(output_path) => {
            tracing::info!("✅ Completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: OficioError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}

async fn run_extract(args: ExtractArgs, config: &AppConfig) -> oficio_etl::Result<String> {
    let job = ExtractJob {
        args,
        treasury: config.treasury.clone(),
    };
    job.validate()?;

    let storage = LocalStorage::new(job.args.output_path.clone());
    let pipeline = PdfPipeline::new(storage, job, PdfTextExtractor::new());
    EtlEngine::new(pipeline).run().await
}

fn run_render(args: RenderArgs, config: &AppConfig) -> oficio_etl::Result<String> {
    let extractor = PdfTextExtractor::new();
    let mut request = OficioRequest {
        numero_oficio: Some(args.numero.clone()),
        assinatura1: args
            .assinatura1
            .or_else(|| config.signatures.first().map(|s| s.nome.clone())),
        assinatura2: args
            .assinatura2
            .or_else(|| config.signatures.get(1).map(|s| s.nome.clone())),
        tabelas: None,
        assinaturas: config.signatures.clone(),
    };

    for pdf in &args.pdfs {
        let raw_text = extractor.extract_path(std::path::Path::new(pdf))?;
        let ledger = assemble(raw_text, &config.treasury);

        println!(
            "📄 {}: conta {} | {} fornecedores | total R$ {} | {} blocos rejeitados",
            pdf,
            ledger.debit_account,
            ledger.records.len(),
            format_brl_amount(ledger.total_net()),
            ledger.rejected.len()
        );
        for record in &ledger.records {
            let flag = record.review_flag();
            if flag != ReviewFlag::None {
                println!("   ⚠️ {} (R$ {}): {}", record.nome, record.valor_liquido, flag.describe());
            }
        }
        if ledger.fund_source_alert {
            println!("   ⚠️ Fonte de superávit encontrada neste PDF");
        }
        if !ledger.debit_account.is_known() {
            tracing::warn!("No debit account found in {}", pdf);
        }

        request.add_ledger(&ledger);
    }

    let bytes = DocxRenderer::new(&config.render).render(&request)?;
    let output = args
        .output
        .unwrap_or_else(|| download_name(&args.numero).replace(['/', '\\'], "-"));
    std::fs::write(&output, bytes)?;

    Ok(output)
}
