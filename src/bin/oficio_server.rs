use clap::Parser;
use oficio_etl::config::ServerArgs;
use oficio_etl::utils::{logger, validation::Validate};
use oficio_etl::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    let mut config = match AppConfig::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 命令列覆蓋設定
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.json_logs {
        config.server.json_logs = true;
    }

    logger::init_server_logger(config.server.json_logs);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    oficio_etl::server::serve(config).await
}
