pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use args::{Cli, Command, ExtractArgs, ExtractJob, RenderArgs, ServerArgs};

#[cfg(feature = "cli")]
mod args {
    use crate::core::ConfigProvider;
    use crate::domain::model::TreasuryAccount;
    use crate::utils::error::{OficioError, Result};
    use crate::utils::validation::{self, Validate};
    use clap::{Args, Parser, Subcommand};

    #[derive(Debug, Clone, Parser)]
    #[command(name = "oficio")]
    #[command(about = "Extract payee ledgers from payment-order PDFs and render the ofício")]
    pub struct Cli {
        /// Path to TOML configuration file
        #[arg(short, long, default_value = "oficio.toml")]
        pub config: String,

        /// Enable verbose output
        #[arg(short, long)]
        pub verbose: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Parse one PDF and write ledger.json / fornecedores.csv into a zip
        Extract(ExtractArgs),
        /// Parse one or more PDFs and render the ofício .docx
        Render(RenderArgs),
    }

    #[derive(Debug, Clone, Args)]
    pub struct ExtractArgs {
        /// Payment-order PDF
        pub pdf: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, value_delimiter = ',', default_value = "json,csv")]
        pub formats: Vec<String>,
    }

    #[derive(Debug, Clone, Args)]
    pub struct RenderArgs {
        /// Ofício number, e.g. 123/2025
        #[arg(long)]
        pub numero: String,

        /// Payment-order PDFs; tables are grouped by debit account
        #[arg(long = "pdf", required = true)]
        pub pdfs: Vec<String>,

        /// Name of the first signer (defaults to the first configured signature)
        #[arg(long)]
        pub assinatura1: Option<String>,

        /// Name of the second signer (defaults to the second configured signature)
        #[arg(long)]
        pub assinatura2: Option<String>,

        #[arg(short, long)]
        pub output: Option<String>,
    }

    #[derive(Debug, Clone, Parser)]
    #[command(name = "oficio-server")]
    #[command(about = "HTTP service for PDF upload and ofício generation")]
    pub struct ServerArgs {
        #[arg(short, long, default_value = "oficio.toml")]
        pub config: String,

        /// Override the configured port (PORT env var still wins)
        #[arg(long)]
        pub port: Option<u16>,

        /// Emit JSON logs
        #[arg(long)]
        pub json_logs: bool,
    }

    /// 一次 extract 執行所需的設定
    #[derive(Debug, Clone)]
    pub struct ExtractJob {
        pub args: ExtractArgs,
        pub treasury: TreasuryAccount,
    }

    impl ConfigProvider for ExtractJob {
        fn input_path(&self) -> &str {
            &self.args.pdf
        }

        fn output_path(&self) -> &str {
            &self.args.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.args.formats
        }

        fn treasury(&self) -> &TreasuryAccount {
            &self.treasury
        }
    }

    impl Validate for ExtractJob {
        fn validate(&self) -> Result<()> {
            validation::validate_path("pdf", &self.args.pdf)?;
            validation::validate_file_extension("pdf", &self.args.pdf, &["pdf"])?;
            validation::validate_path("output_path", &self.args.output_path)?;

            let valid_formats = ["json", "csv"];
            if self.args.formats.is_empty() {
                return Err(OficioError::InvalidConfigValueError {
                    field: "formats".to_string(),
                    value: String::new(),
                    reason: "At least one output format is required".to_string(),
                });
            }
            for format in &self.args.formats {
                if !valid_formats.contains(&format.as_str()) {
                    return Err(OficioError::InvalidConfigValueError {
                        field: "formats".to_string(),
                        value: format.clone(),
                        reason: format!(
                            "Unsupported format. Valid formats: {}",
                            valid_formats.join(", ")
                        ),
                    });
                }
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn job(pdf: &str, formats: &[&str]) -> ExtractJob {
            ExtractJob {
                args: ExtractArgs {
                    pdf: pdf.to_string(),
                    output_path: "./output".to_string(),
                    formats: formats.iter().map(|f| f.to_string()).collect(),
                },
                treasury: TreasuryAccount::default(),
            }
        }

        #[test]
        fn test_extract_job_validation() {
            assert!(job("ordem.pdf", &["json", "csv"]).validate().is_ok());
            assert!(job("ordem.txt", &["json"]).validate().is_err());
            assert!(job("ordem.pdf", &["xml"]).validate().is_err());
            assert!(job("ordem.pdf", &[]).validate().is_err());
        }

        #[test]
        fn test_parse_render_command() {
            let cli = Cli::try_parse_from([
                "oficio", "render", "--numero", "12/2025", "--pdf", "a.pdf", "--pdf", "b.pdf",
            ])
            .unwrap();
            match cli.command {
                Command::Render(args) => {
                    assert_eq!(args.numero, "12/2025");
                    assert_eq!(args.pdfs, vec!["a.pdf", "b.pdf"]);
                    assert!(args.assinatura1.is_none());
                }
                other => panic!("unexpected command {:?}", other),
            }
        }
    }
}
