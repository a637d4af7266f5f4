pub mod config;
pub mod core;
pub mod domain;
pub mod render;
#[cfg(feature = "server")]
pub mod server;
pub mod utils;

pub use config::cli::LocalStorage;
pub use config::toml_config::AppConfig;

pub use core::{
    etl::EtlEngine, extractor::PdfTextExtractor, ledger::assemble, pipeline::PdfPipeline,
};
pub use domain::model::{Ledger, OficioRequest, PayeeRecord, TreasuryAccount};
pub use render::DocxRenderer;
pub use utils::error::{OficioError, Result};
