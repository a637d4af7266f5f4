use crate::domain::model::{Ledger, OficioRequest, TreasuryAccount};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// 輸出目的地（CLI 為本機目錄）
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn treasury(&self) -> &TreasuryAccount;
}

/// 從 PDF 取出線性文字（逐頁串接）
pub trait TextExtractor: Send + Sync {
    fn extract_path(&self, path: &Path) -> Result<String>;
    fn extract_bytes(&self, bytes: &[u8]) -> Result<String>;
}

/// 將請求內容輸出為 .docx 位元組
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, request: &OficioRequest) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<String>;
    async fn transform(&self, raw_text: String) -> Result<Ledger>;
    async fn load(&self, ledger: Ledger) -> Result<String>;
}
