use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting extraction...");

        // Extract
        let raw_text = self.pipeline.extract().await?;
        tracing::info!("Extracted {} characters of text", raw_text.chars().count());

        // Transform
        let ledger = self.pipeline.transform(raw_text).await?;
        tracing::info!(
            "Parsed {} records ({} blocks rejected), debit account {}",
            ledger.records.len(),
            ledger.rejected.len(),
            ledger.debit_account
        );
        if ledger.fund_source_alert {
            tracing::warn!("⚠️ Fund source starting with 2 found (superávit), review before paying");
        }

        // Load
        let output_path = self.pipeline.load(ledger).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
