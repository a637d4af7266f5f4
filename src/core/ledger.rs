use crate::core::parser::{parse_block, BlockOutcome};
use crate::core::patterns;
use crate::core::segmenter::segment_blocks;
use crate::domain::model::{DebitAccount, Ledger, TreasuryAccount};

/// 整份文字 -> Ledger。單一區塊失敗只記錄，不影響其他區塊。
pub fn assemble(raw_text: String, treasury: &TreasuryAccount) -> Ledger {
    let mut records = Vec::new();
    let mut rejected = Vec::new();
    let mut fund_source_alert = false;

    let blocks = segment_blocks(&raw_text);
    tracing::debug!("Segmented {} EMPENHO blocks", blocks.len());

    for block in &blocks {
        let outcome = parse_block(block, treasury);

        if outcome.fund_source().is_some_and(|f| f.starts_with('2')) {
            fund_source_alert = true;
        }

        match outcome {
            BlockOutcome::NotPayee => {
                tracing::debug!("Block #{} has no CPF/CNPJ, skipping", block.index);
            }
            BlockOutcome::Parsed(parsed) => {
                tracing::debug!(
                    "Block #{} parsed: {} ({})",
                    block.index,
                    parsed.payee.nome,
                    parsed.payee.cnpj
                );
                records.extend(parsed.into_records());
            }
            BlockOutcome::Rejected { error, .. } => {
                tracing::warn!("⚠️ {}", error);
                rejected.push(error);
            }
        }
    }

    let debit_account = find_debit_account(&raw_text);

    Ledger {
        debit_account,
        records,
        fund_source_alert,
        raw_text,
        rejected,
    }
}

pub fn find_debit_account(text: &str) -> DebitAccount {
    patterns::last_debit_account(text)
        .map(DebitAccount::Known)
        .unwrap_or(DebitAccount::Unknown)
}
