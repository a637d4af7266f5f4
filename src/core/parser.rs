use crate::core::patterns;
use crate::core::segmenter::TransactionBlock;
use crate::domain::model::{PayeeRecord, TreasuryAccount, ZERO_AMOUNT};
use crate::utils::error::{BlockParseError, BlockRejection};

/// 成功解析的區塊：付款對象，加上折扣不為零時的國庫回沖記錄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
    pub payee: PayeeRecord,
    pub treasury: Option<PayeeRecord>,
}

impl ParsedBlock {
    pub fn into_records(self) -> impl Iterator<Item = PayeeRecord> {
        std::iter::once(self.payee).chain(self.treasury)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// 沒有 CPF/CNPJ，不是付款區塊
    NotPayee,
    Parsed(ParsedBlock),
    /// 有 CPF/CNPJ 但欄位不足；`fund_source` 仍回報給警示計算
    Rejected {
        fund_source: Option<String>,
        error: BlockParseError,
    },
}

impl BlockOutcome {
    pub fn fund_source(&self) -> Option<&str> {
        match self {
            Self::NotPayee => None,
            Self::Parsed(parsed) => Some(parsed.payee.fonte.as_str()).filter(|f| !f.is_empty()),
            Self::Rejected { fund_source, .. } => fund_source.as_deref(),
        }
    }
}

pub fn parse_block(block: &TransactionBlock<'_>, treasury: &TreasuryAccount) -> BlockOutcome {
    let text = block.text;

    let Some(tax_id) = patterns::tax_id(text) else {
        return BlockOutcome::NotPayee;
    };

    let nome = patterns::clean_name(&text[..tax_id.start()]);
    let fonte = patterns::fund_source(text).unwrap_or_default();

    let reject = |reason: BlockRejection| BlockOutcome::Rejected {
        fund_source: Some(fonte.to_string()).filter(|f| !f.is_empty()),
        error: BlockParseError {
            block_index: block.index,
            reason,
        },
    };

    let Some(conta) = patterns::account_number(text) else {
        return reject(BlockRejection::MissingAccount);
    };
    let banco = patterns::bank_code(text).unwrap_or_default();
    let agencia = patterns::branch_code(text).unwrap_or_default();

    // 金額只看 "Banco:" 之前的部分
    let before_bank = text
        .split_once(patterns::BANK_LABEL)
        .map(|(head, _)| head)
        .unwrap_or(text);
    let amounts = patterns::amounts(before_bank);
    let [.., desconto, valor_liquido] = amounts.as_slice() else {
        return reject(BlockRejection::InsufficientValues {
            found: amounts.len(),
        });
    };

    let treasury_record =
        (*desconto != ZERO_AMOUNT).then(|| treasury.synthetic_record(desconto));

    BlockOutcome::Parsed(ParsedBlock {
        payee: PayeeRecord {
            nome,
            cnpj: tax_id.as_str().to_string(),
            banco: banco.to_string(),
            agencia: agencia.to_string(),
            conta: conta.to_string(),
            valor_liquido: valor_liquido.to_string(),
            fonte: fonte.to_string(),
            desconto: desconto.to_string(),
        },
        treasury: treasury_record,
    })
}
