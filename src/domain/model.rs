use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::BlockParseError;

/// 找不到借方帳號時的哨兵值
pub const DEBIT_ACCOUNT_UNKNOWN: &str = "Desconhecida";

/// 零折扣，不產生國庫回沖記錄
pub const ZERO_AMOUNT: &str = "0,00";

/// 一筆付款對象（fornecedor）。JSON 欄位名稱沿用前端約定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeeRecord {
    pub nome: String,
    pub cnpj: String,
    #[serde(default)]
    pub banco: String,
    #[serde(default)]
    pub agencia: String,
    pub conta: String,
    #[serde(rename = "valorLiquido")]
    pub valor_liquido: String,
    #[serde(default)]
    pub fonte: String,
    #[serde(default)]
    pub desconto: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFlag {
    None,
    Superavit,
    Discount,
    SuperavitAndDiscount,
}

impl ReviewFlag {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Superavit => "Pagamento de Superávit - Fazer lançamento",
            Self::Discount => "Desconto - Fazer transferência no sistema contábil",
            Self::SuperavitAndDiscount => {
                "Superávit e Desconto - Fazer ambos os lançamentos contábeis"
            }
        }
    }
}

impl PayeeRecord {
    pub fn has_discount(&self) -> bool {
        !self.desconto.is_empty() && self.desconto != ZERO_AMOUNT
    }

    /// 來源代碼（去掉非數字後）以 2 開頭即為 superávit
    pub fn is_superavit(&self) -> bool {
        self.fonte
            .chars()
            .find(|c| c.is_ascii_digit())
            .is_some_and(|c| c == '2')
    }

    pub fn review_flag(&self) -> ReviewFlag {
        match (self.is_superavit(), self.has_discount()) {
            (true, true) => ReviewFlag::SuperavitAndDiscount,
            (true, false) => ReviewFlag::Superavit,
            (false, true) => ReviewFlag::Discount,
            (false, false) => ReviewFlag::None,
        }
    }

    pub fn net_amount(&self) -> Option<Decimal> {
        parse_brl_amount(&self.valor_liquido)
    }
}

/// 國庫回沖記錄的固定身分（折扣金額退回市府帳戶）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreasuryAccount {
    pub nome: String,
    pub cnpj: String,
    pub banco: String,
    pub agencia: String,
    pub conta: String,
}

impl Default for TreasuryAccount {
    fn default() -> Self {
        Self {
            nome: "PREFEITURA MUNICIPAL DE UBERABA".to_string(),
            cnpj: "18.428.839/0001-90".to_string(),
            banco: "001".to_string(),
            agencia: "0015-9".to_string(),
            conta: "118.252-8".to_string(),
        }
    }
}

impl TreasuryAccount {
    pub fn synthetic_record(&self, discount: &str) -> PayeeRecord {
        PayeeRecord {
            nome: self.nome.clone(),
            cnpj: self.cnpj.clone(),
            banco: self.banco.clone(),
            agencia: self.agencia.clone(),
            conta: self.conta.clone(),
            valor_liquido: discount.to_string(),
            fonte: String::new(),
            desconto: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebitAccount {
    Known(String),
    Unknown,
}

impl DebitAccount {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(account) => account,
            Self::Unknown => DEBIT_ACCOUNT_UNKNOWN,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl fmt::Display for DebitAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DebitAccount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// 一份 PDF 的完整解析結果
#[derive(Debug, Clone)]
pub struct Ledger {
    pub debit_account: DebitAccount,
    pub records: Vec<PayeeRecord>,
    pub fund_source_alert: bool,
    pub raw_text: String,
    pub rejected: Vec<BlockParseError>,
}

impl Ledger {
    pub fn total_net(&self) -> Decimal {
        self.records.iter().filter_map(PayeeRecord::net_amount).sum()
    }
}

/// `/upload` 的回應格式
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub conta_debito: String,
    pub fornecedores: Vec<PayeeRecord>,
    pub fonte_alerta: bool,
    pub texto_pdf: String,
}

impl From<Ledger> for UploadResponse {
    fn from(ledger: Ledger) -> Self {
        Self {
            conta_debito: ledger.debit_account.to_string(),
            fornecedores: ledger.records,
            fonte_alerta: ledger.fund_source_alert,
            texto_pdf: ledger.raw_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub nome: String,
    pub cargo: String,
    pub decreto: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTable {
    pub conta: String,
    #[serde(default)]
    pub fornecedores: Vec<PayeeRecord>,
}

/// `/gerar-oficio` 的請求內容；必填欄位在 `validate` 時檢查
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OficioRequest {
    pub numero_oficio: Option<String>,
    pub assinatura1: Option<String>,
    pub assinatura2: Option<String>,
    pub tabelas: Option<Vec<AccountTable>>,
    #[serde(default)]
    pub assinaturas: Vec<Signature>,
}

impl OficioRequest {
    /// 依借方帳號合併：同帳號的表格追加記錄，否則新增一張表
    pub fn add_ledger(&mut self, ledger: &Ledger) {
        let conta = normalize_account_display(ledger.debit_account.as_str());
        let tables = self.tabelas.get_or_insert_with(Vec::new);

        match tables.iter_mut().find(|t| t.conta == conta) {
            Some(existing) => existing.fornecedores.extend(ledger.records.iter().cloned()),
            None => tables.push(AccountTable {
                conta,
                fornecedores: ledger.records.clone(),
            }),
        }
    }

    pub fn signature(&self, nome: &str) -> Option<&Signature> {
        self.assinaturas.iter().find(|s| s.nome == nome)
    }
}

/// 去掉帳號前導零："0001234567-8" -> "1234567-8"
pub fn normalize_account_display(account: &str) -> String {
    let Some((number, digit)) = account.split_once('-') else {
        return account.to_string();
    };

    let valid = !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
        && digit.len() == 1
        && digit.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return account.to_string();
    }

    let trimmed = number.trim_start_matches('0');
    let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
    format!("{}-{}", trimmed, digit)
}

/// 解析巴西格式金額 "1.234,56"
pub fn parse_brl_amount(value: &str) -> Option<Decimal> {
    let normalized: String = value
        .trim()
        .chars()
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

/// 反向格式化為 "1.234,56"
pub fn format_brl_amount(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("{}{},{}", if negative { "-" } else { "" }, grouped, frac_part)
}
