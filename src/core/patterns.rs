//! 所有正規表達式集中在此，每個 matcher 可單獨測試。
//!
//! The patterns mirror the layout of the municipal payment-order PDFs: one
//! `EMPENHO` section per payee, a CPF/CNPJ after the payee name, labeled
//! `Banco:`/`AG:`/`CC:` fields and Brazilian-formatted amounts.

use regex::{Match, Regex};
use std::sync::LazyLock;

static MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)EMPENHO\s+").unwrap());

static TAX_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{3}\.\d{3}\.\d{3}-\d{2}|\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}").unwrap()
});

static FUND_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(\d\.\d{3}\.\d{3})\r?\n").unwrap());

static BANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Banco:\s*(\d+)").unwrap());
static BRANCH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"AG:\s*([\d\-]+)").unwrap());
static ACCOUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"CC:\s*([\d\-]+)").unwrap());

static MONEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:\.\d{3})*,\d{2}").unwrap());

static DEBIT_ACCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{10} ?- ?\d").unwrap());

static LEADING_NUMBERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\s+\d+)*\s+").unwrap());

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+").unwrap());

/// 標示銀行欄位起點；金額只在它之前搜尋
pub const BANK_LABEL: &str = "Banco:";

/// 每個 EMPENHO 標記（含其後空白）的位置
pub fn markers(text: &str) -> impl Iterator<Item = Match<'_>> {
    MARKER.find_iter(text)
}

/// 第一個 CPF 或 CNPJ
pub fn tax_id(block: &str) -> Option<Match<'_>> {
    TAX_ID.find(block)
}

/// 單獨成行的 d.ddd.ddd 來源代碼，取第一個
pub fn fund_source(block: &str) -> Option<&str> {
    FUND_SOURCE
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn bank_code(block: &str) -> Option<&str> {
    labeled(&BANK, block)
}

pub fn branch_code(block: &str) -> Option<&str> {
    labeled(&BRANCH, block)
}

pub fn account_number(block: &str) -> Option<&str> {
    labeled(&ACCOUNT, block)
}

fn labeled<'t>(pattern: &Regex, block: &'t str) -> Option<&'t str> {
    pattern
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn amounts(text: &str) -> Vec<&str> {
    MONEY.find_iter(text).map(|m| m.as_str()).collect()
}

/// 最後一個 dddddddddd-d 帳號，去掉空白
pub fn last_debit_account(text: &str) -> Option<String> {
    DEBIT_ACCOUNT
        .find_iter(text)
        .last()
        .map(|m| m.as_str().replace(' ', ""))
}

/// 換行壓成單一空白，再去掉行號殘留的前導數字
pub fn clean_name(raw: &str) -> String {
    let flattened = LINE_BREAKS.replace_all(raw.trim(), " ");
    LEADING_NUMBERS.replace(&flattened, "").into_owned()
}
