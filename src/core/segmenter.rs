use crate::core::patterns;

/// 兩個 EMPENHO 標記之間的一段文字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionBlock<'a> {
    pub index: usize,
    pub text: &'a str,
}

/// 依 EMPENHO 切塊。沒有任何標記時回傳空集合，這不是錯誤。
pub fn segment_blocks(text: &str) -> Vec<TransactionBlock<'_>> {
    let markers: Vec<_> = patterns::markers(text).collect();

    markers
        .iter()
        .enumerate()
        .map(|(index, marker)| {
            let end = markers
                .get(index + 1)
                .map(|next| next.start())
                .unwrap_or(text.len());
            TransactionBlock {
                index,
                text: &text[marker.end()..end],
            }
        })
        .collect()
}
