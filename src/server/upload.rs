use crate::utils::error::Result;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// 暫存檔名中保留的原始檔名長度上限（字元）
const MAX_NAME_CHARS: usize = 64;

/// 上傳暫存區。每個請求產生唯一檔名，避免同名檔案並發覆寫。
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// 寫入上傳內容；回傳的檔案在 drop 時刪除
    pub fn persist(&self, original_name: &str, bytes: &[u8]) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&format!("-{}", sanitize_file_name(original_name)))
            .tempfile_in(&self.dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(file)
    }
}

/// 只保留檔名本身的安全字元，保留結尾（副檔名）並截到 `MAX_NAME_CHARS`
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let skip = base.chars().count().saturating_sub(MAX_NAME_CHARS);
    let cleaned: String = base
        .chars()
        .skip(skip)
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['.', '_']).is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned
    }
}
