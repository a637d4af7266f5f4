use crate::domain::model::{Signature, TreasuryAccount};
use crate::utils::error::{OficioError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub render: RenderConfig,
    pub treasury: TreasuryAccount,
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: String,
    pub max_upload_mb: usize,
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            upload_dir: "uploads".to_string(),
            max_upload_mb: 20,
            json_logs: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// 範本 .docx；未設定時產生內建的簡易文件
    pub template_path: Option<String>,
    /// 產生文件時的暫存目錄，預設為系統暫存目錄
    pub work_dir: Option<String>,
    pub city: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template_path: None,
            work_dir: None,
            city: "Uberaba".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OficioError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| OficioError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 設定檔存在才載入，否則使用預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            Self::from_file(path)
        } else {
            tracing::info!(
                "No configuration at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// 替換環境變數 (例如 ${UPLOAD_DIR})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// PORT 環境變數優先（託管平台慣例）
    pub fn port(&self) -> u16 {
        std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(self.server.port)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.port())
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server.max_upload_mb * 1024 * 1024
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(OficioError::InvalidConfigValueError {
                field: "server.host".to_string(),
                value: self.server.host.clone(),
                reason: "Host cannot be empty".to_string(),
            });
        }
        validation::validate_range("server.port", self.server.port, 1, u16::MAX)?;
        validation::validate_path("server.upload_dir", &self.server.upload_dir)?;
        validation::validate_positive_number("server.max_upload_mb", self.server.max_upload_mb, 1)?;

        if let Some(template) = &self.render.template_path {
            validation::validate_path("render.template_path", template)?;
            validation::validate_file_extension("render.template_path", template, &["docx"])?;
        }

        if let Some(work_dir) = &self.render.work_dir {
            validation::validate_path("render.work_dir", work_dir)?;
        }

        if self.treasury.conta.trim().is_empty() {
            return Err(OficioError::InvalidConfigValueError {
                field: "treasury.conta".to_string(),
                value: self.treasury.conta.clone(),
                reason: "Treasury account cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
