use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OficioError {
    #[error("PDF extraction failed: {message}")]
    ExtractionError { message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Document rendering error: {message}")]
    RenderError { message: String },
}

pub type Result<T> = std::result::Result<T, OficioError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Extraction,
    Configuration,
    Validation,
    Rendering,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OficioError {
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::ExtractionError {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::RenderError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ExtractionError { .. } => ErrorCategory::Extraction,
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::RenderError { .. } | Self::ZipError(_) | Self::XmlError(_) => {
                ErrorCategory::Rendering
            }
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Extraction => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Rendering => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給使用者看的訊息（葡萄牙文，與前端一致）
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ExtractionError { .. } => "Erro ao processar o PDF.".to_string(),
            Self::ValidationError { message } => message.clone(),
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. } => {
                format!("Configuração inválida: {}", field)
            }
            Self::RenderError { .. } | Self::ZipError(_) | Self::XmlError(_) => {
                "Erro ao gerar ofício.".to_string()
            }
            _ => "Erro interno.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Extraction => {
                "Check that the file is a readable, unencrypted PDF with embedded text"
            }
            ErrorCategory::Configuration => "Review the TOML configuration file and CLI flags",
            ErrorCategory::Validation => "Fill in the required fields and resubmit",
            ErrorCategory::Rendering => "Check the ofício template path and that it is a valid .docx",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

/// 單一 EMPENHO 區塊解析失敗；可恢復，只記錄不中斷整批
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("block #{block_index} rejected: {reason}")]
pub struct BlockParseError {
    pub block_index: usize,
    pub reason: BlockRejection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockRejection {
    MissingAccount,
    InsufficientValues { found: usize },
}

impl fmt::Display for BlockRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAccount => write!(f, "no 'CC:' account label"),
            Self::InsufficientValues { found } => write!(
                f,
                "expected at least 2 monetary values before 'Banco:', found {}",
                found
            ),
        }
    }
}
