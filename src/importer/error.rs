// ==========================================
// Excel 批量上传 - 上传模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 解析库加载 / 文件选择 / 文件格式 / 提交失败
// ==========================================

use thiserror::Error;

/// 错误状态下追加在原因之后的固定提示
pub const NO_RECORDS_INSERTED_NOTICE: &str =
    "No records were inserted.  Please correct the data or check the configuration of the component.";

/// 上传模块错误类型
///
/// 每个变体的 Display 即为展示给用户的原因文本
#[derive(Error, Debug)]
pub enum UploadError {
    // ===== 解析能力错误 =====
    #[error("Error loading {decoder}: {reason}")]
    LibraryLoad { decoder: String, reason: String },

    // ===== 文件相关错误 =====
    #[error("{0}")]
    FileSelection(String),

    #[error("Error reading file -- {0}")]
    FileRead(String),

    #[error("{0}")]
    Format(String),

    // ===== 后端提交错误 =====
    #[error("{0}")]
    Submission(String),

    // ===== 配置错误 =====
    #[error("Configuration error (key: {key}): {message}")]
    Config { key: String, message: String },

    // ===== 数据库错误 =====
    #[error("Database error: {0}")]
    Database(String),

    // ===== 通用错误 =====
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UploadError {
    /// 错误分类标识（用于日志字段）
    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::LibraryLoad { .. } => "library_load",
            UploadError::FileSelection(_) => "file_selection",
            UploadError::FileRead(_) => "file_read",
            UploadError::Format(_) => "format",
            UploadError::Submission(_) => "submission",
            UploadError::Config { .. } => "config",
            UploadError::Database(_) => "database",
            UploadError::Internal(_) => "internal",
            UploadError::Other(_) => "other",
        }
    }

    /// 组装错误状态下的展示文本
    ///
    /// 格式: `Error: <原因>\n\n<固定提示>`
    pub fn display_message(&self) -> String {
        format!("Error: {}\n\n{}", self, NO_RECORDS_INSERTED_NOTICE)
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError::FileRead(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for UploadError {
    fn from(err: rusqlite::Error) -> Self {
        UploadError::Database(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for UploadError {
    fn from(err: csv::Error) -> Self {
        UploadError::Format(format!("Cannot read CSV file: {}", err))
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for UploadError {
    fn from(err: calamine::Error) -> Self {
        UploadError::Format(format!("Cannot read Excel sheet: {}", err))
    }
}

// 实现 From<tokio::task::JoinError>
impl From<tokio::task::JoinError> for UploadError {
    fn from(err: tokio::task::JoinError) -> Self {
        UploadError::Internal(format!("background task failed: {}", err))
    }
}

/// Result 类型别名
pub type UploadResult<T> = Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_message_composition() {
        let err = UploadError::Submission("REQUIRED_FIELD_MISSING: Name".to_string());
        assert_eq!(
            err.display_message(),
            "Error: REQUIRED_FIELD_MISSING: Name\n\nNo records were inserted.  Please correct the data or check the configuration of the component."
        );
    }

    #[test]
    fn test_file_selection_reason_is_verbatim() {
        let err = UploadError::FileSelection("Error accessing file -- No file received".to_string());
        assert_eq!(err.to_string(), "Error accessing file -- No file received");
        assert_eq!(err.kind(), "file_selection");
    }

    #[test]
    fn test_io_error_maps_to_file_read() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: UploadError = io.into();
        assert!(matches!(err, UploadError::FileRead(_)));
    }
}
