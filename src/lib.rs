// ==========================================
// Excel 批量上传 - 核心库
// ==========================================
// 流程: 选择文件 → 读取 → 解码首个工作表 → 提取记录 → 批量提交
// 技术栈: Rust + calamine + SQLite
// 系统定位: 父记录下的子记录批量导入
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 单元格/记录/会话状态/通知
pub mod domain;

// 导入层 - 文件读取、表格解码、记录提取
pub mod importer;

// 配置层 - 上传目标配置
pub mod config;

// 数据仓储层 - 批量提交
pub mod repository;

// 引擎层 - 上传编排
pub mod engine;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 应用层 - 资源组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CellValue, Notification, NotificationVariant, Record, Sheet, UploadSnapshot, UploadStep,
    Workbook,
};

// 导入
pub use importer::{DecoderKind, FileSelection, UploadError, UploadResult};

// 配置
pub use config::{ConfigManager, ParentScopedConfig, UploadConfigReader, UploadSettings};

// 仓储
pub use repository::{RecordSubmitter, SqliteRecordSubmitter, SubmissionReceipt, SubmissionRequest};

// 引擎
pub use engine::{NotificationSink, UploadOrchestrator, UploadReport};

// 应用
pub use app::{get_default_db_path, AppState};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Excel Upload";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!APP_NAME.is_empty());
    }
}
