// ==========================================
// Excel 批量上传 - 应用层
// ==========================================
// 职责: 组装数据库、配置、后端与编排器
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, SqliteUploadOrchestrator, DB_PATH_ENV};
