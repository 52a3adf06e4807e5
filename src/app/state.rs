// ==========================================
// Excel 批量上传 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享资源,组装上传编排器
// ==========================================

use std::sync::{Arc, Mutex};

use crate::config::{ConfigManager, ParentScopedConfig, UploadConfigReader};
use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::engine::{NotificationSink, UploadOrchestrator};
use crate::importer::error::UploadResult;
use crate::repository::SqliteRecordSubmitter;

/// 基于 SQLite 后端、绑定父记录的编排器
pub type SqliteUploadOrchestrator =
    UploadOrchestrator<Arc<SqliteRecordSubmitter>, ParentScopedConfig<Arc<ConfigManager>>>;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "EXCEL_UPLOAD_DB_PATH";

/// 应用状态
///
/// 配置与提交共用同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    /// 后端提交
    pub submitter: Arc<SqliteRecordSubmitter>,
}

impl AppState {
    /// 创建应用状态（打开数据库并建表）
    pub fn new(db_path: String) -> UploadResult<Self> {
        let conn = open_sqlite_connection(&db_path)?;
        ensure_schema(&conn)?;

        let schema_version = read_schema_version(&conn)?;
        if schema_version != Some(CURRENT_SCHEMA_VERSION) {
            tracing::warn!(
                found = ?schema_version,
                expected = CURRENT_SCHEMA_VERSION,
                "数据库 schema_version 与当前代码不一致"
            );
        }

        let conn = Arc::new(Mutex::new(conn));
        let config = Arc::new(ConfigManager::from_connection(conn.clone())?);
        let submitter = Arc::new(SqliteRecordSubmitter::from_connection(conn));

        tracing::info!(db_path = %db_path, "AppState 初始化完成");

        Ok(Self {
            db_path,
            config,
            submitter,
        })
    }

    /// 为某条父记录创建上传编排器
    ///
    /// 解码器类型取自配置 upload.decoder
    pub async fn orchestrator_for_parent(
        &self,
        parent_record_id: &str,
        sink: Arc<dyn NotificationSink>,
    ) -> UploadResult<SqliteUploadOrchestrator> {
        let decoder_kind = self.config.get_decoder_kind().await?;
        tracing::debug!(decoder = decoder_kind.as_str(), "选择解码器");

        Ok(UploadOrchestrator::initialize(
            decoder_kind.provider(),
            self.submitter.clone(),
            ParentScopedConfig::new(self.config.clone(), parent_record_id),
            sink,
        )
        .await)
    }
}

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 EXCEL_UPLOAD_DB_PATH（若设置）
/// - 否则: 用户数据目录/excel-upload/excel_upload.db
/// - 无用户数据目录时: ./excel_upload.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./excel_upload.db");

    // 尝试获取用户数据目录
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("excel-upload");

        // 确保目录存在;失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("excel_upload.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_keys;
    use crate::engine::NoOpNotificationSink;
    use tempfile::NamedTempFile;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[tokio::test]
    async fn test_orchestrator_uses_configured_decoder() {
        let temp_file = NamedTempFile::new().unwrap();
        let state = AppState::new(temp_file.path().to_str().unwrap().to_string()).unwrap();
        state.config.set_config_value(config_keys::DECODER, "csv").unwrap();

        let orchestrator = state
            .orchestrator_for_parent("001A", Arc::new(NoOpNotificationSink))
            .await
            .unwrap();

        assert!(orchestrator.is_ready());
        assert_eq!(format!("{:?}", orchestrator.readiness()), "Ready(csv)");
    }
}
