// ==========================================
// Excel 批量上传 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::upload_config_trait::{UploadConfigReader, DEFAULT_SUCCESS_DELAY_MS};
use crate::db::open_sqlite_connection;
use crate::importer::error::{UploadError, UploadResult};
use crate::importer::sheet_decoder::DecoderKind;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 配置键
pub mod config_keys {
    pub const OBJECT_TYPE: &str = "upload.object_type";
    pub const PARENT_FIELD_NAME: &str = "upload.parent_field_name";
    pub const PARENT_RECORD_ID: &str = "upload.parent_record_id";
    pub const FIELD_NAMES: &str = "upload.field_names";
    pub const SUCCESS_DELAY_MS: &str = "upload.success_delay_ms";
    pub const REQUIRE_ROWS: &str = "upload.require_rows";
    pub const DECODER: &str = "upload.decoder";

    pub const ALL: [&str; 7] = [
        OBJECT_TYPE,
        PARENT_FIELD_NAME,
        PARENT_RECORD_ID,
        FIELD_NAMES,
        SUCCESS_DELAY_MS,
        REQUIRE_ROWS,
        DECODER,
    ];
}

/// 全局配置范围
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> UploadResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> UploadResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| UploadError::Database(format!("锁获取失败: {}", e)))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    pub fn get_config_value(&self, key: &str) -> UploadResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| UploadError::Database(format!("锁获取失败: {}", e)))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> UploadResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| UploadError::Database(format!("锁获取失败: {}", e)))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3",
            params![GLOBAL_SCOPE, key, value],
        )?;

        tracing::info!(key = %key, value = %value, "配置已更新");
        Ok(())
    }

    /// 获取全部 global 配置（按 key 排序）
    pub fn get_config_snapshot(&self) -> UploadResult<BTreeMap<String, String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| UploadError::Database(format!("锁获取失败: {}", e)))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取必填配置（缺失或空白即报错）
    fn get_required(&self, key: &str) -> UploadResult<String> {
        match self.get_config_value(key)? {
            Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(UploadError::Config {
                key: key.to_string(),
                message: "value is not configured".to_string(),
            }),
        }
    }

    fn parse_bool(key: &str, raw: &str) -> UploadResult<bool> {
        match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Ok(true),
            "0" | "false" | "no" | "n" | "off" => Ok(false),
            other => Err(UploadError::Config {
                key: key.to_string(),
                message: format!("invalid boolean '{}'", other),
            }),
        }
    }
}

#[async_trait]
impl UploadConfigReader for ConfigManager {
    async fn get_object_type(&self) -> UploadResult<String> {
        self.get_required(config_keys::OBJECT_TYPE)
    }

    async fn get_parent_field_name(&self) -> UploadResult<String> {
        self.get_required(config_keys::PARENT_FIELD_NAME)
    }

    async fn get_parent_record_id(&self) -> UploadResult<String> {
        self.get_required(config_keys::PARENT_RECORD_ID)
    }

    async fn get_field_names(&self) -> UploadResult<String> {
        self.get_required(config_keys::FIELD_NAMES)
    }

    async fn get_success_delay(&self) -> UploadResult<Duration> {
        let Some(raw) = self.get_config_value(config_keys::SUCCESS_DELAY_MS)? else {
            return Ok(Duration::from_millis(DEFAULT_SUCCESS_DELAY_MS));
        };

        let ms = raw.trim().parse::<u64>().map_err(|e| UploadError::Config {
            key: config_keys::SUCCESS_DELAY_MS.to_string(),
            message: format!("invalid milliseconds '{}': {}", raw, e),
        })?;
        Ok(Duration::from_millis(ms))
    }

    async fn get_require_rows(&self) -> UploadResult<bool> {
        match self.get_config_value(config_keys::REQUIRE_ROWS)? {
            Some(raw) => Self::parse_bool(config_keys::REQUIRE_ROWS, &raw),
            None => Ok(false),
        }
    }

    async fn get_decoder_kind(&self) -> UploadResult<DecoderKind> {
        match self.get_config_value(config_keys::DECODER)? {
            Some(raw) => raw.parse(),
            None => Ok(DecoderKind::default()),
        }
    }
}
