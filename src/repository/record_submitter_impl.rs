// ==========================================
// Excel 批量上传 - 记录提交 Repository 实现
// ==========================================
// 职责: 将提取记录写入 SQLite（使用 rusqlite）
// 红线: 整批一个事务,任何一行失败则整体回滚
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::cell::Record;
use crate::importer::error::{UploadError, UploadResult};
use crate::repository::record_submitter::{RecordSubmitter, SubmissionReceipt, SubmissionRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Transaction};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 已落库的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub record_id: String,
    pub batch_id: String,
    pub object_type: String,
    pub parent_id: String,
    pub source_row: usize,
    pub fields: Value,
    pub created_at: String,
}

// ==========================================
// SqliteRecordSubmitter
// ==========================================
pub struct SqliteRecordSubmitter {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordSubmitter {
    /// 创建新的 Submitter 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> UploadResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> UploadResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| UploadError::Database(format!("锁获取失败: {}", e)))
    }

    /// 校验请求（不触碰数据库）
    fn validate(request: &SubmissionRequest) -> Result<(), String> {
        if request.target_type.trim().is_empty() {
            return Err("Invalid object type: target type is empty".to_string());
        }
        if request.parent_field_name.trim().is_empty() {
            return Err("Invalid field: parent field name is empty".to_string());
        }
        if request.parent_id.trim().is_empty() {
            return Err("Invalid id: parent record id is empty".to_string());
        }
        if let Some(pos) = request.field_names.iter().position(|f| f.trim().is_empty()) {
            return Err(format!("Invalid field: field name at position {} is empty", pos + 1));
        }
        // 父记录字段由系统填充,不能同时映射表格列
        if request
            .field_names
            .iter()
            .any(|f| f.trim() == request.parent_field_name.trim())
        {
            return Err(format!(
                "Invalid field: {} is set from the parent record and cannot be mapped to a column",
                request.parent_field_name
            ));
        }

        for record in &request.records {
            if record.len() > request.field_names.len() {
                return Err(format!(
                    "Row {} has {} values but only {} field names are configured",
                    record.row_number + 1,
                    record.len(),
                    request.field_names.len()
                ));
            }
        }

        Ok(())
    }

    /// 按列位置映射字段名,并追加父记录关联字段
    fn build_fields(request: &SubmissionRequest, record: &Record) -> Result<Value, String> {
        let mut fields = Map::new();
        for (name, value) in request.field_names.iter().zip(record.values.iter()) {
            let json = serde_json::to_value(value).map_err(|e| {
                format!("Row {}: cannot encode field {}: {}", record.row_number + 1, name, e)
            })?;
            fields.insert(name.clone(), json);
        }
        fields.insert(
            request.parent_field_name.clone(),
            Value::String(request.parent_id.clone()),
        );
        Ok(Value::Object(fields))
    }

    /// 在事务中写入批次与记录
    fn insert_batch_tx(
        tx: &Transaction,
        batch_id: &str,
        request: &SubmissionRequest,
        now: &DateTime<Utc>,
    ) -> Result<usize, String> {
        let field_names_json =
            serde_json::to_string(&request.field_names).map_err(|e| e.to_string())?;
        let created_at = now.to_rfc3339();

        tx.execute(
            r#"
            INSERT INTO upload_batch (
                batch_id, object_type, parent_field_name, parent_id,
                field_names_json, record_count, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                batch_id,
                request.target_type,
                request.parent_field_name,
                request.parent_id,
                field_names_json,
                request.records.len() as i64,
                created_at,
            ],
        )
        .map_err(|e| e.to_string())?;

        let mut stmt = tx
            .prepare(
                r#"
                INSERT INTO uploaded_record (
                    record_id, batch_id, object_type, parent_id,
                    source_row, fields_json, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .map_err(|e| e.to_string())?;

        let mut count = 0;
        for record in &request.records {
            let fields = Self::build_fields(request, record)?;
            stmt.execute(params![
                Uuid::new_v4().to_string(),
                batch_id,
                request.target_type,
                request.parent_id,
                record.row_number as i64,
                fields.to_string(),
                created_at,
            ])
            .map_err(|e| format!("Row {}: {}", record.row_number + 1, e))?;
            count += 1;
        }

        Ok(count)
    }

    /// 统计某父记录下的已上传记录数
    pub fn count_records_for_parent(&self, object_type: &str, parent_id: &str) -> UploadResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM uploaded_record WHERE object_type = ?1 AND parent_id = ?2",
            params![object_type, parent_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// 按批次查询已上传记录（按源行号排序）
    pub fn list_records_for_batch(&self, batch_id: &str) -> UploadResult<Vec<StoredRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT record_id, batch_id, object_type, parent_id, source_row, fields_json, created_at
            FROM uploaded_record
            WHERE batch_id = ?1
            ORDER BY source_row
            "#,
        )?;

        let rows = stmt.query_map(params![batch_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (record_id, batch_id, object_type, parent_id, source_row, fields_json, created_at) =
                row?;
            let fields = serde_json::from_str(&fields_json).map_err(|e| {
                UploadError::Database(format!("记录 {} 字段解析失败: {}", record_id, e))
            })?;
            records.push(StoredRecord {
                record_id,
                batch_id,
                object_type,
                parent_id,
                source_row: source_row as usize,
                fields,
                created_at,
            });
        }

        Ok(records)
    }
}

#[async_trait]
impl RecordSubmitter for SqliteRecordSubmitter {
    async fn submit(&self, request: SubmissionRequest) -> UploadResult<SubmissionReceipt> {
        if let Err(message) = Self::validate(&request) {
            warn!(target_type = %request.target_type, reason = %message, "提交请求校验失败");
            return Err(UploadError::Submission(message));
        }

        let batch_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let conn = self
            .lock()
            .map_err(|e| UploadError::Submission(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| UploadError::Submission(e.to_string()))?;

        // 出错时 tx 被 drop,自动回滚
        let inserted = Self::insert_batch_tx(&tx, &batch_id, &request, &now)
            .map_err(UploadError::Submission)?;

        tx.commit()
            .map_err(|e| UploadError::Submission(e.to_string()))?;

        debug!(batch_id = %batch_id, "事务已提交");
        info!(
            batch_id = %batch_id,
            target_type = %request.target_type,
            parent_id = %request.parent_id,
            inserted = inserted,
            "记录批量写入完成"
        );

        Ok(SubmissionReceipt { batch_id, inserted })
    }
}
