// ==========================================
// Excel 批量上传 - 记录提交 Trait
// ==========================================
// 职责: 定义批量提交接口（不包含实现）
// 约定: 单次调用、原子提交;要么全部写入,要么整体失败
// ==========================================

use crate::domain::cell::Record;
use crate::importer::error::UploadResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 提交请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    /// 目标对象类型
    pub target_type: String,
    /// 关联父记录的字段名
    pub parent_field_name: String,
    /// 父记录 ID
    pub parent_id: String,
    /// 字段名（按列位置对应记录中的值）
    pub field_names: Vec<String>,
    /// 全部提取记录
    pub records: Vec<Record>,
}

/// 提交回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// 批次 ID
    pub batch_id: String,
    /// 写入记录数
    pub inserted: usize,
}

// ==========================================
// RecordSubmitter Trait
// ==========================================
// 实现者: SqliteRecordSubmitter
#[async_trait]
pub trait RecordSubmitter: Send + Sync {
    /// 提交一批记录
    ///
    /// # 返回
    /// - Ok(SubmissionReceipt): 全部写入
    /// - Err(Submission): 后端拒绝,未写入任何记录
    async fn submit(&self, request: SubmissionRequest) -> UploadResult<SubmissionReceipt>;
}

#[async_trait]
impl<T: RecordSubmitter + ?Sized> RecordSubmitter for Arc<T> {
    async fn submit(&self, request: SubmissionRequest) -> UploadResult<SubmissionReceipt> {
        (**self).submit(request).await
    }
}
