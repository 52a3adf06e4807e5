// ==========================================
// Excel 批量上传 - 数据仓储层
// ==========================================
// 职责: 批量记录持久化（后端提交）
// 红线: Repository 不含流程编排,只做数据写入与查询
// ==========================================

pub mod record_submitter;
pub mod record_submitter_impl;

pub use record_submitter::{RecordSubmitter, SubmissionReceipt, SubmissionRequest};
pub use record_submitter_impl::{SqliteRecordSubmitter, StoredRecord};
