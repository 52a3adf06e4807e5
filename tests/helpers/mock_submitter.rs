// ==========================================
// Mock 提交实现 - 记录每次调用
// ==========================================

use async_trait::async_trait;
use excel_upload::importer::{UploadError, UploadResult};
use excel_upload::repository::{RecordSubmitter, SubmissionReceipt, SubmissionRequest};
use std::sync::Mutex;

/// 记录收到的请求;可配置为拒绝提交
#[derive(Debug, Default)]
pub struct MockSubmitter {
    pub requests: Mutex<Vec<SubmissionRequest>>,
    pub reject_with: Option<String>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次提交都失败
    pub fn rejecting(message: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reject_with: Some(message.to_string()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<SubmissionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl RecordSubmitter for MockSubmitter {
    async fn submit(&self, request: SubmissionRequest) -> UploadResult<SubmissionReceipt> {
        let inserted = request.records.len();
        self.requests.lock().unwrap().push(request);

        match &self.reject_with {
            Some(message) => Err(UploadError::Submission(message.clone())),
            None => Ok(SubmissionReceipt {
                batch_id: format!("batch-{}", self.call_count()),
                inserted,
            }),
        }
    }
}
