// ==========================================
// Excel 批量上传 - 通知消息
// ==========================================
// 职责: 推送给外部通知界面的结构化消息 {title, message, variant}
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 通知标题
pub mod titles {
    pub const SUCCESS: &str = "Excel Upload: Success";
    pub const LOAD_ERROR_PREFIX: &str = "Excel Upload: Error loading";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Success,
    Error,
}

impl fmt::Display for NotificationVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationVariant::Success => write!(f, "success"),
            NotificationVariant::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub variant: NotificationVariant,
}

impl Notification {
    /// 上传成功通知: "<N> records uploaded"
    pub fn upload_success(record_count: usize) -> Self {
        Self {
            title: titles::SUCCESS.to_string(),
            message: format!("{} records uploaded", record_count),
            variant: NotificationVariant::Success,
        }
    }

    /// 解析库加载失败通知
    pub fn decoder_load_failed(decoder: &str, reason: &str) -> Self {
        Self {
            title: format!("{} {}", titles::LOAD_ERROR_PREFIX, decoder),
            message: reason.to_string(),
            variant: NotificationVariant::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_success_message() {
        let n = Notification::upload_success(2);
        assert_eq!(n.title, "Excel Upload: Success");
        assert_eq!(n.message, "2 records uploaded");
        assert_eq!(n.variant, NotificationVariant::Success);
    }

    #[test]
    fn test_variant_serializes_lowercase() {
        let n = Notification::decoder_load_failed("calamine", "boom");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["variant"], "error");
        assert_eq!(json["title"], "Excel Upload: Error loading calamine");
    }
}
