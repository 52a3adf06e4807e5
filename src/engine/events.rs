// ==========================================
// Excel 批量上传 - 通知发布
// ==========================================
// 职责: 定义通知发布 trait,编排器只依赖 trait
// 说明: 界面层/CLI 提供具体实现
// ==========================================

use crate::domain::notification::Notification;
use std::error::Error;
use tokio::sync::mpsc;

// ==========================================
// 通知发布 Trait
// ==========================================

/// 通知接收者 Trait
///
/// # 实现说明
/// - `ChannelNotificationSink`: 转发到 tokio mpsc 通道（CLI / 测试）
/// - `TracingNotificationSink`: 仅写日志
/// - `NoOpNotificationSink`: 丢弃
pub trait NotificationSink: Send + Sync {
    /// 发布通知
    ///
    /// # 返回
    /// - `Ok(())`: 已投递
    /// - `Err`: 投递失败（调用方只记录日志,不影响上传结果）
    fn notify(&self, notification: Notification) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作通知接收者
///
/// 用于不需要通知的场景（如单元测试）
#[derive(Debug, Clone, Default)]
pub struct NoOpNotificationSink;

impl NotificationSink for NoOpNotificationSink {
    fn notify(&self, notification: Notification) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpNotificationSink: 跳过通知 - title={}, variant={}",
            notification.title,
            notification.variant
        );
        Ok(())
    }
}

/// 写日志的通知接收者
#[derive(Debug, Clone, Default)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, notification: Notification) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::info!(
            title = %notification.title,
            variant = %notification.variant,
            message = %notification.message,
            "通知"
        );
        Ok(())
    }
}

/// 通道通知接收者
#[derive(Debug, Clone)]
pub struct ChannelNotificationSink {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotificationSink {
    /// 创建接收者及对应的接收端
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NotificationSink for ChannelNotificationSink {
    fn notify(&self, notification: Notification) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.sender
            .send(notification)
            .map_err(|e| format!("通知通道已关闭: {}", e.0.title).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_delivers() {
        let (sink, mut rx) = ChannelNotificationSink::new();
        sink.notify(Notification::upload_success(3)).unwrap();
        let received = rx.try_recv().unwrap();
        assert_eq!(received.message, "3 records uploaded");
    }

    #[test]
    fn test_channel_sink_closed() {
        let (sink, rx) = ChannelNotificationSink::new();
        drop(rx);
        assert!(sink.notify(Notification::upload_success(1)).is_err());
    }

    #[test]
    fn test_noop_sink() {
        assert!(NoOpNotificationSink
            .notify(Notification::upload_success(0))
            .is_ok());
    }
}
