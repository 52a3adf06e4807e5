// ==========================================
// Excel 批量上传 - 引擎层
// ==========================================
// 职责: 上传流程编排、状态机、通知发布
// ==========================================

pub mod events;
pub mod upload_orchestrator;

pub use events::{
    ChannelNotificationSink, NoOpNotificationSink, NotificationSink, TracingNotificationSink,
};
pub use upload_orchestrator::{
    DecoderReadiness, UploadOrchestrator, UploadReport, PROGRESS_CHANNEL_CAPACITY,
};
