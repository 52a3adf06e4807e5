// ==========================================
// Excel 批量上传 - 领域模型层
// ==========================================
// 职责: 定义单元格/工作簿/记录、上传会话状态、通知消息
// 红线: 不含数据访问逻辑,不含流程编排逻辑
// ==========================================

pub mod cell;
pub mod notification;
pub mod session;

// 重导出核心类型
pub use cell::{trim_trailing_empty, CellValue, Record, Sheet, Workbook};
pub use notification::{Notification, NotificationVariant};
pub use session::{step_messages, UploadSnapshot, UploadStep};
