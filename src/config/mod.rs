// ==========================================
// Excel 批量上传 - 配置层
// ==========================================
// 职责: 上传目标对象、父记录字段、字段列表等配置
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod upload_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, GLOBAL_SCOPE};
pub use upload_config_trait::{
    ParentScopedConfig, UploadConfigReader, UploadSettings, DEFAULT_SUCCESS_DELAY_MS,
};
