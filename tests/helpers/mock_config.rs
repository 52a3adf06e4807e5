// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use excel_upload::config::UploadConfigReader;
use excel_upload::importer::{DecoderKind, UploadError, UploadResult};
use std::time::Duration;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub object_type: String,
    pub parent_field_name: String,
    pub parent_record_id: String,
    pub field_names: String,
    pub success_delay: Duration,
    pub require_rows: bool,
    pub decoder_kind: DecoderKind,
    /// 置为 Some 时 get_field_names 返回配置错误
    pub broken_key: Option<String>,
}

impl MockConfig {
    /// 创建默认配置（Contact / AccountId / Name,Age / 停留 1000 ms）
    pub fn default() -> Self {
        Self {
            object_type: "Contact".to_string(),
            parent_field_name: "AccountId".to_string(),
            parent_record_id: "001A".to_string(),
            field_names: "Name,Age".to_string(),
            success_delay: Duration::from_millis(1000),
            require_rows: false,
            decoder_kind: DecoderKind::Workbook,
            broken_key: None,
        }
    }

    /// 无停留时间（真实时钟下的测试）
    pub fn no_delay() -> Self {
        let mut config = Self::default();
        config.success_delay = Duration::ZERO;
        config
    }

    /// 无数据行时报错
    pub fn requiring_rows() -> Self {
        let mut config = Self::no_delay();
        config.require_rows = true;
        config
    }

    /// 字段列表读取失败
    pub fn broken() -> Self {
        let mut config = Self::no_delay();
        config.broken_key = Some("upload.field_names".to_string());
        config
    }
}

#[async_trait]
impl UploadConfigReader for MockConfig {
    async fn get_object_type(&self) -> UploadResult<String> {
        Ok(self.object_type.clone())
    }

    async fn get_parent_field_name(&self) -> UploadResult<String> {
        Ok(self.parent_field_name.clone())
    }

    async fn get_parent_record_id(&self) -> UploadResult<String> {
        Ok(self.parent_record_id.clone())
    }

    async fn get_field_names(&self) -> UploadResult<String> {
        match &self.broken_key {
            Some(key) => Err(UploadError::Config {
                key: key.clone(),
                message: "missing".to_string(),
            }),
            None => Ok(self.field_names.clone()),
        }
    }

    async fn get_success_delay(&self) -> UploadResult<Duration> {
        Ok(self.success_delay)
    }

    async fn get_require_rows(&self) -> UploadResult<bool> {
        Ok(self.require_rows)
    }

    async fn get_decoder_kind(&self) -> UploadResult<DecoderKind> {
        Ok(self.decoder_kind)
    }
}
