// ==========================================
// Excel 批量上传 - 上传配置读取 Trait
// ==========================================
// 职责: 定义编排器所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::error::UploadResult;
use crate::importer::sheet_decoder::DecoderKind;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// 完成后关闭模态框前的默认停留时间
pub const DEFAULT_SUCCESS_DELAY_MS: u64 = 1_000;

// ==========================================
// UploadSettings - 单次运行使用的配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSettings {
    /// 目标对象类型
    pub object_type: String,
    /// 关联父记录的字段名
    pub parent_field_name: String,
    /// 父记录 ID
    pub parent_record_id: String,
    /// 逗号分隔的字段名列表（按列位置对应）
    pub field_names: String,
    /// 完成后停留时间
    pub success_delay: Duration,
    /// 无数据行时是否报错
    pub require_rows: bool,
}

impl UploadSettings {
    /// 拆分字段名列表（按逗号,去除首尾空白,保持位置）
    pub fn field_name_list(&self) -> Vec<String> {
        self.field_names
            .split(',')
            .map(|name| name.trim().to_string())
            .collect()
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            object_type: String::new(),
            parent_field_name: String::new(),
            parent_record_id: String::new(),
            field_names: String::new(),
            success_delay: Duration::from_millis(DEFAULT_SUCCESS_DELAY_MS),
            require_rows: false,
        }
    }
}

// ==========================================
// UploadConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait UploadConfigReader: Send + Sync {
    /// 目标对象类型（必填）
    async fn get_object_type(&self) -> UploadResult<String>;

    /// 父记录关联字段名（必填）
    async fn get_parent_field_name(&self) -> UploadResult<String>;

    /// 父记录 ID（必填）
    async fn get_parent_record_id(&self) -> UploadResult<String>;

    /// 字段名列表原始字符串（必填）
    async fn get_field_names(&self) -> UploadResult<String>;

    /// 完成停留时间
    ///
    /// # 默认值
    /// - 1000 ms
    async fn get_success_delay(&self) -> UploadResult<Duration>;

    /// 无数据行时是否报错
    ///
    /// # 默认值
    /// - false（提交空批次）
    async fn get_require_rows(&self) -> UploadResult<bool>;

    /// 解码器类型
    ///
    /// # 默认值
    /// - workbook
    async fn get_decoder_kind(&self) -> UploadResult<DecoderKind>;

    /// 读取一次运行所需的全部配置
    async fn load_upload_settings(&self) -> UploadResult<UploadSettings> {
        Ok(UploadSettings {
            object_type: self.get_object_type().await?,
            parent_field_name: self.get_parent_field_name().await?,
            parent_record_id: self.get_parent_record_id().await?,
            field_names: self.get_field_names().await?,
            success_delay: self.get_success_delay().await?,
            require_rows: self.get_require_rows().await?,
        })
    }
}

#[async_trait]
impl<T: UploadConfigReader + ?Sized> UploadConfigReader for Arc<T> {
    async fn get_object_type(&self) -> UploadResult<String> {
        (**self).get_object_type().await
    }

    async fn get_parent_field_name(&self) -> UploadResult<String> {
        (**self).get_parent_field_name().await
    }

    async fn get_parent_record_id(&self) -> UploadResult<String> {
        (**self).get_parent_record_id().await
    }

    async fn get_field_names(&self) -> UploadResult<String> {
        (**self).get_field_names().await
    }

    async fn get_success_delay(&self) -> UploadResult<Duration> {
        (**self).get_success_delay().await
    }

    async fn get_require_rows(&self) -> UploadResult<bool> {
        (**self).get_require_rows().await
    }

    async fn get_decoder_kind(&self) -> UploadResult<DecoderKind> {
        (**self).get_decoder_kind().await
    }
}

// ==========================================
// ParentScopedConfig - 绑定父记录的配置
// ==========================================
// 用途: 组件挂在某条父记录上时,父记录 ID 来自调用方而非配置表
pub struct ParentScopedConfig<C: UploadConfigReader> {
    inner: C,
    parent_record_id: String,
}

impl<C: UploadConfigReader> ParentScopedConfig<C> {
    pub fn new(inner: C, parent_record_id: impl Into<String>) -> Self {
        Self {
            inner,
            parent_record_id: parent_record_id.into(),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: UploadConfigReader> UploadConfigReader for ParentScopedConfig<C> {
    async fn get_object_type(&self) -> UploadResult<String> {
        self.inner.get_object_type().await
    }

    async fn get_parent_field_name(&self) -> UploadResult<String> {
        self.inner.get_parent_field_name().await
    }

    async fn get_parent_record_id(&self) -> UploadResult<String> {
        Ok(self.parent_record_id.clone())
    }

    async fn get_field_names(&self) -> UploadResult<String> {
        self.inner.get_field_names().await
    }

    async fn get_success_delay(&self) -> UploadResult<Duration> {
        self.inner.get_success_delay().await
    }

    async fn get_require_rows(&self) -> UploadResult<bool> {
        self.inner.get_require_rows().await
    }

    async fn get_decoder_kind(&self) -> UploadResult<DecoderKind> {
        self.inner.get_decoder_kind().await
    }
}
