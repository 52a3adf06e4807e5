// ==========================================
// Excel 批量上传 - 导入层
// ==========================================
// 职责: 文件读取 → 表格解码 → 记录提取
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod file_accessor;
pub mod record_extractor;
pub mod sheet_decoder;

// 重导出核心类型
pub use error::{UploadError, UploadResult, NO_RECORDS_INSERTED_NOTICE};
pub use file_accessor::{FileAccessor, FileSelection};
pub use record_extractor::RecordExtractor;
pub use sheet_decoder::{
    CalamineDecoder, CalamineDecoderProvider, CsvDecoder, CsvDecoderProvider, DecoderKind,
    SheetDecoder, SheetDecoderProvider, CSV_SHEET_NAME,
};
