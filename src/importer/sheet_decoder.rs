// ==========================================
// Excel 批量上传 - 表格解码器
// ==========================================
// 阶段: Extracting（解码部分）
// 支持: Excel (.xlsx/.xlsm/.xlsb/.xls/.ods) / CSV (.csv)
// 职责: 二进制 → 工作簿（命名工作表 + 单元格网格）
// ==========================================

use crate::domain::cell::{trim_trailing_empty, CellValue, Sheet, Workbook};
use crate::importer::error::{UploadError, UploadResult};
use async_trait::async_trait;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// SheetDecoder Trait
// ==========================================
// 用途: 解码接口（同步,由编排器放到阻塞线程池执行）
// 实现者: CalamineDecoder, CsvDecoder
pub trait SheetDecoder: Send + Sync {
    /// 解码器名称（用于日志与加载失败通知）
    fn name(&self) -> &str;

    /// 解析二进制为工作簿
    ///
    /// # 返回
    /// - Ok(Workbook): 工作簿（可能不含工作表,由提取阶段判定）
    /// - Err(Format): 无法识别为结构化表格
    fn decode(&self, bytes: &[u8]) -> UploadResult<Workbook>;
}

// ==========================================
// SheetDecoderProvider Trait
// ==========================================
// 用途: 显式初始化解码能力,产出可复用的解码器句柄
#[async_trait]
pub trait SheetDecoderProvider: Send + Sync {
    fn name(&self) -> &str;

    /// 加载解码器
    ///
    /// # 返回
    /// - Ok(Arc<dyn SheetDecoder>): 就绪的解码器
    /// - Err(LibraryLoad): 解码能力不可用
    async fn load(&self) -> UploadResult<Arc<dyn SheetDecoder>>;
}

// ==========================================
// 解码器类型（配置项 upload.decoder）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderKind {
    #[default]
    Workbook,
    Csv,
}

impl DecoderKind {
    pub fn as_str(&self) -> &str {
        match self {
            DecoderKind::Workbook => "workbook",
            DecoderKind::Csv => "csv",
        }
    }

    /// 对应的解码器提供者
    pub fn provider(&self) -> Arc<dyn SheetDecoderProvider> {
        match self {
            DecoderKind::Workbook => Arc::new(CalamineDecoderProvider),
            DecoderKind::Csv => Arc::new(CsvDecoderProvider),
        }
    }
}

impl FromStr for DecoderKind {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "workbook" | "excel" | "xlsx" => Ok(DecoderKind::Workbook),
            "csv" => Ok(DecoderKind::Csv),
            other => Err(UploadError::Config {
                key: "upload.decoder".to_string(),
                message: format!("unknown decoder '{}' (expected workbook/csv)", other),
            }),
        }
    }
}

// ==========================================
// Calamine 解码器
// ==========================================
pub struct CalamineDecoder;

impl CalamineDecoder {
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Boolean(*b),
            // 日期按 Excel 序列号保留为数值
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
            Data::Empty => CellValue::Empty,
        }
    }
}

impl SheetDecoder for CalamineDecoder {
    fn name(&self) -> &str {
        "calamine"
    }

    fn decode(&self, bytes: &[u8]) -> UploadResult<Workbook> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| {
            debug!(error = %e, "工作簿格式识别失败");
            UploadError::Format("Cannot read Excel File (incorrect file format?)".to_string())
        })?;

        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name)?;

            // 列号相对已用区域起点: 数据从 B 列开始时,B 列即第一个字段
            let rows = range
                .rows()
                .map(|row| trim_trailing_empty(row.iter().map(Self::convert_cell).collect()))
                .collect::<Vec<_>>();

            debug!(sheet = %sheet_name, rows = rows.len(), "工作表解码完成");
            sheets.push(Sheet::new(sheet_name, rows));
        }

        Ok(Workbook::new(sheets))
    }
}

pub struct CalamineDecoderProvider;

#[async_trait]
impl SheetDecoderProvider for CalamineDecoderProvider {
    fn name(&self) -> &str {
        "calamine"
    }

    async fn load(&self) -> UploadResult<Arc<dyn SheetDecoder>> {
        Ok(Arc::new(CalamineDecoder))
    }
}

// ==========================================
// CSV 解码器
// ==========================================
pub struct CsvDecoder;

/// CSV 没有工作表名,统一使用该名称
pub const CSV_SHEET_NAME: &str = "Sheet1";

impl SheetDecoder for CsvDecoder {
    fn name(&self) -> &str {
        "csv"
    }

    fn decode(&self, bytes: &[u8]) -> UploadResult<Workbook> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false) // 表头由提取阶段跳过
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let cells = record.iter().map(CellValue::infer).collect::<Vec<_>>();
            rows.push(trim_trailing_empty(cells));
        }

        debug!(rows = rows.len(), "CSV 解码完成");
        Ok(Workbook::new(vec![Sheet::new(CSV_SHEET_NAME, rows)]))
    }
}

pub struct CsvDecoderProvider;

#[async_trait]
impl SheetDecoderProvider for CsvDecoderProvider {
    fn name(&self) -> &str {
        "csv"
    }

    async fn load(&self) -> UploadResult<Arc<dyn SheetDecoder>> {
        Ok(Arc::new(CsvDecoder))
    }
}
