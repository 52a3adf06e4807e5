// ==========================================
// Excel 批量上传 - 记录提取
// ==========================================
// 阶段: Extracting
// 规则: 仅第一个工作表;跳过第 0 行(表头);跳过长度为 0 的行;
//       文本单元格去首尾空白,其它类型原样保留
// ==========================================

use crate::domain::cell::{Record, Workbook};
use crate::importer::error::{UploadError, UploadResult};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordExtractor {
    /// 无数据行时是否报错（默认: 不报错,提交空批次）
    require_rows: bool,
}

impl RecordExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_require_rows(mut self, require_rows: bool) -> Self {
        self.require_rows = require_rows;
        self
    }

    /// 从工作簿提取记录
    ///
    /// # 返回
    /// - Ok(Vec<Record>): 按行顺序排列的规范化记录
    /// - Err(Format): 工作簿无工作表;或 require_rows 时无数据行
    pub fn extract(&self, workbook: &Workbook) -> UploadResult<Vec<Record>> {
        let sheet = workbook.first_sheet().ok_or_else(|| {
            UploadError::Format("Excel file does not contain any sheets".to_string())
        })?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (row_idx, row) in sheet.rows.iter().enumerate().skip(1) {
            // 空行不生成记录
            if row.is_empty() {
                skipped += 1;
                continue;
            }

            let values = row.iter().cloned().map(|cell| cell.normalized()).collect();
            records.push(Record::new(row_idx, values));
        }

        debug!(sheet = %sheet.name, skipped_rows = skipped, "跳过空行");
        info!(sheet = %sheet.name, records = records.len(), "记录提取完成");

        if self.require_rows && records.is_empty() {
            return Err(UploadError::Format(
                "Excel file does not contain any data rows".to_string(),
            ));
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::{CellValue, Sheet};

    fn workbook(rows: Vec<Vec<CellValue>>) -> Workbook {
        Workbook::new(vec![Sheet::new("Sheet1", rows)])
    }

    #[test]
    fn test_extract_reference_example() {
        // [["Name","Age"],["  Alice ",30],[],["Bob",25]]
        let wb = workbook(vec![
            vec!["Name".into(), "Age".into()],
            vec!["  Alice ".into(), 30.0.into()],
            vec![],
            vec!["Bob".into(), 25.0.into()],
        ]);

        let records = RecordExtractor::new().extract(&wb).unwrap();
        let values: Vec<Vec<CellValue>> = records.iter().map(|r| r.values.clone()).collect();
        assert_eq!(
            values,
            vec![
                vec![CellValue::from("Alice"), CellValue::Number(30.0)],
                vec![CellValue::from("Bob"), CellValue::Number(25.0)],
            ]
        );
        assert_eq!(records[0].row_number, 1);
        assert_eq!(records[1].row_number, 3);
    }

    #[test]
    fn test_non_text_cells_pass_through() {
        let wb = workbook(vec![
            vec!["A".into(), "B".into(), "C".into()],
            vec![CellValue::Boolean(false), CellValue::Empty, " x".into()],
        ]);
        let records = RecordExtractor::new().extract(&wb).unwrap();
        assert_eq!(
            records[0].values,
            vec![CellValue::Boolean(false), CellValue::Empty, CellValue::from("x")]
        );
    }

    #[test]
    fn test_only_first_sheet_is_used() {
        let wb = Workbook::new(vec![
            Sheet::new("First", vec![vec!["H".into()], vec!["one".into()]]),
            Sheet::new("Second", vec![vec!["H".into()], vec!["two".into()], vec!["three".into()]]),
        ]);
        let records = RecordExtractor::new().extract(&wb).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].values, vec![CellValue::from("one")]);
    }

    #[test]
    fn test_no_sheets_is_format_error() {
        let err = RecordExtractor::new().extract(&Workbook::default()).unwrap_err();
        assert!(matches!(err, UploadError::Format(_)));
        assert_eq!(err.to_string(), "Excel file does not contain any sheets");
    }

    #[test]
    fn test_header_only_yields_empty_batch() {
        let wb = workbook(vec![vec!["Name".into(), "Age".into()]]);
        assert!(RecordExtractor::new().extract(&wb).unwrap().is_empty());

        let empty = workbook(vec![]);
        assert!(RecordExtractor::new().extract(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_require_rows_rejects_header_only() {
        let wb = workbook(vec![vec!["Name".into()], vec![]]);
        let err = RecordExtractor::new()
            .with_require_rows(true)
            .extract(&wb)
            .unwrap_err();
        assert_eq!(err.to_string(), "Excel file does not contain any data rows");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let wb = workbook(vec![
            vec!["H".into()],
            vec!["  a  ".into(), 1.0.into()],
            vec![" b".into()],
        ]);
        let first = RecordExtractor::new().extract(&wb).unwrap();

        // 已规范化的输出再提取一次结果不变
        let mut rows = vec![vec![CellValue::from("H")]];
        rows.extend(first.iter().map(|r| r.values.clone()));
        let second = RecordExtractor::new().extract(&workbook(rows)).unwrap();

        let a: Vec<_> = first.iter().map(|r| &r.values).collect();
        let b: Vec<_> = second.iter().map(|r| &r.values).collect();
        assert_eq!(a, b);
    }
}
