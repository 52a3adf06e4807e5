// ==========================================
// Excel 批量上传 - 单元格与工作簿模型
// ==========================================
// 职责: 解码边界上的封闭单元格类型、工作表网格、提取记录
// 红线: 单元格类型在解码时确定,不做运行时类型探测
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
// JSON 形态: 文本 → string, 数值 → number, 布尔 → bool, 空 → null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Empty,
}

impl CellValue {
    /// 按类型规范化单元格
    ///
    /// - Text: 去除首尾空白
    /// - Number / Boolean / Empty: 原样返回
    pub fn normalized(self) -> CellValue {
        match self {
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.len() == s.len() {
                    CellValue::Text(s)
                } else {
                    CellValue::Text(trimmed.to_string())
                }
            }
            other => other,
        }
    }

    /// 从纯文本推断单元格类型（CSV 等无类型来源）
    ///
    /// 文本保持原样（不 trim），由提取阶段统一规范化。
    /// 带前导零的数字串（如 "00123"）保留为文本,不丢失编号/邮编中的零
    pub fn infer(raw: &str) -> CellValue {
        if raw.is_empty() {
            return CellValue::Empty;
        }

        let probe = raw.trim();
        if probe.eq_ignore_ascii_case("true") {
            return CellValue::Boolean(true);
        }
        if probe.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(false);
        }
        if !probe.is_empty() && !Self::has_leading_zero(probe) {
            if let Ok(n) = probe.parse::<f64>() {
                if n.is_finite() {
                    return CellValue::Number(n);
                }
            }
        }

        CellValue::Text(raw.to_string())
    }

    /// "0123" / "-007" 之类: 整数部分以 0 开头且后面还有数字
    fn has_leading_zero(raw: &str) -> bool {
        let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
        let mut chars = digits.chars();
        chars.next() == Some('0') && chars.next().is_some_and(|c| c.is_ascii_digit())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

/// 去掉行尾连续的空单元格
///
/// 空白行因此变为长度 0,与"行只包含到最后一个有值列"的网格形态一致
pub fn trim_trailing_empty(mut row: Vec<CellValue>) -> Vec<CellValue> {
    while matches!(row.last(), Some(CellValue::Empty)) {
        row.pop();
    }
    row
}

// ==========================================
// 工作表 / 工作簿
// ==========================================

/// 单个工作表（按行排列的二维单元格网格）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// 解码后的工作簿
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }
}

// ==========================================
// 提取记录 (Record)
// ==========================================

/// 一条规范化后的非空数据行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// 源工作表中的行索引（0 起,表头为 0,因此恒 ≥ 1）
    pub row_number: usize,
    pub values: Vec<CellValue>,
}

impl Record {
    pub fn new(row_number: usize, values: Vec<CellValue>) -> Self {
        Self { row_number, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_trims_text_only() {
        assert_eq!(
            CellValue::from("  Alice ").normalized(),
            CellValue::Text("Alice".to_string())
        );
        assert_eq!(CellValue::Number(30.0).normalized(), CellValue::Number(30.0));
        assert_eq!(CellValue::Boolean(true).normalized(), CellValue::Boolean(true));
        assert_eq!(CellValue::Empty.normalized(), CellValue::Empty);
    }

    #[test]
    fn test_normalized_is_idempotent() {
        let samples = vec![
            CellValue::from("\t x y \n"),
            CellValue::from("   "),
            CellValue::Number(-1.5),
            CellValue::Empty,
        ];
        for cell in samples {
            let once = cell.clone().normalized();
            let twice = once.clone().normalized();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_infer() {
        assert_eq!(CellValue::infer(""), CellValue::Empty);
        assert_eq!(CellValue::infer("TRUE"), CellValue::Boolean(true));
        assert_eq!(CellValue::infer("false"), CellValue::Boolean(false));
        assert_eq!(CellValue::infer("25"), CellValue::Number(25.0));
        assert_eq!(CellValue::infer(" 2.5 "), CellValue::Number(2.5));
        assert_eq!(CellValue::infer(" Bob "), CellValue::Text(" Bob ".to_string()));
        assert_eq!(CellValue::infer("NaN"), CellValue::Text("NaN".to_string()));
    }

    #[test]
    fn test_infer_keeps_leading_zeros_as_text() {
        assert_eq!(CellValue::infer("00123"), CellValue::Text("00123".to_string()));
        assert_eq!(CellValue::infer("-007"), CellValue::Text("-007".to_string()));
        assert_eq!(CellValue::infer("0"), CellValue::Number(0.0));
        assert_eq!(CellValue::infer("0.5"), CellValue::Number(0.5));
        assert_eq!(CellValue::infer("-0.25"), CellValue::Number(-0.25));
    }

    #[test]
    fn test_trim_trailing_empty() {
        let row = vec![CellValue::from("a"), CellValue::Empty, CellValue::from("b"), CellValue::Empty];
        assert_eq!(
            trim_trailing_empty(row),
            vec![CellValue::from("a"), CellValue::Empty, CellValue::from("b")]
        );
        assert!(trim_trailing_empty(vec![CellValue::Empty, CellValue::Empty]).is_empty());
    }

    #[test]
    fn test_json_shape() {
        let values = vec![
            CellValue::from("Alice"),
            CellValue::Number(30.0),
            CellValue::Boolean(false),
            CellValue::Empty,
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"["Alice",30.0,false,null]"#);
    }
}
