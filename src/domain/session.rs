// ==========================================
// Excel 批量上传 - 上传会话状态
// ==========================================
// 职责: 上传步骤状态机定义、进度快照
// 状态流转: Idle → Reading → Extracting → Inserting → Done → Idle
//           任一非终态 → Error
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 步骤提示文本
pub mod step_messages {
    pub const READING: &str = "Reading File";
    pub const EXTRACTING: &str = "Extracting Data";
    pub const INSERTING: &str = "Inserting Records";
    pub const DONE: &str = "Done";
}

// ==========================================
// 上传步骤 (Upload Step)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStep {
    Idle,       // 空闲（初始/复位）
    Reading,    // 读取文件
    Extracting, // 提取数据
    Inserting,  // 写入记录
    Done,       // 完成（等待关闭）
    Error,      // 失败（本次运行终止）
}

impl UploadStep {
    /// 进度条上的序号（Idle=0 … Done=4）,Error 不在进度条上
    pub fn progress_index(&self) -> Option<u8> {
        match self {
            UploadStep::Idle => Some(0),
            UploadStep::Reading => Some(1),
            UploadStep::Extracting => Some(2),
            UploadStep::Inserting => Some(3),
            UploadStep::Done => Some(4),
            UploadStep::Error => None,
        }
    }

    /// 状态转换是否合法
    ///
    /// - 只能按顺序前进一步
    /// - Done 只能回到 Idle
    /// - 非终态可直接跳到 Error
    /// - Error 之后只能由新的运行从 Idle 重新开始
    pub fn can_advance_to(&self, next: UploadStep) -> bool {
        use UploadStep::*;
        match (self, next) {
            (Idle, Reading)
            | (Reading, Extracting)
            | (Extracting, Inserting)
            | (Inserting, Done)
            | (Done, Idle) => true,
            (Idle | Reading | Extracting | Inserting, Error) => true,
            _ => false,
        }
    }

    /// Done / Error 为单次运行的终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStep::Done | UploadStep::Error)
    }

    /// 进度条展示的有序步骤
    pub fn progress_steps() -> [UploadStep; 4] {
        [
            UploadStep::Reading,
            UploadStep::Extracting,
            UploadStep::Inserting,
            UploadStep::Done,
        ]
    }
}

impl fmt::Display for UploadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStep::Idle => write!(f, "IDLE"),
            UploadStep::Reading => write!(f, "READING"),
            UploadStep::Extracting => write!(f, "EXTRACTING"),
            UploadStep::Inserting => write!(f, "INSERTING"),
            UploadStep::Done => write!(f, "DONE"),
            UploadStep::Error => write!(f, "ERROR"),
        }
    }
}

// ==========================================
// 进度快照 (Upload Snapshot)
// ==========================================

/// 某次运行在某一时刻的只读状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSnapshot {
    /// 运行 ID（区分并发运行）
    pub run_id: String,
    /// 当前步骤
    pub step: UploadStep,
    /// 展示文本
    pub message: String,
    /// 是否处于错误状态
    pub error: bool,
    /// 是否已完成（Done）
    pub done: bool,
    /// 已提取的记录数
    pub record_count: usize,
    /// 已打勾的步骤（当前步骤之前的步骤;Done 自身不打勾）
    pub completed_steps: Vec<UploadStep>,
    /// 快照时间
    pub updated_at: DateTime<Utc>,
}

impl UploadSnapshot {
    pub fn new(run_id: &str, step: UploadStep, message: &str, error: bool, record_count: usize) -> Self {
        Self {
            run_id: run_id.to_string(),
            step,
            message: message.to_string(),
            error,
            done: step == UploadStep::Done,
            record_count,
            completed_steps: Self::completed_before(step),
            updated_at: Utc::now(),
        }
    }

    /// 模态框是否可见（Idle 即关闭）
    pub fn is_visible(&self) -> bool {
        self.step != UploadStep::Idle
    }

    fn completed_before(step: UploadStep) -> Vec<UploadStep> {
        let Some(current) = step.progress_index() else {
            return Vec::new();
        };
        UploadStep::progress_steps()
            .into_iter()
            .filter(|s| s.progress_index().map(|i| i < current).unwrap_or(false))
            .collect()
    }
}
