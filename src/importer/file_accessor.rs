// ==========================================
// Excel 批量上传 - 文件读取
// ==========================================
// 阶段: Reading
// 职责: 校验恰好选择了一个文件,异步读取为二进制
// ==========================================

use crate::importer::error::{UploadError, UploadResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 用户的一次文件选择
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    files: Vec<PathBuf>,
}

impl FileSelection {
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    pub fn single(file: impl Into<PathBuf>) -> Self {
        Self {
            files: vec![file.into()],
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// 取出唯一文件
    ///
    /// # 返回
    /// - Ok(&Path): 恰好一个文件
    /// - Err(FileSelection): 0 个或多个文件
    pub fn require_single(&self) -> UploadResult<&Path> {
        match self.files.as_slice() {
            [file] => Ok(file.as_path()),
            [] => Err(UploadError::FileSelection(
                "Error accessing file -- No file received".to_string(),
            )),
            _ => Err(UploadError::FileSelection(
                "Error accessing file -- Multiple files received".to_string(),
            )),
        }
    }
}

/// 文件读取器
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAccessor;

impl FileAccessor {
    /// 读取所选文件的全部字节
    ///
    /// 选择校验在任何 I/O 之前完成
    pub async fn read_binary(&self, selection: &FileSelection) -> UploadResult<Vec<u8>> {
        let path = selection.require_single()?;

        debug!(path = %path.display(), "读取上传文件");
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            UploadError::FileRead(format!("{}: {}", path.display(), e))
        })?;
        debug!(bytes = bytes.len(), "文件读取完成");

        Ok(bytes)
    }
}
