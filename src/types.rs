//! 通用类型定义

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// 连通分量标签，0 表示尚未分析
pub type ComponentLabel = u32;

/// 未分配的连通分量标签
pub const UNASSIGNED: ComponentLabel = 0;

/// 顶点在存储中的位置（插入顺序下标）
pub type VertexSlot = usize;

/// 边在存储中的位置（插入顺序下标）
pub type EdgeSlot = usize;

/// 链接文本格式中的分隔符
pub const EDGE_SEPARATOR: &str = "<->";

/// 报告中标签前的分隔符
pub const LABEL_SEPARATOR: &str = " : ";

/// 导入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImportMode {
    /// 先清空对应集合再导入
    Replace,
    /// 追加到已有数据
    #[default]
    Append,
}

impl ImportMode {
    pub fn as_str(&self) -> &str {
        match self {
            ImportMode::Replace => "replace",
            ImportMode::Append => "append",
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImportMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "replace" | "load" | "reload" => Ok(ImportMode::Replace),
            "append" | "add" => Ok(ImportMode::Append),
            other => Err(crate::Error::ImportError(format!("未知的导入模式: {}", other))),
        }
    }
}

/// 数据文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    /// 按行的纯文本
    Text,
    /// 带表头单元格的表格
    Csv,
}

impl FileFormat {
    /// 按扩展名判断格式
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
            .map_err(|_| crate::Error::UnsupportedFormat(path.display().to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            FileFormat::Text => "txt",
            FileFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(FileFormat::Text),
            "csv" => Ok(FileFormat::Csv),
            other => Err(crate::Error::UnsupportedFormat(other.to_string())),
        }
    }
}
