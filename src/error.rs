//! 错误类型定义
//!
//! `Error` 是 I/O 层的致命错误；`Issue` 是逐条记录的非致命问题，
//! 由导入流程收集后交给调用方展示。

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV 错误: {0}")]
    CsvError(#[from] csv::Error),

    #[error("未找到表头 \"{0}\"")]
    SectionNotFound(String),

    #[error("不支持的文件格式: {0}")]
    UnsupportedFormat(String),

    #[error("导入错误: {0}")]
    ImportError(String),

    #[error("序列化错误: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

/// 单条记录被拒绝的原因
///
/// `line` 为源文件中的行号（从 1 开始），单独创建时为 `None`。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    #[error("对象已存在: {name}{}", at_line(.line))]
    DuplicateVertex { name: String, line: Option<usize> },

    #[error("链接已存在: {left}<->{right}{}", at_line(.line))]
    DuplicateEdge {
        left: String,
        right: String,
        line: Option<usize>,
    },

    #[error("无法解析为链接 (第 {line} 行): {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("对象名称为空{}", at_line(.line))]
    BlankName { line: Option<usize> },
}

impl Issue {
    /// 问题所在行号
    pub fn line(&self) -> Option<usize> {
        match self {
            Issue::DuplicateVertex { line, .. }
            | Issue::DuplicateEdge { line, .. }
            | Issue::BlankName { line } => *line,
            Issue::MalformedLine { line, .. } => Some(*line),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Issue::DuplicateVertex { .. } | Issue::DuplicateEdge { .. }
        )
    }

    pub(crate) fn with_line(mut self, n: usize) -> Self {
        match &mut self {
            Issue::DuplicateVertex { line, .. }
            | Issue::DuplicateEdge { line, .. }
            | Issue::BlankName { line } => *line = Some(n),
            Issue::MalformedLine { line, .. } => *line = n,
        }
        self
    }
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" (第 {} 行)", n),
        None => String::new(),
    }
}
