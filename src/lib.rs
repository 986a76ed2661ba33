//! LinkGraph - 无向图连通分量分析
//!
//! 以对象名称构建无向图并标记连通分量，支持：
//! - 对象与链接的去重、增删和自动绑定
//! - 广度优先的连通分量标记
//! - 纯文本和 CSV 格式的导入、列表保存与分析报告
//! - 交互式控制台

pub mod algorithm;
pub mod cli;
pub mod error;
pub mod graph;
pub mod import;
pub mod metrics;
pub mod report;
pub mod types;

// 重导出常用类型
pub use algorithm::{Component, Connectivity, ConnectivityAnalyzer};
pub use error::{Error, Issue, Result};
pub use graph::{Edge, EdgeId, GraphDelta, GraphStore, Vertex, VertexId};
pub use import::{ImportConfig, ImportStats, Importer};
pub use report::{ReportConfig, ReportWriter};
pub use types::{ComponentLabel, FileFormat, ImportMode};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
