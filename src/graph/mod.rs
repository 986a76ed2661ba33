//! 图核心模块
//!
//! 定义顶点、边、绑定逻辑和图存储

pub mod binder;
mod edge;
mod store;
mod vertex;

use indexmap::IndexMap;

pub use edge::{parse_link, Edge, EdgeId, Endpoint, LinkKey};
pub use store::{ApplyReport, GraphDelta, GraphStore};
pub use vertex::{Vertex, VertexId};

/// 顶点集合：按名称索引，保持插入顺序
pub type VertexArena = IndexMap<String, Vertex>;

/// 边集合：按无序名称对索引，保持插入顺序
pub type EdgeArena = IndexMap<LinkKey, Edge>;
