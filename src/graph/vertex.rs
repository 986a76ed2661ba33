//! 顶点定义
//!
//! 以名称为真正主键的图节点（对象）

use crate::types::{ComponentLabel, EdgeSlot, UNASSIGNED};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// 顶点 ID（导入顺序序号，不保证唯一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u64);

impl VertexId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VertexId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 顶点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// 顶点 ID
    id: VertexId,
    /// 名称（已去除首尾空白）
    name: String,
    /// 连通分量标签
    component: ComponentLabel,
    /// 关联边在边集合中的位置，只由 binder 维护
    #[serde(skip)]
    incident: SmallVec<[EdgeSlot; 4]>,
}

impl Vertex {
    /// 创建新顶点
    pub fn new(id: VertexId, name: &str) -> Self {
        Self {
            id,
            name: name.trim().to_string(),
            component: UNASSIGNED,
            incident: SmallVec::new(),
        }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component(&self) -> ComponentLabel {
        self.component
    }

    pub(crate) fn set_component(&mut self, label: ComponentLabel) {
        self.component = label;
    }

    /// 关联边（插入顺序）
    pub fn incident(&self) -> &[EdgeSlot] {
        &self.incident
    }

    pub fn degree(&self) -> usize {
        self.incident.len()
    }

    /// 追加一条关联边，不做去重
    pub fn attach_edge(&mut self, edge: EdgeSlot) {
        self.incident.push(edge);
    }

    /// 清空关联边，保留标签
    pub(crate) fn clear_incident(&mut self) {
        self.incident.clear();
    }

    /// 清空关联边并重置标签
    pub(crate) fn detach(&mut self) {
        self.clear_incident();
        self.component = UNASSIGNED;
    }
}
