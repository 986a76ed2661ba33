//! 边定义
//!
//! 无向链接：两个端点按名称引用顶点，端点顺序仅用于展示

use crate::error::Issue;
use crate::types::{ComponentLabel, VertexSlot, EDGE_SEPARATOR, UNASSIGNED};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 边 ID（创建顺序序号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 无序名称对，两条边相同当且仅当其名称集合相同
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkKey(String, String);

impl LinkKey {
    pub fn new(left: &str, right: &str) -> Self {
        let (left, right) = (left.trim(), right.trim());
        if left <= right {
            Self(left.to_string(), right.to_string())
        } else {
            Self(right.to_string(), left.to_string())
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0 == name || self.1 == name
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.0, EDGE_SEPARATOR, self.1)
    }
}

/// 边的端点
///
/// `slot` 为 `None` 时是游离占位顶点：只携带名称和自己的标签，
/// 不属于任何存储的顶点集合。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    name: String,
    slot: Option<VertexSlot>,
    component: ComponentLabel,
}

impl Endpoint {
    /// 创建占位端点
    pub fn placeholder(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            slot: None,
            component: UNASSIGNED,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 绑定到的顶点位置
    pub fn slot(&self) -> Option<VertexSlot> {
        self.slot
    }

    pub fn is_placeholder(&self) -> bool {
        self.slot.is_none()
    }

    /// 占位端点自身的标签；已绑定端点的标签以顶点为准
    pub fn component(&self) -> ComponentLabel {
        self.component
    }

    pub(crate) fn bind(&mut self, slot: VertexSlot) {
        self.slot = Some(slot);
        self.component = UNASSIGNED;
    }

    pub(crate) fn set_component(&mut self, label: ComponentLabel) {
        self.component = label;
    }
}

/// 边
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// 边 ID
    id: EdgeId,
    /// 两个端点，保持创建时的顺序
    endpoints: [Endpoint; 2],
    /// 连通分量标签
    component: ComponentLabel,
}

impl Edge {
    /// 创建新边，两个端点都是占位端点，等待 binder 绑定
    pub fn new(left: &str, right: &str, id: EdgeId) -> Self {
        Self {
            id,
            endpoints: [Endpoint::placeholder(left), Endpoint::placeholder(right)],
            component: UNASSIGNED,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn left(&self) -> &Endpoint {
        &self.endpoints[0]
    }

    pub fn right(&self) -> &Endpoint {
        &self.endpoints[1]
    }

    pub fn endpoints(&self) -> &[Endpoint; 2] {
        &self.endpoints
    }

    pub(crate) fn endpoints_mut(&mut self) -> &mut [Endpoint; 2] {
        &mut self.endpoints
    }

    pub fn component(&self) -> ComponentLabel {
        self.component
    }

    pub(crate) fn set_component(&mut self, label: ComponentLabel) {
        self.component = label;
    }

    pub fn link_key(&self) -> LinkKey {
        LinkKey::new(self.left().name(), self.right().name())
    }

    /// 唯一的去重判据：名称集合 {left, right} 相同即为同一链接
    pub fn is_same_link(&self, left: &str, right: &str) -> bool {
        let (left, right) = (left.trim(), right.trim());
        let (a, b) = (self.left().name(), self.right().name());
        (a == left && b == right) || (a == right && b == left)
    }

    pub fn same_link_as(&self, other: &Edge) -> bool {
        self.is_same_link(other.left().name(), other.right().name())
    }

    pub fn touches(&self, name: &str) -> bool {
        self.left().name() == name || self.right().name() == name
    }

    /// 两端替换为新的占位端点并重置标签
    pub(crate) fn detach(&mut self) {
        let [left, right] = &self.endpoints;
        self.endpoints = [
            Endpoint::placeholder(left.name()),
            Endpoint::placeholder(right.name()),
        ];
        self.component = UNASSIGNED;
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.left().name(),
            EDGE_SEPARATOR,
            self.right().name()
        )
    }
}

/// 解析一行链接文本 `left<->right`
///
/// 必须恰好分成两个非空部分，否则返回 `MalformedLine`。
pub fn parse_link(line_no: usize, line: &str) -> Result<(String, String), Issue> {
    let parts: Vec<&str> = line.split(EDGE_SEPARATOR).map(str::trim).collect();
    match parts.as_slice() {
        [left, right] if !left.is_empty() && !right.is_empty() => {
            Ok((left.to_string(), right.to_string()))
        }
        _ => Err(Issue::MalformedLine {
            line: line_no,
            content: line.to_string(),
        }),
    }
}
