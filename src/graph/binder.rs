//! 绑定与解绑
//!
//! 边端点按名称解析到顶点集合中的位置，顶点的关联边列表从边集合整体重建。
//! 任何结构性修改都必须遵循 `unbind → 修改 → bind`，`GraphStore::apply`
//! 在内部保证这一顺序。

use super::{EdgeArena, VertexArena};
use tracing::debug;

/// 把边端点绑定到同名顶点，并重建所有顶点的关联边列表
///
/// 没有同名顶点的端点保持为占位端点。重复调用不会重复挂接同一链接。
pub fn bind(vertices: &mut VertexArena, edges: &mut EdgeArena) {
    for edge in edges.values_mut() {
        let id = edge.id();
        for end in edge.endpoints_mut().iter_mut() {
            match vertices.get_index_of(end.name()) {
                Some(slot) => end.bind(slot),
                None => debug!(edge = %id, name = end.name(), "端点没有对应的对象，保留占位"),
            }
        }
    }

    for vertex in vertices.values_mut() {
        vertex.clear_incident();
    }

    // 边集合按链接去重，同一顶点上只有自环的两端会落到同一链接，
    // 且总是紧挨着挂接，只需比较最后一条
    for (edge_slot, (_, edge)) in edges.iter().enumerate() {
        for end in edge.endpoints() {
            let Some(vertex_slot) = end.slot() else {
                continue;
            };
            let Some((_, vertex)) = vertices.get_index_mut(vertex_slot) else {
                continue;
            };
            let attached = vertex
                .incident()
                .last()
                .and_then(|&s| edges.get_index(s))
                .map_or(false, |(_, other)| other.same_link_as(edge));
            if !attached {
                vertex.attach_edge(edge_slot);
            }
        }
    }
}

/// 解除所有绑定：端点换成新的占位端点，关联边清空，标签归零
pub fn unbind(vertices: &mut VertexArena, edges: &mut EdgeArena) {
    for edge in edges.values_mut() {
        edge.detach();
    }
    for vertex in vertices.values_mut() {
        vertex.detach();
    }
}
