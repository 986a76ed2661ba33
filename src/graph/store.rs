//! 图存储
//!
//! 持有顶点集合和边集合，保证名称唯一、链接唯一。
//! 所有结构性修改都通过 `apply` 完成：先解绑，再修改，最后重新绑定。

use super::binder;
use super::edge::{parse_link, Edge, EdgeId, LinkKey};
use super::vertex::{Vertex, VertexId};
use super::{EdgeArena, VertexArena};
use crate::algorithm::{Connectivity, ConnectivityAnalyzer};
use crate::error::Issue;
use crate::metrics::Metrics;
use crate::types::ImportMode;
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// 一次结构性修改的内容
///
/// 执行顺序固定：清空 → 删除 → 插入顶点 → 插入边。
#[derive(Debug, Default, Clone)]
pub struct GraphDelta {
    clear_vertices: bool,
    clear_edges: bool,
    removed_vertices: Vec<String>,
    removed_edges: Vec<(String, String)>,
    vertices: Vec<(Option<usize>, String)>,
    edges: Vec<(Option<usize>, String, String)>,
    rejected: Vec<Issue>,
}

impl GraphDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_vertices(mut self) -> Self {
        self.clear_vertices = true;
        self
    }

    pub fn clear_edges(mut self) -> Self {
        self.clear_edges = true;
        self
    }

    pub fn remove_vertex(mut self, name: &str) -> Self {
        self.removed_vertices.push(name.trim().to_string());
        self
    }

    pub fn remove_edge(mut self, left: &str, right: &str) -> Self {
        self.removed_edges
            .push((left.trim().to_string(), right.trim().to_string()));
        self
    }

    pub fn insert_vertex(mut self, name: &str) -> Self {
        self.vertices.push((None, name.to_string()));
        self
    }

    /// 插入顶点，并记录其在源文件中的行号
    pub fn insert_vertex_at(mut self, line: usize, name: &str) -> Self {
        self.vertices.push((Some(line), name.to_string()));
        self
    }

    pub fn insert_edge(mut self, left: &str, right: &str) -> Self {
        self.edges.push((None, left.to_string(), right.to_string()));
        self
    }

    pub fn insert_edge_at(mut self, line: usize, left: &str, right: &str) -> Self {
        self.edges
            .push((Some(line), left.to_string(), right.to_string()));
        self
    }

    /// 记录一个在解析阶段就被拒绝的记录
    pub fn reject(mut self, issue: Issue) -> Self {
        self.rejected.push(issue);
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.clear_vertices
            && !self.clear_edges
            && self.removed_vertices.is_empty()
            && self.removed_edges.is_empty()
            && self.vertices.is_empty()
            && self.edges.is_empty()
            && self.rejected.is_empty()
    }
}

/// `apply` 的执行结果
#[derive(Debug, Default, Clone)]
pub struct ApplyReport {
    pub vertices_added: Vec<VertexId>,
    pub edges_added: Vec<EdgeId>,
    pub vertices_removed: usize,
    pub edges_removed: usize,
    /// 被跳过的记录，按行号排序
    pub issues: Vec<Issue>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// 图存储
#[derive(Debug, Default)]
pub struct GraphStore {
    vertices: VertexArena,
    edges: EdgeArena,
    metrics: Metrics,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 结构性修改 ====================

    /// 原子地执行一次修改：unbind → 修改 → bind
    pub fn apply(&mut self, delta: GraphDelta) -> ApplyReport {
        binder::unbind(&mut self.vertices, &mut self.edges);

        let mut report = ApplyReport {
            issues: delta.rejected,
            ..Default::default()
        };

        if delta.clear_edges {
            report.edges_removed += self.edges.len();
            self.edges.clear();
        }
        if delta.clear_vertices {
            report.vertices_removed += self.vertices.len();
            self.vertices.clear();
        }

        for name in &delta.removed_vertices {
            if self.vertices.shift_remove(name.as_str()).is_some() {
                report.vertices_removed += 1;
            }
        }
        for (left, right) in &delta.removed_edges {
            if self.edges.shift_remove(&LinkKey::new(left, right)).is_some() {
                report.edges_removed += 1;
            }
        }

        for (line, name) in delta.vertices {
            match self.push_vertex(&name) {
                Ok(id) => report.vertices_added.push(id),
                Err(issue) => report.issues.push(with_line(issue, line)),
            }
        }
        for (line, left, right) in delta.edges {
            match self.push_edge(&left, &right) {
                Ok(id) => report.edges_added.push(id),
                Err(issue) => report.issues.push(with_line(issue, line)),
            }
        }

        binder::bind(&mut self.vertices, &mut self.edges);

        report
            .issues
            .sort_by_key(|issue| issue.line().unwrap_or(usize::MAX));
        for issue in &report.issues {
            warn!(%issue, "记录已跳过");
            self.metrics.record_issue(issue);
        }
        self.metrics.record_vertex_insert(report.vertices_added.len());
        self.metrics.record_edge_insert(report.edges_added.len());
        self.metrics
            .record_removal(report.vertices_removed, report.edges_removed);

        debug!(
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            "图结构已更新"
        );
        report
    }

    fn push_vertex(&mut self, name: &str) -> Result<VertexId, Issue> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Issue::BlankName { line: None });
        }
        if self.vertices.contains_key(name) {
            return Err(Issue::DuplicateVertex {
                name: name.to_string(),
                line: None,
            });
        }

        let id = VertexId::new(self.vertices.len() as u64 + 1);
        self.vertices.insert(name.to_string(), Vertex::new(id, name));
        Ok(id)
    }

    fn push_edge(&mut self, left: &str, right: &str) -> Result<EdgeId, Issue> {
        let (left, right) = (left.trim(), right.trim());
        if left.is_empty() || right.is_empty() {
            return Err(Issue::BlankName { line: None });
        }
        let key = LinkKey::new(left, right);
        if self.edges.contains_key(&key) {
            return Err(Issue::DuplicateEdge {
                left: left.to_string(),
                right: right.to_string(),
                line: None,
            });
        }

        let id = EdgeId::new(self.edges.len() as u64 + 1);
        self.edges.insert(key, Edge::new(left, right, id));
        Ok(id)
    }

    /// 创建单个顶点，名称重复时返回 `DuplicateVertex`
    pub fn insert_vertex(&mut self, name: &str) -> Result<VertexId, Issue> {
        let report = self.apply(GraphDelta::new().insert_vertex(name));
        match (report.vertices_added.first(), report.issues.into_iter().next()) {
            (Some(&id), _) => Ok(id),
            (None, Some(issue)) => Err(issue),
            (None, None) => unreachable!("每个候选顶点都会产生结果"),
        }
    }

    /// 创建单条链接，无序名称对重复时返回 `DuplicateEdge`
    pub fn insert_edge(&mut self, left: &str, right: &str) -> Result<EdgeId, Issue> {
        let report = self.apply(GraphDelta::new().insert_edge(left, right));
        match (report.edges_added.first(), report.issues.into_iter().next()) {
            (Some(&id), _) => Ok(id),
            (None, Some(issue)) => Err(issue),
            (None, None) => unreachable!("每个候选链接都会产生结果"),
        }
    }

    /// 按行导入对象：每个非空行（去除首尾空白后）是一个名称
    pub fn import_vertex_lines<S>(&mut self, lines: &[S], mode: ImportMode) -> ApplyReport
    where
        S: AsRef<str> + Sync,
    {
        let mut delta = GraphDelta::new();
        if mode == ImportMode::Replace {
            delta = delta.clear_vertices();
        }
        for (i, line) in lines.iter().enumerate() {
            let name = line.as_ref().trim();
            if name.is_empty() {
                debug!(line = i + 1, "跳过空行");
                continue;
            }
            delta = delta.insert_vertex_at(i + 1, name);
        }

        let report = self.apply(delta);
        info!(
            added = report.vertices_added.len(),
            skipped = report.issues.len(),
            mode = %mode,
            "对象导入完成"
        );
        report
    }

    /// 按行导入链接：每行以 `<->` 分成两个名称，格式错误的行被跳过
    pub fn import_edge_lines<S>(&mut self, lines: &[S], mode: ImportMode) -> ApplyReport
    where
        S: AsRef<str> + Sync,
    {
        let parsed: Vec<_> = lines
            .par_iter()
            .enumerate()
            .map(|(i, line)| (i + 1, parse_link(i + 1, line.as_ref())))
            .collect();

        let mut delta = GraphDelta::new();
        if mode == ImportMode::Replace {
            delta = delta.clear_edges();
        }
        for (line, result) in parsed {
            delta = match result {
                Ok((left, right)) => delta.insert_edge_at(line, &left, &right),
                Err(issue) => delta.reject(issue),
            };
        }

        let report = self.apply(delta);
        info!(
            added = report.edges_added.len(),
            skipped = report.issues.len(),
            mode = %mode,
            "链接导入完成"
        );
        report
    }

    /// 删除对象；引用它的链接保留，端点退化为占位端点
    pub fn remove_vertex(&mut self, name: &str) -> bool {
        self.apply(GraphDelta::new().remove_vertex(name))
            .vertices_removed
            > 0
    }

    pub fn remove_edge(&mut self, left: &str, right: &str) -> bool {
        self.apply(GraphDelta::new().remove_edge(left, right))
            .edges_removed
            > 0
    }

    /// 清空对象，链接保留并解绑
    pub fn clear_vertices(&mut self) {
        self.apply(GraphDelta::new().clear_vertices());
    }

    /// 清空链接，对象保留并解绑
    pub fn clear_edges(&mut self) {
        self.apply(GraphDelta::new().clear_edges());
    }

    pub fn clear(&mut self) {
        self.apply(GraphDelta::new().clear_vertices().clear_edges());
    }

    // ==================== 连通性分析 ====================

    /// 重置标签后执行连通分量标记，结果同时写回顶点和边
    pub fn analyze(&mut self) -> Connectivity {
        let timer = self.metrics.record_analysis_start();

        binder::unbind(&mut self.vertices, &mut self.edges);
        binder::bind(&mut self.vertices, &mut self.edges);
        let result = ConnectivityAnalyzer::new(&mut self.vertices, &mut self.edges).run();

        self.metrics
            .record_analysis_complete(timer, result.component_count());
        info!(
            components = result.component_count(),
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            "连通性分析完成"
        );
        result
    }

    // ==================== 查询 ====================

    pub fn vertex(&self, name: &str) -> Option<&Vertex> {
        self.vertices.get(name.trim())
    }

    pub fn edge(&self, left: &str, right: &str) -> Option<&Edge> {
        self.edges.get(&LinkKey::new(left, right))
    }

    /// 所有顶点（插入顺序）
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// 所有边（插入顺序）
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// 顶点的关联边
    pub fn incident_edges(&self, name: &str) -> Vec<&Edge> {
        self.vertex(name)
            .map(|v| {
                v.incident()
                    .iter()
                    .filter_map(|&slot| self.edges.get_index(slot).map(|(_, e)| e))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 顶点的邻居名称（按关联边顺序，可能包含占位端点）
    pub fn neighbors(&self, name: &str) -> Vec<&str> {
        let name = name.trim();
        self.incident_edges(name)
            .into_iter()
            .map(|e| {
                if e.left().name() == name {
                    e.right().name()
                } else {
                    e.left().name()
                }
            })
            .collect()
    }

    /// 没有对应对象的链接端点：(边 ID, 端点名称)
    pub fn dangling_endpoints(&self) -> Vec<(EdgeId, &str)> {
        self.edges
            .values()
            .flat_map(|e| {
                e.endpoints()
                    .iter()
                    .filter(|end| end.is_placeholder())
                    .map(move |end| (e.id(), end.name()))
            })
            .collect()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

fn with_line(issue: Issue, line: Option<usize>) -> Issue {
    match line {
        Some(n) => issue.with_line(n),
        None => issue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNASSIGNED;

    fn names(store: &GraphStore) -> Vec<&str> {
        store.vertices().map(|v| v.name()).collect()
    }

    #[test]
    fn test_duplicate_vertex_rejected() {
        let mut store = GraphStore::new();

        assert_eq!(store.insert_vertex("Node1"), Ok(VertexId::new(1)));
        let err = store.insert_vertex("  Node1 ").unwrap_err();
        assert_eq!(
            err,
            Issue::DuplicateVertex {
                name: "Node1".to_string(),
                line: None
            }
        );
        assert_eq!(store.vertex_count(), 1);

        // 大小写敏感
        assert!(store.insert_vertex("node1").is_ok());
        assert_eq!(store.vertex_count(), 2);
    }

    #[test]
    fn test_duplicate_edge_rejected_in_either_order() {
        let mut store = GraphStore::new();

        store.insert_edge("B", "A").unwrap();
        let err = store.insert_edge("A", "B").unwrap_err();
        assert!(matches!(err, Issue::DuplicateEdge { .. }));
        assert_eq!(store.edge_count(), 1);

        // 保持原有端点顺序
        let e = store.edge("A", "B").unwrap();
        assert_eq!(e.left().name(), "B");
    }

    #[test]
    fn test_blank_names_rejected() {
        let mut store = GraphStore::new();
        assert_eq!(
            store.insert_vertex("   "),
            Err(Issue::BlankName { line: None })
        );
        assert!(store.insert_edge("A", " ").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_import_edge_lines_skips_malformed() {
        let mut store = GraphStore::new();
        let report =
            store.import_edge_lines(&["A <-> B", "garbage", "C<->D"], ImportMode::Append);

        assert_eq!(store.edge_count(), 2);
        assert_eq!(report.edges_added, vec![EdgeId::new(1), EdgeId::new(2)]);
        assert_eq!(
            report.issues,
            vec![Issue::MalformedLine {
                line: 2,
                content: "garbage".to_string()
            }]
        );
    }

    #[test]
    fn test_import_reports_duplicates_with_line_numbers() {
        let mut store = GraphStore::new();
        let report = store.import_vertex_lines(
            &["Node1", "", "Node2", " Node1 "],
            ImportMode::Append,
        );

        assert_eq!(names(&store), vec!["Node1", "Node2"]);
        assert_eq!(
            report.issues,
            vec![Issue::DuplicateVertex {
                name: "Node1".to_string(),
                line: Some(4)
            }]
        );

        let report = store.import_edge_lines(&["x", "A<->B", "B <-> A", "y"], ImportMode::Append);
        let lines: Vec<_> = report.issues.iter().map(|i| i.line()).collect();
        assert_eq!(lines, vec![Some(1), Some(3), Some(4)]);
    }

    #[test]
    fn test_large_edge_import_stays_linear() {
        let lines: Vec<String> = (0..20_000)
            .map(|i| format!("v{}<->w{}", i, i))
            .chain(std::iter::once("w7 <-> v7".to_string()))
            .collect();
        let objects: Vec<String> = (0..20_000).map(|i| format!("v{}", i)).collect();

        let started = std::time::Instant::now();
        let mut store = GraphStore::new();
        store.import_vertex_lines(&objects, ImportMode::Append);
        let report = store.import_edge_lines(&lines, ImportMode::Append);
        let result = store.analyze();
        assert!(started.elapsed() < std::time::Duration::from_secs(10));

        assert_eq!(store.edge_count(), 20_000);
        assert_eq!(report.edges_added.len(), 20_000);
        assert_eq!(
            report.issues,
            vec![Issue::DuplicateEdge {
                left: "w7".to_string(),
                right: "v7".to_string(),
                line: Some(20_001)
            }]
        );
        assert_eq!(result.component_count(), 20_000);
        assert!(result.components().iter().all(|c| c.size() == 2));
    }

    #[test]
    fn test_replace_mode_clears_only_its_collection() {
        let mut store = GraphStore::new();
        store.import_vertex_lines(&["A", "B"], ImportMode::Append);
        store.import_edge_lines(&["A<->B"], ImportMode::Append);

        store.import_vertex_lines(&["C", "A"], ImportMode::Replace);
        assert_eq!(names(&store), vec!["C", "A"]);
        assert_eq!(store.edge_count(), 1);

        // 链接重新绑定到新的顶点集合
        let e = store.edge("A", "B").unwrap();
        assert_eq!(e.left().slot(), Some(1));
        assert!(e.right().is_placeholder());
        assert_eq!(store.vertex("A").unwrap().degree(), 1);

        store.import_edge_lines(&["C<->A"], ImportMode::Replace);
        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.vertex("A").unwrap().degree(), 1);
        assert_eq!(store.neighbors("A"), vec!["C"]);
    }

    #[test]
    fn test_edges_bound_after_vertex_insert() {
        let mut store = GraphStore::new();
        store.insert_edge("P", "Q").unwrap();
        assert_eq!(store.dangling_endpoints().len(), 2);

        store.insert_vertex("P").unwrap();
        assert_eq!(store.dangling_endpoints(), vec![(EdgeId::new(1), "Q")]);
        assert_eq!(store.neighbors("P"), vec!["Q"]);
    }

    #[test]
    fn test_mutation_resets_labels() {
        let mut store = GraphStore::new();
        store.import_vertex_lines(&["A", "B"], ImportMode::Append);
        store.insert_edge("A", "B").unwrap();
        store.analyze();
        assert!(store.vertices().all(|v| v.component() != UNASSIGNED));

        store.insert_vertex("C").unwrap();
        assert!(store.vertices().all(|v| v.component() == UNASSIGNED));
        assert!(store.edges().all(|e| e.component() == UNASSIGNED));
    }

    #[test]
    fn test_remove_vertex_degrades_edges() {
        let mut store = GraphStore::new();
        store.import_vertex_lines(&["A", "B", "C"], ImportMode::Append);
        store.import_edge_lines(&["A<->B", "B<->C"], ImportMode::Append);

        assert!(store.remove_vertex("B"));
        assert!(!store.remove_vertex("B"));
        assert_eq!(store.edge_count(), 2);
        assert_eq!(store.dangling_endpoints().len(), 2);
        assert_eq!(store.vertex("C").unwrap().degree(), 1);

        assert!(store.remove_edge("C", "B"));
        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.vertex("C").unwrap().degree(), 0);
    }

    #[test]
    fn test_clear() {
        let mut store = GraphStore::new();
        store.import_vertex_lines(&["A", "B"], ImportMode::Append);
        store.import_edge_lines(&["A<->B"], ImportMode::Append);

        store.clear_edges();
        assert_eq!(store.vertex("A").unwrap().degree(), 0);
        assert_eq!(store.vertex_count(), 2);

        store.insert_edge("A", "B").unwrap();
        store.clear_vertices();
        assert_eq!(store.dangling_endpoints().len(), 2);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_apply_delta_atomically() {
        let mut store = GraphStore::new();
        let report = store.apply(
            GraphDelta::new()
                .insert_vertex("A")
                .insert_vertex("B")
                .insert_vertex("A")
                .insert_edge("A", "B")
                .insert_edge("B", "A"),
        );

        assert_eq!(report.vertices_added.len(), 2);
        assert_eq!(report.edges_added.len(), 1);
        assert_eq!(report.issues.len(), 2);
        assert!(report.issues.iter().all(Issue::is_duplicate));
        assert_eq!(store.vertex("B").unwrap().degree(), 1);

        let snapshot = store.metrics().snapshot();
        assert_eq!(snapshot.vertices_inserted, 2);
        assert_eq!(snapshot.duplicates_rejected, 2);
    }
}
