//! 连通分量标记
//!
//! 广度优先遍历已绑定的图，为每个顶点和边写入正整数标签。
//! 结果完全由顶点插入顺序和关联边顺序决定。

use crate::graph::{EdgeArena, EdgeId, VertexArena};
use crate::types::{ComponentLabel, EdgeSlot, VertexSlot, UNASSIGNED};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// 连通分量成员
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    /// 是否为没有对应对象的占位端点
    pub placeholder: bool,
}

/// 连通分量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub label: ComponentLabel,
    /// 成员，按访问顺序
    pub members: Vec<Member>,
    /// 属于该分量的边
    pub edges: Vec<EdgeId>,
}

impl Component {
    /// 成员数量，同名的缺失对象只计一次
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    /// 没有对应对象的成员名称
    pub fn missing_names(&self) -> Vec<&str> {
        self.members
            .iter()
            .filter(|m| m.placeholder)
            .map(|m| m.name.as_str())
            .collect()
    }
}

/// 分析结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Connectivity {
    components: Vec<Component>,
    /// 对象名称 -> 标签（不含占位端点）
    labels: IndexMap<String, ComponentLabel>,
}

impl Connectivity {
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn label_of(&self, name: &str) -> Option<ComponentLabel> {
        self.labels.get(name.trim()).copied()
    }

    /// 对象名称到标签的映射（对象插入顺序）
    pub fn labels(&self) -> &IndexMap<String, ComponentLabel> {
        &self.labels
    }

    /// 每个分量的成员数量
    pub fn sizes(&self) -> Vec<(ComponentLabel, usize)> {
        self.components.iter().map(|c| (c.label, c.size())).collect()
    }

    pub fn largest(&self) -> Option<&Component> {
        self.components.iter().max_by_key(|c| c.size())
    }
}

/// 一次运行的遍历状态
struct Walk {
    visited: Vec<bool>,
    /// 缺失对象名称 -> 首次分配到的标签
    missing: HashMap<String, ComponentLabel>,
    /// 当前分量中已列出的缺失对象名称
    listed: HashSet<String>,
}

impl Walk {
    fn new(vertex_count: usize) -> Self {
        Self {
            visited: vec![false; vertex_count],
            missing: HashMap::new(),
            listed: HashSet::new(),
        }
    }

    fn list_missing(&mut self, name: &str, component: &mut Component) {
        if self.listed.insert(name.to_string()) {
            component.members.push(Member {
                name: name.to_string(),
                placeholder: true,
            });
            self.missing
                .entry(name.to_string())
                .or_insert(component.label);
        }
    }
}

/// 连通分量分析器
///
/// 不会重置已有标签：标签非 0 的顶点和占位端点都不会被重新标记。
pub struct ConnectivityAnalyzer<'g> {
    vertices: &'g mut VertexArena,
    edges: &'g mut EdgeArena,
}

impl<'g> ConnectivityAnalyzer<'g> {
    pub fn new(vertices: &'g mut VertexArena, edges: &'g mut EdgeArena) -> Self {
        Self { vertices, edges }
    }

    /// 执行标记
    pub fn run(mut self) -> Connectivity {
        let mut walk = Walk::new(self.vertices.len());
        let mut next: ComponentLabel = 1;
        let mut components = Vec::new();

        for start in 0..self.vertices.len() {
            if self.vertices[start].component() != UNASSIGNED {
                continue;
            }

            let mut component = Component {
                label: next,
                members: Vec::new(),
                edges: Vec::new(),
            };
            let mut queue: VecDeque<VertexSlot> = VecDeque::new();
            walk.listed.clear();
            self.visit(start, &mut walk, &mut component, &mut queue);

            while let Some(current) = queue.pop_front() {
                let incident: Vec<EdgeSlot> = self.vertices[current].incident().to_vec();
                for edge_slot in incident {
                    self.walk_edge(edge_slot, &mut walk, &mut component, &mut queue);
                }
            }

            components.push(component);
            next += 1;
        }

        // 未被任何对象触及的缺失名称，每个名称成为一个单独的分量
        for edge in self.edges.values_mut() {
            for end in edge.endpoints_mut().iter_mut() {
                if !end.is_placeholder() || end.component() != UNASSIGNED {
                    continue;
                }
                if let Some(&label) = walk.missing.get(end.name()) {
                    end.set_component(label);
                    continue;
                }

                walk.missing.insert(end.name().to_string(), next);
                end.set_component(next);
                components.push(Component {
                    label: next,
                    members: vec![Member {
                        name: end.name().to_string(),
                        placeholder: true,
                    }],
                    edges: Vec::new(),
                });
                next += 1;
            }
        }

        let labels = self
            .vertices
            .values()
            .map(|v| (v.name().to_string(), v.component()))
            .collect();

        Connectivity { components, labels }
    }

    fn visit(
        &mut self,
        slot: VertexSlot,
        walk: &mut Walk,
        component: &mut Component,
        queue: &mut VecDeque<VertexSlot>,
    ) {
        walk.visited[slot] = true;
        let vertex = &mut self.vertices[slot];
        vertex.set_component(component.label);
        component.members.push(Member {
            name: vertex.name().to_string(),
            placeholder: false,
        });
        queue.push_back(slot);
    }

    fn walk_edge(
        &mut self,
        edge_slot: EdgeSlot,
        walk: &mut Walk,
        component: &mut Component,
        queue: &mut VecDeque<VertexSlot>,
    ) {
        let label = component.label;
        let Some((_, edge)) = self.edges.get_index_mut(edge_slot) else {
            return;
        };
        // 环上的边两端都已访问，也要带上标签
        if edge.component() != label {
            edge.set_component(label);
            component.edges.push(edge.id());
        }

        let mut discovered = Vec::with_capacity(2);
        for end in edge.endpoints_mut().iter_mut() {
            match end.slot() {
                Some(slot) if !walk.visited[slot] => discovered.push(slot),
                Some(_) => {}
                None if end.component() == UNASSIGNED => {
                    end.set_component(label);
                    walk.list_missing(end.name(), component);
                }
                None => {}
            }
        }

        for slot in discovered {
            if !walk.visited[slot] {
                self.visit(slot, walk, component, queue);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::GraphStore;
    use crate::types::{ImportMode, UNASSIGNED};

    fn store(vertices: &[&str], edges: &[&str]) -> GraphStore {
        let mut store = GraphStore::new();
        store.import_vertex_lines(vertices, ImportMode::Append);
        store.import_edge_lines(edges, ImportMode::Append);
        store
    }

    #[test]
    fn test_scenario_two_components() {
        let mut g = store(&["X", "Y", "Z"], &["X<->Y"]);
        let result = g.analyze();

        assert_eq!(result.component_count(), 2);
        assert_eq!(result.components()[0].member_names(), vec!["X", "Y"]);
        assert_eq!(result.components()[0].label, 1);
        assert_eq!(result.components()[1].member_names(), vec!["Z"]);
        assert_eq!(result.label_of("Z"), Some(2));
        assert_eq!(g.edge("X", "Y").unwrap().component(), 1);
    }

    #[test]
    fn test_scenario_chain_and_isolated() {
        let mut g = store(&["A", "B", "C", "D"], &["A<->B", "B<->C"]);
        let result = g.analyze();

        assert_eq!(result.components()[0].member_names(), vec!["A", "B", "C"]);
        assert_eq!(result.label_of("A"), Some(1));
        assert_eq!(result.label_of("D"), Some(2));
        assert_eq!(result.sizes(), vec![(1, 3), (2, 1)]);
    }

    #[test]
    fn test_placeholders_become_singletons() {
        let mut g = store(&[], &["P<->Q"]);
        let result = g.analyze();

        let e = g.edge("P", "Q").unwrap();
        assert!(e.left().is_placeholder() && e.right().is_placeholder());
        assert_eq!(e.left().component(), 1);
        assert_eq!(e.right().component(), 2);
        assert_eq!(e.component(), UNASSIGNED);

        assert_eq!(result.component_count(), 2);
        assert!(result.components().iter().all(|c| c.size() == 1));
        assert!(result.components()[0].members[0].placeholder);
        assert_eq!(result.label_of("P"), None);
    }

    #[test]
    fn test_placeholder_reached_from_vertex_joins_component() {
        let mut g = store(&["P", "R"], &["P<->Q"]);
        let result = g.analyze();

        let e = g.edge("P", "Q").unwrap();
        assert_eq!(e.component(), 1);
        assert_eq!(e.right().component(), 1);
        assert_eq!(result.components()[0].member_names(), vec!["P", "Q"]);
        assert_eq!(result.label_of("R"), Some(2));
        assert_eq!(result.component_count(), 2);
    }

    #[test]
    fn test_missing_name_listed_once_per_component() {
        let mut g = store(&["A", "B"], &["A<->B", "A<->Ghost", "B<->Ghost"]);
        let result = g.analyze();

        assert_eq!(result.component_count(), 1);
        assert_eq!(result.components()[0].member_names(), vec!["A", "B", "Ghost"]);
        assert_eq!(result.components()[0].missing_names(), vec!["Ghost"]);
        assert_eq!(result.sizes(), vec![(1, 3)]);
        assert_eq!(g.edge("A", "Ghost").unwrap().right().component(), 1);
        assert_eq!(g.edge("B", "Ghost").unwrap().right().component(), 1);
    }

    #[test]
    fn test_missing_name_shared_between_links_is_one_singleton() {
        let mut g = store(&[], &["P<->Q", "Q<->R"]);
        let result = g.analyze();

        assert_eq!(result.component_count(), 3);
        let names: Vec<Vec<&str>> = result.components().iter().map(|c| c.member_names()).collect();
        assert_eq!(names, vec![vec!["P"], vec!["Q"], vec!["R"]]);

        let pq = g.edge("P", "Q").unwrap();
        let qr = g.edge("Q", "R").unwrap();
        assert_eq!(pq.right().component(), 2);
        assert_eq!(qr.left().component(), 2);
        assert_eq!(qr.right().component(), 3);
    }

    #[test]
    fn test_unreached_endpoint_takes_label_of_reached_name() {
        let mut g = store(&["A"], &["A<->Ghost", "X<->Ghost"]);
        let result = g.analyze();

        // Ghost 已在 A 的分量中，X 单独成为一个分量
        assert_eq!(result.component_count(), 2);
        assert_eq!(result.components()[0].member_names(), vec!["A", "Ghost"]);
        assert_eq!(result.components()[1].member_names(), vec!["X"]);

        let xg = g.edge("X", "Ghost").unwrap();
        assert_eq!(xg.left().component(), 2);
        assert_eq!(xg.right().component(), 1);
        assert_eq!(xg.component(), UNASSIGNED);
    }

    #[test]
    fn test_labels_match_reachability() {
        let mut g = store(
            &["A", "B", "C", "D", "E", "F"],
            &["A<->B", "B<->C", "C<->A", "D<->E", "F<->F"],
        );
        let result = g.analyze();

        assert_eq!(result.component_count(), 3);
        assert!(g.vertices().all(|v| v.component() > 0));
        for e in g.edges() {
            let left = g.vertex(e.left().name()).unwrap().component();
            let right = g.vertex(e.right().name()).unwrap().component();
            assert_eq!(e.component(), left);
            assert_eq!(e.component(), right);
        }
        assert_eq!(result.label_of("A"), result.label_of("C"));
        assert_ne!(result.label_of("A"), result.label_of("D"));
        assert_eq!(result.components()[0].edges.len(), 3);
    }

    #[test]
    fn test_reanalysis_is_stable() {
        let mut g = store(&["A", "B", "C"], &["C<->B"]);
        let first = g.analyze();
        let second = g.analyze();

        assert_eq!(first.labels(), second.labels());
        assert_eq!(second.label_of("A"), Some(1));
        assert_eq!(second.label_of("B"), Some(2));
    }

    #[test]
    fn test_analyzer_does_not_revisit_labelled_vertices() {
        use super::ConnectivityAnalyzer;
        use crate::graph::{binder, Edge, EdgeArena, EdgeId, LinkKey, Vertex, VertexArena, VertexId};

        let mut vertices = VertexArena::default();
        vertices.insert("A".to_string(), Vertex::new(VertexId::new(1), "A"));
        vertices.insert("B".to_string(), Vertex::new(VertexId::new(2), "B"));
        let mut edges = EdgeArena::default();
        edges.insert(LinkKey::new("A", "B"), Edge::new("A", "B", EdgeId::new(1)));
        binder::bind(&mut vertices, &mut edges);

        let first = ConnectivityAnalyzer::new(&mut vertices, &mut edges).run();
        assert_eq!(first.component_count(), 1);

        // 未重置标签时再次运行不会产生新的分量
        let second = ConnectivityAnalyzer::new(&mut vertices, &mut edges).run();
        assert_eq!(second.component_count(), 0);
        assert_eq!(second.label_of("A"), Some(1));
    }

    #[test]
    fn test_analyzer_does_not_relabel_missing_endpoints() {
        use super::ConnectivityAnalyzer;
        use crate::graph::{binder, Edge, EdgeArena, EdgeId, LinkKey, Vertex, VertexArena, VertexId};

        let mut vertices = VertexArena::default();
        vertices.insert("P".to_string(), Vertex::new(VertexId::new(1), "P"));
        let mut edges = EdgeArena::default();
        edges.insert(LinkKey::new("P", "Q"), Edge::new("P", "Q", EdgeId::new(1)));
        edges.insert(LinkKey::new("S", "T"), Edge::new("S", "T", EdgeId::new(2)));
        binder::bind(&mut vertices, &mut edges);

        let first = ConnectivityAnalyzer::new(&mut vertices, &mut edges).run();
        assert_eq!(first.component_count(), 3);

        let second = ConnectivityAnalyzer::new(&mut vertices, &mut edges).run();
        assert_eq!(second.component_count(), 0);
        let pq = &edges[&LinkKey::new("P", "Q")];
        assert_eq!(pq.right().component(), 1);
        let st = &edges[&LinkKey::new("S", "T")];
        assert_eq!((st.left().component(), st.right().component()), (2, 3));
    }

    #[test]
    fn test_empty_graph() {
        let mut g = GraphStore::new();
        let result = g.analyze();
        assert_eq!(result.component_count(), 0);
        assert!(result.largest().is_none());
    }
}
