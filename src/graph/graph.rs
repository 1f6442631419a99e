//! 流网络
//!
//! 边统一存放在边仓库中，节点表按插入顺序记录每个节点关联的边 ID。
//! 插入顺序决定 BFS 访问邻居的顺序，因此同样的输入总是找到同样的路径。

use super::edge::{Capacity, Edge, EdgeId, MAX_CAPACITY};
use super::node::NodeId;
use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;
use std::fmt;
use tracing::trace;

/// 演示图中每条边的容量
pub const DEMO_CAPACITY: Capacity = 4;

/// 流网络
#[derive(Debug, Clone)]
pub struct FlowGraph {
    /// 源点
    source: NodeId,
    /// 汇点
    sink: NodeId,
    /// 节点名 -> 关联边（均保持插入顺序）
    adjacency: IndexMap<String, IndexSet<EdgeId>>,
    /// 边仓库，下标即 EdgeId
    edges: Vec<Edge>,
}

/// 流网络构建器
#[derive(Debug, Clone)]
pub struct FlowGraphBuilder {
    source: String,
    sink: String,
    adjacency: IndexMap<String, IndexSet<EdgeId>>,
    edges: Vec<Edge>,
}

impl FlowGraphBuilder {
    /// 创建构建器，源点和汇点在此固定
    pub fn new(source: impl Into<String>, sink: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            sink: sink.into(),
            adjacency: IndexMap::new(),
            edges: Vec::new(),
        }
    }

    /// 添加一条边，首次出现的端点会自动登记为节点。
    ///
    /// 被拒绝的边（自环、非法容量、重复点对）不会留下任何节点。
    pub fn add_edge(&mut self, from: &str, to: &str, capacity: Capacity) -> Result<EdgeId> {
        if from == to {
            return Err(Error::SelfLoop(from.to_string()));
        }
        if !(0..=MAX_CAPACITY).contains(&capacity) {
            return Err(Error::InvalidCapacity(capacity));
        }
        if let (Some(a), Some(b)) = (
            self.adjacency.get_index_of(from),
            self.adjacency.get_index_of(to),
        ) {
            if self.connected(NodeId::new(a), NodeId::new(b)) {
                return Err(Error::DuplicateEdge(from.to_string(), to.to_string()));
            }
        }

        let id = EdgeId::new(self.edges.len());
        let a = self.intern(from);
        let b = self.intern(to);
        self.edges.push(Edge::new(id, a, b, capacity)?);
        for node in [a, b] {
            if let Some((_, incident)) = self.adjacency.get_index_mut(node.index()) {
                incident.insert(id);
            }
        }
        Ok(id)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// 完成构建。源点与汇点相同时返回 [`Error::SameSourceSink`]。
    pub fn build(mut self) -> Result<FlowGraph> {
        if self.source == self.sink {
            return Err(Error::SameSourceSink(self.sink));
        }
        let source_name = std::mem::take(&mut self.source);
        let sink_name = std::mem::take(&mut self.sink);
        let source = self.intern(&source_name);
        let sink = self.intern(&sink_name);

        Ok(FlowGraph {
            source,
            sink,
            adjacency: self.adjacency,
            edges: self.edges,
        })
    }

    fn intern(&mut self, name: &str) -> NodeId {
        if let Some(index) = self.adjacency.get_index_of(name) {
            return NodeId::new(index);
        }
        let (index, _) = self
            .adjacency
            .insert_full(name.to_string(), IndexSet::new());
        NodeId::new(index)
    }

    fn connected(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency
            .get_index(a.index())
            .map(|(_, incident)| {
                incident
                    .iter()
                    .any(|id| self.edges[id.index()].touches(b))
            })
            .unwrap_or(false)
    }
}

impl FlowGraph {
    /// 从 `(from, to, capacity)` 三元组构建
    pub fn from_triples<I, S>(source: &str, sink: &str, triples: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S, Capacity)>,
        S: AsRef<str>,
    {
        let mut builder = FlowGraphBuilder::new(source, sink);
        for (from, to, capacity) in triples {
            builder.add_edge(from.as_ref(), to.as_ref(), capacity)?;
        }
        builder.build()
    }

    /// 固定的演示图，源点 A，汇点 D，所有边容量为 [`DEMO_CAPACITY`]
    ///
    /// ```text
    ///        B
    ///      / | \
    ///     A  |  D
    ///      \ | /
    ///        C
    /// ```
    pub fn diamond() -> Self {
        let mut builder = FlowGraphBuilder::new("A", "D");
        for node in ["A", "B", "C", "D"] {
            builder.intern(node);
        }
        for (from, to) in [("A", "B"), ("A", "C"), ("B", "C"), ("D", "B"), ("D", "C")] {
            builder
                .add_edge(from, to, DEMO_CAPACITY)
                .expect("demo edges are distinct and well-formed");
        }
        builder.build().expect("demo source and sink differ")
    }

    // ==================== 节点查询 ====================

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn sink(&self) -> NodeId {
        self.sink
    }

    pub fn source_name(&self) -> &str {
        self.name(self.source)
    }

    pub fn sink_name(&self) -> &str {
        self.name(self.sink)
    }

    /// 按名字查找节点
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.adjacency.get_index_of(name).map(NodeId::new)
    }

    /// 节点名
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.adjacency
            .get_index(id.index())
            .map(|(name, _)| name.as_str())
    }

    /// 按插入顺序遍历所有节点
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.adjacency
            .keys()
            .enumerate()
            .map(|(i, name)| (NodeId::new(i), name.as_str()))
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    // ==================== 边查询 ====================

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// 按插入顺序的所有边
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// 与节点 `node` 关联的所有边，节点不存在时返回 [`Error::NodeNotFound`]
    pub fn edges_at(&self, node: &str) -> Result<impl Iterator<Item = &Edge> + '_> {
        let id = self
            .node_id(node)
            .ok_or_else(|| Error::NodeNotFound(node.to_string()))?;
        Ok(self.incident(id))
    }

    /// 连接 `a` 与 `b` 的边（线性扫描 `a` 的关联边）
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.incident(a)
            .find(|edge| edge.other_endpoint(a).map_or(false, |other| other == b))
            .map(Edge::id)
    }

    /// 从 `a` 推向 `b` 的剩余容量；两点之间没有边时返回 [`Error::EdgeNotFound`]
    pub fn residual_capacity_between(&self, a: NodeId, b: NodeId) -> Result<Capacity> {
        let id = self
            .edge_between(a, b)
            .ok_or_else(|| self.missing_edge(a, b))?;
        self.edges[id.index()].residual_capacity(a, b)
    }

    /// 沿 `a -> b` 方向在连接两点的边上增加 `delta`
    pub fn apply_delta(&mut self, a: NodeId, b: NodeId, delta: Capacity) -> Result<()> {
        let id = self
            .edge_between(a, b)
            .ok_or_else(|| self.missing_edge(a, b))?;
        self.edges[id.index()].apply_delta(a, b, delta)
    }

    /// 从 `node` 流出的净流量
    pub fn net_outflow(&self, node: NodeId) -> Result<Capacity> {
        if self.node_name(node).is_none() {
            return Err(Error::NodeNotFound(node.to_string()));
        }
        let mut total = 0;
        for edge in self.incident(node) {
            let other = edge.other_endpoint(node)?;
            total = edge
                .signed_flow(node, other)?
                .checked_add(total)
                .ok_or(Error::FlowOverflow)?;
        }
        Ok(total)
    }

    // ==================== 搜索 ====================

    /// BFS 查找一条从源点到汇点、边数最少的增广路径。
    ///
    /// 只经过 `current -> other` 方向剩余容量大于 0 的边；每个节点只在第一次
    /// 被发现时入队。汇点不可达时返回 `None`。
    pub fn find_augmenting_path(&self) -> Option<Vec<NodeId>> {
        let predecessor = self.residual_bfs(true);
        if predecessor[self.sink.index()].is_none() {
            trace!(sink = self.sink_name(), "汇点不可达");
            return None;
        }

        let mut path = vec![self.sink];
        let mut current = self.sink;
        while current != self.source {
            current = predecessor[current.index()]?;
            path.push(current);
        }
        path.reverse();
        trace!(hops = path.len() - 1, "找到增广路径");
        Some(path)
    }

    /// 沿剩余边从源点可达的节点（按发现顺序）
    pub fn residual_reachable(&self) -> IndexSet<NodeId> {
        self.residual_bfs(false)
            .iter()
            .enumerate()
            .filter(|(_, pred)| pred.is_some())
            .map(|(i, _)| NodeId::new(i))
            .collect()
    }

    /// 剩余图上的 BFS，返回每个节点的前驱（源点的前驱是它自己）
    fn residual_bfs(&self, stop_at_sink: bool) -> Vec<Option<NodeId>> {
        let mut predecessor: Vec<Option<NodeId>> = vec![None; self.adjacency.len()];
        let mut queue = VecDeque::new();

        predecessor[self.source.index()] = Some(self.source);
        queue.push_back(self.source);

        while let Some(current) = queue.pop_front() {
            if stop_at_sink && current == self.sink {
                break;
            }

            for edge in self.incident(current) {
                let Ok(other) = edge.other_endpoint(current) else {
                    continue;
                };
                if predecessor[other.index()].is_some() {
                    continue;
                }
                if edge
                    .residual_capacity(current, other)
                    .map_or(false, |residual| residual > 0)
                {
                    predecessor[other.index()] = Some(current);
                    queue.push_back(other);
                }
            }
        }

        predecessor
    }

    // ==================== 展示 ====================

    /// 边的展示形式：`[in==>flow/capacity==>out]` 或 `[in==>flow==>out]`
    pub fn display_edge<'a>(&'a self, edge: &'a Edge, with_capacity: bool) -> EdgeDisplay<'a> {
        EdgeDisplay {
            graph: self,
            edge,
            with_capacity,
        }
    }

    pub(crate) fn incident(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency
            .get_index(node.index())
            .into_iter()
            .flat_map(|(_, incident)| incident.iter())
            .filter_map(move |id| self.edges.get(id.index()))
    }

    fn name(&self, id: NodeId) -> &str {
        self.node_name(id).unwrap_or("?")
    }

    fn missing_edge(&self, a: NodeId, b: NodeId) -> Error {
        Error::EdgeNotFound(self.name(a).to_string(), self.name(b).to_string())
    }
}

/// [`FlowGraph::display_edge`] 返回的展示适配器
pub struct EdgeDisplay<'a> {
    graph: &'a FlowGraph,
    edge: &'a Edge,
    with_capacity: bool,
}

impl fmt::Display for EdgeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = self.edge.endpoints();
        let (a, b) = (self.graph.name(a), self.graph.name(b));
        if self.with_capacity {
            write!(
                f,
                "[{}==>{}/{}==>{}]",
                a,
                self.edge.flow(),
                self.edge.capacity(),
                b
            )
        } else {
            write!(f, "[{}==>{}==>{}]", a, self.edge.flow(), b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(graph: &FlowGraph, name: &str) -> NodeId {
        graph.node_id(name).unwrap()
    }

    fn names(graph: &FlowGraph, path: &[NodeId]) -> Vec<String> {
        path.iter()
            .map(|&n| graph.node_name(n).unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_diamond_layout() {
        let graph = FlowGraph::diamond();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 5);
        assert_eq!(graph.source_name(), "A");
        assert_eq!(graph.sink_name(), "D");

        let order: Vec<&str> = graph.nodes().map(|(_, name)| name).collect();
        assert_eq!(order, vec!["A", "B", "C", "D"]);

        // 每条边都出现在两个端点的关联集合中
        for edge in graph.edges() {
            let (a, b) = edge.endpoints();
            assert!(graph.incident(a).any(|e| e.id() == edge.id()));
            assert!(graph.incident(b).any(|e| e.id() == edge.id()));
        }
        assert_eq!(graph.edges_at("B").unwrap().count(), 3);
    }

    #[test]
    fn test_edges_at_unknown_node() {
        let graph = FlowGraph::diamond();
        assert!(matches!(
            graph.edges_at("Z").map(|edges| edges.count()),
            Err(Error::NodeNotFound(name)) if name == "Z"
        ));
    }

    #[test]
    fn test_fresh_residual_is_full_capacity() {
        let triples = [("s", "x", 5), ("x", "t", 3), ("s", "t", 9)];
        let graph = FlowGraph::from_triples("s", "t", triples).unwrap();

        for (from, to, capacity) in triples {
            let (a, b) = (id(&graph, from), id(&graph, to));
            assert_eq!(graph.residual_capacity_between(a, b).unwrap(), capacity);
            assert_eq!(graph.residual_capacity_between(b, a).unwrap(), capacity);
        }
    }

    #[test]
    fn test_residual_between_unconnected_nodes() {
        let graph = FlowGraph::diamond();
        let (a, d) = (id(&graph, "A"), id(&graph, "D"));
        assert!(graph.edge_between(a, d).is_none());
        assert!(matches!(
            graph.residual_capacity_between(a, d),
            Err(Error::EdgeNotFound(..))
        ));
    }

    #[test]
    fn test_builder_rejects_invalid_edges() {
        let mut builder = FlowGraphBuilder::new("s", "t");
        builder.add_edge("s", "a", 1).unwrap();

        assert!(matches!(
            builder.add_edge("a", "s", 2),
            Err(Error::DuplicateEdge(..))
        ));
        assert!(matches!(
            builder.add_edge("b", "b", 2),
            Err(Error::SelfLoop(_))
        ));
        assert!(matches!(
            builder.add_edge("b", "c", -2),
            Err(Error::InvalidCapacity(-2))
        ));
        // 被拒绝的边不登记节点
        assert_eq!(builder.node_count(), 2);
        assert_eq!(builder.edge_count(), 1);
    }

    #[test]
    fn test_same_source_and_sink() {
        let result = FlowGraph::from_triples("x", "x", [("x", "y", 1)]);
        assert!(matches!(result, Err(Error::SameSourceSink(name)) if name == "x"));
    }

    #[test]
    fn test_isolated_endpoints_are_registered() {
        let graph = FlowGraph::from_triples("s", "t", [("s", "a", 3), ("b", "c", 2)]).unwrap();
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.sink_name(), "t");
        assert_eq!(graph.edges_at("t").unwrap().count(), 0);
        assert!(graph.find_augmenting_path().is_none());
    }

    #[test]
    fn test_bfs_prefers_fewest_hops() {
        // s-a-b-t 是三跳，s-c-t 是两跳，但 s-a 先插入
        let graph = FlowGraph::from_triples(
            "s",
            "t",
            [("s", "a", 1), ("a", "b", 1), ("b", "t", 1), ("s", "c", 1), ("c", "t", 1)],
        )
        .unwrap();

        let path = graph.find_augmenting_path().unwrap();
        assert_eq!(names(&graph, &path), vec!["s", "c", "t"]);
    }

    #[test]
    fn test_bfs_tie_break_follows_insertion_order() {
        let graph = FlowGraph::diamond();
        let path = graph.find_augmenting_path().unwrap();
        assert_eq!(names(&graph, &path), vec!["A", "B", "D"]);
    }

    #[test]
    fn test_bfs_skips_saturated_edges() {
        let mut graph = FlowGraph::diamond();
        let (a, b, d) = (id(&graph, "A"), id(&graph, "B"), id(&graph, "D"));
        graph.apply_delta(a, b, DEMO_CAPACITY).unwrap();

        let path = graph.find_augmenting_path().unwrap();
        assert_eq!(names(&graph, &path), vec!["A", "C", "D"]);

        // 反向剩余容量仍可用：D -> B 方向尚未饱和
        assert_eq!(graph.residual_capacity_between(d, b).unwrap(), DEMO_CAPACITY);
        assert_eq!(graph.residual_capacity_between(b, a).unwrap(), 2 * DEMO_CAPACITY);
    }

    #[test]
    fn test_bfs_uses_reverse_direction_of_edge() {
        // 边按 t -> m, m -> s 的方向声明，流量仍可从 s 流到 t
        let graph = FlowGraph::from_triples("s", "t", [("t", "m", 2), ("m", "s", 2)]).unwrap();
        let path = graph.find_augmenting_path().unwrap();
        assert_eq!(names(&graph, &path), vec!["s", "m", "t"]);
    }

    #[test]
    fn test_net_outflow_and_reachability() {
        let mut graph = FlowGraph::from_triples("s", "t", [("s", "x", 5), ("x", "t", 3)]).unwrap();
        let (s, x, t) = (id(&graph, "s"), id(&graph, "x"), id(&graph, "t"));
        graph.apply_delta(s, x, 3).unwrap();
        graph.apply_delta(x, t, 3).unwrap();

        assert_eq!(graph.net_outflow(s).unwrap(), 3);
        assert_eq!(graph.net_outflow(x).unwrap(), 0);
        assert_eq!(graph.net_outflow(t).unwrap(), -3);
        assert!(graph.net_outflow(NodeId::new(42)).is_err());

        let reachable = graph.residual_reachable();
        assert!(reachable.contains(&s));
        assert!(reachable.contains(&x));
        assert!(!reachable.contains(&t));
    }

    #[test]
    fn test_net_outflow_overflow() {
        let mut graph = FlowGraph::from_triples(
            "s",
            "t",
            [
                ("s", "a", MAX_CAPACITY),
                ("s", "b", MAX_CAPACITY),
                ("s", "c", MAX_CAPACITY),
            ],
        )
        .unwrap();
        let s = graph.source();
        for name in ["a", "b", "c"] {
            let other = id(&graph, name);
            graph.apply_delta(s, other, MAX_CAPACITY).unwrap();
        }

        assert!(matches!(graph.net_outflow(s), Err(Error::FlowOverflow)));
        assert_eq!(graph.net_outflow(id(&graph, "a")).unwrap(), -MAX_CAPACITY);
    }

    #[test]
    fn test_display_edge() {
        let mut graph = FlowGraph::diamond();
        let (a, b, d) = (id(&graph, "A"), id(&graph, "B"), id(&graph, "D"));
        graph.apply_delta(a, b, 3).unwrap();
        graph.apply_delta(b, d, 3).unwrap();

        let ab = graph.edge(graph.edge_between(a, b).unwrap()).unwrap();
        assert_eq!(graph.display_edge(ab, true).to_string(), "[A==>3/4==>B]");
        assert_eq!(graph.display_edge(ab, false).to_string(), "[A==>3==>B]");

        // D-B 边的规范方向是 D -> B，因此 B -> D 的流量显示为负数
        let db = graph.edge(graph.edge_between(d, b).unwrap()).unwrap();
        assert_eq!(graph.display_edge(db, true).to_string(), "[D==>-3/4==>B]");
    }
}
