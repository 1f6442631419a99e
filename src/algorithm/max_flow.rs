//! 最大流算法
//!
//! 实现 Edmonds-Karp 算法（基于 BFS 的 Ford-Fulkerson）：
//! 反复寻找边数最少的增广路径，按瓶颈推流，直到汇点不可达。

use crate::error::{Error, Result};
use crate::graph::{Capacity, EdgeId, FlowGraph, NodeId};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use tracing::{debug, info};

/// 一轮增广的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Augmentation {
    /// 从源点到汇点的路径
    pub path: Vec<NodeId>,
    /// 本轮推送的流量（路径瓶颈）
    pub amount: Capacity,
}

/// 最小割
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinCut {
    /// 源侧顶点集（剩余图中从源点可达的节点）
    pub source_side: Vec<NodeId>,
    /// 跨越割的边
    pub cut_edges: Vec<EdgeId>,
    /// 割的容量
    pub capacity: Capacity,
}

/// 最大流结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxFlow {
    /// 最大流量值
    pub value: Capacity,
    /// 增广轮数
    pub augmentations: usize,
    /// 终止时的最小割
    pub min_cut: MinCut,
}

/// Edmonds-Karp 最大流算法
pub struct EdmondsKarp<'g> {
    graph: &'g mut FlowGraph,
}

impl<'g> EdmondsKarp<'g> {
    /// 创建算法实例，流量直接写回 `graph`
    pub fn new(graph: &'g mut FlowGraph) -> Self {
        Self { graph }
    }

    /// 按需逐轮增广的迭代器
    pub fn augmentations(self) -> Augmentations<'g> {
        Augmentations {
            graph: self.graph,
            total: 0,
            phase: Phase::Searching,
        }
    }

    /// 运行到汇点不可达为止
    pub fn run(self) -> Result<MaxFlow> {
        self.run_with(|_, _| Ok(()))
    }

    /// 运行到汇点不可达为止，每轮增广后把当前图和本轮记录交给 `report`，
    /// `report` 出错时立即停止
    pub fn run_with<F>(self, mut report: F) -> Result<MaxFlow>
    where
        F: FnMut(&FlowGraph, &Augmentation) -> Result<()>,
    {
        let mut rounds = self.augmentations();
        let mut count = 0;

        while let Some(round) = rounds.next() {
            let round = round?;
            count += 1;
            report(rounds.graph(), &round)?;
        }

        let value = rounds.total();
        let min_cut = min_cut(rounds.graph());
        info!(value, augmentations = count, "最大流计算完成");

        Ok(MaxFlow {
            value,
            augmentations: count,
            min_cut,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Searching,
    Done,
}

/// 增广迭代器，每次 `next` 完成一轮“找路径 + 推流”。
///
/// 找不到路径或出错后不再产生元素。
pub struct Augmentations<'g> {
    graph: &'g mut FlowGraph,
    total: Capacity,
    phase: Phase,
}

impl Augmentations<'_> {
    /// 当前的流网络
    pub fn graph(&self) -> &FlowGraph {
        &*self.graph
    }

    /// 目前已推送的总流量
    pub fn total(&self) -> Capacity {
        self.total
    }

    fn augment_along(&mut self, path: Vec<NodeId>) -> Result<Augmentation> {
        let amount = bottleneck(&*self.graph, &path)?;
        if amount <= 0 {
            return Err(Error::InvalidPath(format!(
                "路径瓶颈为 {}，不是增广路径",
                amount
            )));
        }
        // 总流量溢出时图保持不变
        let total = self.total.checked_add(amount).ok_or(Error::FlowOverflow)?;
        augment(&mut *self.graph, &path, amount)?;
        self.total = total;
        debug!(hops = path.len() - 1, amount, "沿增广路径推流");
        Ok(Augmentation { path, amount })
    }
}

impl Iterator for Augmentations<'_> {
    type Item = Result<Augmentation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.phase == Phase::Done {
            return None;
        }

        let Some(path) = self.graph.find_augmenting_path() else {
            self.phase = Phase::Done;
            return None;
        };

        let round = self.augment_along(path);
        if round.is_err() {
            self.phase = Phase::Done;
        }
        Some(round)
    }
}

impl FusedIterator for Augmentations<'_> {}

/// 路径上相邻节点对剩余容量的最小值
pub fn bottleneck(graph: &FlowGraph, path: &[NodeId]) -> Result<Capacity> {
    check_path_len(path)?;
    let mut min = Capacity::MAX;
    for pair in path.windows(2) {
        min = min.min(graph.residual_capacity_between(pair[0], pair[1])?);
    }
    Ok(min)
}

/// 沿路径每一段推送 `delta`。
///
/// 先确认每一段都有对应的边，路径不合法时图保持不变。
pub fn augment(graph: &mut FlowGraph, path: &[NodeId], delta: Capacity) -> Result<()> {
    check_path_len(path)?;
    for pair in path.windows(2) {
        graph.residual_capacity_between(pair[0], pair[1])?;
    }
    for pair in path.windows(2) {
        graph.apply_delta(pair[0], pair[1], delta)?;
    }
    Ok(())
}

/// 计算最大流量值，流量分配留在 `graph` 中
pub fn compute_max_flow(graph: &mut FlowGraph) -> Result<Capacity> {
    let mut rounds = EdmondsKarp::new(graph).augmentations();
    for round in rounds.by_ref() {
        round?;
    }
    Ok(rounds.total())
}

/// 根据当前流量求最小割：源侧为剩余图中从源点可达的节点
pub fn min_cut(graph: &FlowGraph) -> MinCut {
    let reachable = graph.residual_reachable();
    let cut_edges: Vec<EdgeId> = graph
        .edges()
        .iter()
        .filter(|edge| {
            let (a, b) = edge.endpoints();
            reachable.contains(&a) != reachable.contains(&b)
        })
        .map(|edge| edge.id())
        .collect();
    let capacity = cut_edges
        .iter()
        .filter_map(|&id| graph.edge(id))
        .fold(0, |total: Capacity, edge| total.saturating_add(edge.capacity()));

    MinCut {
        source_side: reachable.into_iter().collect(),
        cut_edges,
        capacity,
    }
}

fn check_path_len(path: &[NodeId]) -> Result<()> {
    if path.len() < 2 {
        return Err(Error::InvalidPath(format!(
            "路径至少需要两个节点, 实际为 {}",
            path.len()
        )));
    }
    Ok(())
}
