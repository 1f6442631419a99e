//! 结果打印器
//!
//! 提供列表、表格和 JSON 三种输出格式

use crate::algorithm::{Augmentation, EdmondsKarp, MaxFlow, MinCut};
use crate::error::{Error, Result};
use crate::graph::{Capacity, FlowGraph, NodeId};
use clap::ValueEnum;
use prettytable::{format, row, Table};
use serde::Serialize;
use std::io::Write;

/// 打印模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PrintMode {
    /// 逐节点列出关联边
    #[default]
    List,
    /// 表格模式
    Table,
    /// JSON 文档
    Json,
}

/// 结果打印器
pub struct Printer {
    mode: PrintMode,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(PrintMode::List)
    }
}

impl Printer {
    pub fn new(mode: PrintMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PrintMode {
        self.mode
    }

    /// 在 `graph` 上运行最大流，并按打印模式把报告写入 `out`
    pub fn write_report<W: Write>(&self, graph: &mut FlowGraph, out: &mut W) -> Result<MaxFlow> {
        match self.mode {
            PrintMode::List => {
                writeln!(out, "Initial Graph:")?;
                writeln!(out)?;
                write!(out, "{}", self.format_graph(graph, true))?;
                writeln!(out)?;

                let result = EdmondsKarp::new(graph).run_with(|graph, round| {
                    writeln!(out, "{}", self.format_augmentation(graph, round))?;
                    Ok(())
                })?;

                writeln!(out, "Max flow is {}", result.value)?;
                writeln!(out)?;
                writeln!(out, "Solution:")?;
                writeln!(out)?;
                write!(out, "{}", self.format_graph(graph, false))?;
                Ok(result)
            }
            PrintMode::Table => {
                let result = EdmondsKarp::new(graph).run_with(|graph, round| {
                    writeln!(out, "{}", self.format_augmentation(graph, round))?;
                    Ok(())
                })?;

                writeln!(out, "Max flow is {}", result.value)?;
                write!(out, "{}", self.format_flow_table(graph))?;
                writeln!(out, "{}", self.format_min_cut(graph, &result.min_cut))?;
                Ok(result)
            }
            PrintMode::Json => {
                let mut rounds = Vec::new();
                let result = EdmondsKarp::new(graph).run_with(|_, round| {
                    rounds.push(round.clone());
                    Ok(())
                })?;

                writeln!(out, "{}", self.format_json(graph, &result, &rounds)?)?;
                Ok(result)
            }
        }
    }

    /// 每个节点一行：`node: [edge], [edge]`
    pub fn format_graph(&self, graph: &FlowGraph, with_capacity: bool) -> String {
        let mut output = String::new();
        for (node, name) in graph.nodes() {
            let edges: Vec<String> = graph
                .incident(node)
                .map(|edge| graph.display_edge(edge, with_capacity).to_string())
                .collect();
            output.push_str(&format!("{}: {}\n", name, edges.join(", ")));
        }
        output
    }

    /// 单轮增广的追踪行
    pub fn format_augmentation(&self, graph: &FlowGraph, round: &Augmentation) -> String {
        format!(
            "Trying {}; adding {} to path",
            path_names(graph, &round.path).join("->"),
            round.amount
        )
    }

    /// 最终流量表
    pub fn format_flow_table(&self, graph: &FlowGraph) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(row!["From", "To", "Flow", "Capacity"]);

        for edge in graph.edges() {
            let (a, b) = edge.endpoints();
            let (from, to, flow) = if edge.flow() < 0 {
                (b, a, -edge.flow())
            } else {
                (a, b, edge.flow())
            };
            table.add_row(row![
                name_of(graph, from),
                name_of(graph, to),
                flow.to_string(),
                edge.capacity().to_string()
            ]);
        }

        table.to_string()
    }

    /// 最小割摘要
    pub fn format_min_cut(&self, graph: &FlowGraph, cut: &MinCut) -> String {
        let edges: Vec<String> = cut
            .cut_edges
            .iter()
            .filter_map(|&id| graph.edge(id))
            .map(|edge| graph.display_edge(edge, true).to_string())
            .collect();
        format!(
            "Min cut (capacity {}): {{{}}} | {}",
            cut.capacity,
            path_names(graph, &cut.source_side).join(", "),
            edges.join(", ")
        )
    }

    /// 完整的 JSON 报告
    pub fn format_json(
        &self,
        graph: &FlowGraph,
        result: &MaxFlow,
        rounds: &[Augmentation],
    ) -> Result<String> {
        let report = FlowReport {
            source: graph.source_name(),
            sink: graph.sink_name(),
            max_flow: result.value,
            augmentations: rounds
                .iter()
                .map(|round| RoundReport {
                    path: path_names(graph, &round.path),
                    amount: round.amount,
                })
                .collect(),
            edges: graph
                .edges()
                .iter()
                .map(|edge| {
                    let (a, b) = edge.endpoints();
                    EdgeReport {
                        from: name_of(graph, a),
                        to: name_of(graph, b),
                        flow: edge.flow(),
                        capacity: edge.capacity(),
                    }
                })
                .collect(),
            min_cut: CutReport {
                capacity: result.min_cut.capacity,
                source_side: path_names(graph, &result.min_cut.source_side),
            },
        };

        serde_json::to_string_pretty(&report).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[derive(Serialize)]
struct FlowReport<'a> {
    source: &'a str,
    sink: &'a str,
    max_flow: Capacity,
    augmentations: Vec<RoundReport<'a>>,
    edges: Vec<EdgeReport<'a>>,
    min_cut: CutReport<'a>,
}

#[derive(Serialize)]
struct RoundReport<'a> {
    path: Vec<&'a str>,
    amount: Capacity,
}

#[derive(Serialize)]
struct EdgeReport<'a> {
    from: &'a str,
    to: &'a str,
    flow: Capacity,
    capacity: Capacity,
}

#[derive(Serialize)]
struct CutReport<'a> {
    capacity: Capacity,
    source_side: Vec<&'a str>,
}

fn name_of(graph: &FlowGraph, id: NodeId) -> &str {
    graph.node_name(id).unwrap_or("?")
}

fn path_names<'a>(graph: &'a FlowGraph, path: &[NodeId]) -> Vec<&'a str> {
    path.iter().map(|&id| name_of(graph, id)).collect()
}
