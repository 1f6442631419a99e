//! maxflow - 带容量图上的最大流计算
//!
//! 基于 Edmonds-Karp 算法：
//! - 边在两个方向上共享容量，流量以带符号值记录
//! - BFS 寻找边数最少的增广路径，保证 O(V·E²) 的运行时间
//! - 逐轮增广以迭代器形式暴露，便于外部追踪和提前停止
//! - 读取空白分隔的边表文件

pub mod algorithm;
pub mod cli;
pub mod error;
pub mod graph;
pub mod import;

// 重导出常用类型
pub use algorithm::{compute_max_flow, Augmentation, EdmondsKarp, MaxFlow, MinCut};
pub use error::{Error, Result};
pub use graph::{Capacity, Edge, EdgeId, FlowGraph, FlowGraphBuilder, NodeId};
pub use import::{EdgeListLoader, LoadStats};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
