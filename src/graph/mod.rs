//! 图核心模块
//!
//! 定义节点、带容量的边以及流网络

mod edge;
mod graph;
mod node;

pub use edge::{Capacity, Edge, EdgeId, MAX_CAPACITY};
pub use graph::{EdgeDisplay, FlowGraph, FlowGraphBuilder, DEMO_CAPACITY};
pub use node::NodeId;
