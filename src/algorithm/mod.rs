//! 图算法模块
//!
//! 包含 Edmonds-Karp 最大流算法

mod max_flow;

pub use max_flow::{
    augment, bottleneck, compute_max_flow, min_cut, Augmentation, Augmentations, EdmondsKarp,
    MaxFlow, MinCut,
};
