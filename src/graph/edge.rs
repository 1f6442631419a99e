//! 边定义
//!
//! 一条边连接两个节点，容量在两个方向上共享。流量只存一个带符号的值，
//! 正数表示沿 `a -> b`（规范正向）流动，负数表示沿 `b -> a` 流动。

use crate::error::{Error, Result};
use crate::graph::node::NodeId;
use serde::{Deserialize, Serialize};

/// 容量与流量的数值类型
pub type Capacity = i64;

/// 单条边允许的最大容量，保证剩余容量 `capacity - signed_flow` 不会溢出
pub const MAX_CAPACITY: Capacity = i64::MAX / 2;

/// 边 ID（边仓库中的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl EdgeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for EdgeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// 边
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// 边 ID
    id: EdgeId,
    /// 规范正向的起点
    a: NodeId,
    /// 规范正向的终点
    b: NodeId,
    /// 容量，创建后不可变
    capacity: Capacity,
    /// 沿 a -> b 方向的带符号流量
    flow: Capacity,
}

impl Edge {
    /// 创建流量为 0 的新边
    pub fn new(id: EdgeId, a: NodeId, b: NodeId, capacity: Capacity) -> Result<Self> {
        if !(0..=MAX_CAPACITY).contains(&capacity) {
            return Err(Error::InvalidCapacity(capacity));
        }
        if a == b {
            return Err(Error::SelfLoop(a.to_string()));
        }
        Ok(Self {
            id,
            a,
            b,
            capacity,
            flow: 0,
        })
    }

    /// 获取边 ID
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// 规范正向的两个端点 `(a, b)`
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.a, self.b)
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// 沿规范正向 `a -> b` 的原始带符号流量
    pub fn flow(&self) -> Capacity {
        self.flow
    }

    /// 是否以 `node` 为端点
    pub fn touches(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }

    /// `from -> to` 与规范正向一致时为 `1`，相反时为 `-1`。
    ///
    /// 两个参数都必须与端点匹配，否则返回 [`Error::EndpointMismatch`]。
    pub fn direction(&self, from: NodeId, to: NodeId) -> Result<Capacity> {
        if from == self.a && to == self.b {
            Ok(1)
        } else if from == self.b && to == self.a {
            Ok(-1)
        } else {
            Err(Error::EndpointMismatch {
                edge: self.id,
                from,
                to,
            })
        }
    }

    /// 从 `from` 指向 `to` 测得的流量（反向流动时为负）
    pub fn signed_flow(&self, from: NodeId, to: NodeId) -> Result<Capacity> {
        Ok(self.flow * self.direction(from, to)?)
    }

    /// 还能从 `from` 推向 `to` 的流量
    pub fn residual_capacity(&self, from: NodeId, to: NodeId) -> Result<Capacity> {
        Ok(self.capacity - self.signed_flow(from, to)?)
    }

    /// 沿 `from -> to` 方向增加 `delta` 的流量。
    ///
    /// # Panics
    ///
    /// `delta` 为负或超过剩余容量时 panic：这说明瓶颈计算出了错，
    /// 继续运行只会破坏容量不变式。
    pub fn apply_delta(&mut self, from: NodeId, to: NodeId, delta: Capacity) -> Result<()> {
        let residual = self.residual_capacity(from, to)?;
        assert!(
            (0..=residual).contains(&delta),
            "edge {:?}: delta {} outside residual range 0..={} for {:?} -> {:?}",
            self.id,
            delta,
            residual,
            from,
            to
        );
        self.flow += self.direction(from, to)? * delta;
        Ok(())
    }

    /// 给定一个端点，返回另一个端点
    pub fn other_endpoint(&self, one_end: NodeId) -> Result<NodeId> {
        if one_end == self.a {
            Ok(self.b)
        } else if one_end == self.b {
            Ok(self.a)
        } else {
            Err(Error::EndpointMismatch {
                edge: self.id,
                from: one_end,
                to: one_end,
            })
        }
    }

    /// 流量的绝对值是否已达到容量
    pub fn is_saturated(&self) -> bool {
        self.flow.abs() == self.capacity
    }
}
