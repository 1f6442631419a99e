//! 错误类型定义

use crate::graph::{EdgeId, NodeId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("节点不存在: {0}")]
    NodeNotFound(String),

    #[error("边不存在: {0} -- {1}")]
    EdgeNotFound(String, String),

    #[error("边 {edge:?} 的端点不是 ({from:?}, {to:?})")]
    EndpointMismatch {
        edge: EdgeId,
        from: NodeId,
        to: NodeId,
    },

    #[error("重复的边: {0} -- {1}")]
    DuplicateEdge(String, String),

    #[error("不支持自环边: {0}")]
    SelfLoop(String),

    #[error("无效的容量: {0}")]
    InvalidCapacity(i64),

    #[error("Source and sink are the same: {0}")]
    SameSourceSink(String),

    #[error("无效的增广路径: {0}")]
    InvalidPath(String),

    #[error("总流量溢出")]
    FlowOverflow,

    #[error("第 {line} 行解析错误 ({reason}): {content:?}")]
    Parse {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(String),
}

impl Error {
    /// 是否为输入格式错误
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}
