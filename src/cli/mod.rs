//! 命令行运行逻辑
//!
//! 读取图、运行最大流并按打印模式输出报告。二进制入口只负责参数解析和退出码。

mod printer;

pub use printer::{PrintMode, Printer};

use crate::algorithm::MaxFlow;
use crate::error::{Error, Result};
use crate::graph::FlowGraph;
use crate::import::EdgeListLoader;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// 未指定时的源点名
pub const DEFAULT_SOURCE: &str = "source";

/// 未指定时的汇点名
pub const DEFAULT_SINK: &str = "sink";

/// 图的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphInput {
    /// 边表文件
    File(PathBuf),
    /// 内置的菱形演示图（源点 A，汇点 D）
    Demo,
}

/// 运行配置
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: GraphInput,
    pub source: String,
    pub sink: String,
    pub mode: PrintMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: GraphInput::Demo,
            source: DEFAULT_SOURCE.to_string(),
            sink: DEFAULT_SINK.to_string(),
            mode: PrintMode::default(),
        }
    }
}

impl RunConfig {
    /// 读取 `path`，使用默认的源点和汇点
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            input: GraphInput::File(path.into()),
            ..Self::default()
        }
    }

    pub fn with_endpoints(mut self, source: impl Into<String>, sink: impl Into<String>) -> Self {
        self.source = source.into();
        self.sink = sink.into();
        self
    }

    pub fn with_mode(mut self, mode: PrintMode) -> Self {
        self.mode = mode;
        self
    }

    /// 源点与汇点相同属于领域错误，在读文件之前就要拒绝
    pub fn validate(&self) -> Result<()> {
        if self.input != GraphInput::Demo && self.source == self.sink {
            return Err(Error::SameSourceSink(self.sink.clone()));
        }
        Ok(())
    }

    /// 按配置构建流网络
    pub fn load_graph(&self) -> Result<FlowGraph> {
        self.validate()?;
        match &self.input {
            GraphInput::Demo => Ok(FlowGraph::diamond()),
            GraphInput::File(path) => {
                let (graph, stats) =
                    EdgeListLoader::new(self.source.as_str(), self.sink.as_str()).load_path(path)?;
                info!(
                    path = %path.display(),
                    edges = stats.edges_loaded,
                    nodes = stats.nodes,
                    duration_ms = stats.duration_ms,
                    "图已加载"
                );
                Ok(graph)
            }
        }
    }
}

/// 运行一次完整的最大流计算，把报告写入 `out`
pub fn run<W: Write>(config: &RunConfig, out: &mut W) -> Result<MaxFlow> {
    let mut graph = config.load_graph()?;
    Printer::new(config.mode).write_report(&mut graph, out)
}
