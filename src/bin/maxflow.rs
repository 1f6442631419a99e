//! maxflow 命令行工具
//!
//! 读取边表文件，计算源点到汇点的最大流并打印每轮增广过程

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use maxflow::cli::{self, GraphInput, PrintMode, RunConfig, DEFAULT_SINK, DEFAULT_SOURCE};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// 命令行用法错误
const EXIT_USAGE: u8 = 1;
/// 领域错误、IO 错误、输入格式错误
const EXIT_FAILURE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "maxflow")]
#[command(about = "Edmonds-Karp 最大流计算工具")]
#[command(override_usage = "maxflow <GRAPH_FILE> [<SOURCE> <SINK>]\n       maxflow --demo")]
struct Args {
    /// 边表文件，每行 `from to capacity`
    #[arg(required_unless_present = "demo")]
    graph_file: Option<PathBuf>,

    /// 源点名（默认 source）
    #[arg(requires = "sink")]
    source: Option<String>,

    /// 汇点名（默认 sink）
    #[arg(requires = "source")]
    sink: Option<String>,

    /// 使用内置的菱形演示图（源点 A，汇点 D）
    #[arg(long, conflicts_with = "graph_file")]
    demo: bool,

    /// 输出格式: list, table, json
    #[arg(short, long, value_enum, default_value_t = PrintMode::List)]
    format: PrintMode,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> RunConfig {
        let input = match self.graph_file {
            Some(path) if !self.demo => GraphInput::File(path),
            _ => GraphInput::Demo,
        };
        RunConfig {
            input,
            source: self.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            sink: self.sink.unwrap_or_else(|| DEFAULT_SINK.to_string()),
            mode: self.format,
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_USAGE),
            };
        }
    };

    init_tracing(args.verbose);

    match execute(args.into_config()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn execute(config: RunConfig) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    cli::run(&config, &mut out).with_context(|| match &config.input {
        GraphInput::File(path) => format!("处理图文件 {} 失败", path.display()),
        GraphInput::Demo => "处理演示图失败".to_string(),
    })?;
    out.flush()?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("maxflow=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
