//! 边表导入模块
//!
//! 每行一条边 `from to capacity`，字段以空白分隔。空行和 `#` 开头的行被跳过，
//! 其余任何格式问题都会返回带行号的 [`Error::Parse`]。

use crate::error::{Error, Result};
use crate::graph::{Capacity, FlowGraph, FlowGraphBuilder, MAX_CAPACITY};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// 导入统计
#[derive(Debug, Default, Clone)]
pub struct LoadStats {
    pub lines_read: usize,
    pub edges_loaded: usize,
    pub nodes: usize,
    pub duration_ms: u64,
}

/// 边表导入器
pub struct EdgeListLoader {
    source: String,
    sink: String,
}

impl EdgeListLoader {
    /// 创建导入器，源点和汇点在读取前就已确定
    pub fn new(source: impl Into<String>, sink: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            sink: sink.into(),
        }
    }

    /// 从文件导入
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<(FlowGraph, LoadStats)> {
        let path = path.as_ref();
        debug!(path = %path.display(), "打开边表文件");
        let file = File::open(path)?;
        self.load_reader(BufReader::new(file))
    }

    /// 从任意行读取器导入
    pub fn load_reader<R: BufRead>(&self, reader: R) -> Result<(FlowGraph, LoadStats)> {
        if self.source == self.sink {
            return Err(Error::SameSourceSink(self.sink.clone()));
        }

        let start = Instant::now();
        let mut stats = LoadStats::default();
        let mut builder = FlowGraphBuilder::new(self.source.as_str(), self.sink.as_str());

        for (index, bytes) in reader.split(b'\n').enumerate() {
            let bytes = bytes?;
            let number = index + 1;
            stats.lines_read += 1;

            let line = decode_line(number, &bytes)?;
            let Some((from, to, capacity)) = parse_line(number, line)? else {
                continue;
            };
            builder
                .add_edge(from, to, capacity)
                .map_err(|e| match e {
                    Error::DuplicateEdge(..) | Error::SelfLoop(_) | Error::InvalidCapacity(_) => {
                        Error::Parse {
                            line: number,
                            content: line.to_string(),
                            reason: e.to_string(),
                        }
                    }
                    other => other,
                })?;
            stats.edges_loaded += 1;
        }

        let graph = builder.build()?;
        stats.nodes = graph.node_count();
        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            lines = stats.lines_read,
            edges = stats.edges_loaded,
            nodes = stats.nodes,
            "边表导入完成"
        );
        Ok((graph, stats))
    }
}

/// 去掉行尾的 `\r` 并按 UTF-8 解码
fn decode_line(number: usize, bytes: &[u8]) -> Result<&str> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|e| Error::Parse {
        line: number,
        content: String::from_utf8_lossy(bytes).into_owned(),
        reason: format!("不是有效的 UTF-8: {}", e),
    })
}

/// 解析一行边表。空行与注释行返回 `Ok(None)`。
pub fn parse_line(number: usize, line: &str) -> Result<Option<(&str, &str, Capacity)>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let parse_error = |reason: String| Error::Parse {
        line: number,
        content: line.to_string(),
        reason,
    };

    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(parse_error(format!(
            "需要 3 个字段, 实际为 {}",
            fields.len()
        )));
    }

    let capacity: Capacity = fields[2]
        .parse()
        .map_err(|e| parse_error(format!("容量不是整数: {}", e)))?;
    if !(0..=MAX_CAPACITY).contains(&capacity) {
        return Err(parse_error(format!(
            "容量应在 0..={} 之间",
            MAX_CAPACITY
        )));
    }

    Ok(Some((fields[0], fields[1], capacity)))
}

/// 从边表文件导入
pub fn load_edge_list<P: AsRef<Path>>(
    path: P,
    source: &str,
    sink: &str,
) -> Result<(FlowGraph, LoadStats)> {
    EdgeListLoader::new(source, sink).load_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::compute_max_flow;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "source a 4").unwrap();
        writeln!(file, "a sink 3").unwrap();
        writeln!(file, "source   b\t2").unwrap();
        writeln!(file, "b sink 5").unwrap();

        let (mut graph, stats) = load_edge_list(file.path(), "source", "sink").unwrap();
        assert_eq!(stats.lines_read, 4);
        assert_eq!(stats.edges_loaded, 4);
        assert_eq!(stats.nodes, 4);

        let order: Vec<&str> = graph.nodes().map(|(_, name)| name).collect();
        assert_eq!(order, vec!["source", "a", "sink", "b"]);

        assert_eq!(compute_max_flow(&mut graph).unwrap(), 5);
    }

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let input = "# demo\n\nA B 4\n   \nB D 4\n";
        let (graph, stats) = EdgeListLoader::new("A", "D")
            .load_reader(Cursor::new(input))
            .unwrap();
        assert_eq!(stats.lines_read, 5);
        assert_eq!(stats.edges_loaded, 2);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_non_numeric_capacity() {
        let input = "s a 4\na t four\n";
        let err = EdgeListLoader::new("s", "t")
            .load_reader(Cursor::new(input))
            .unwrap_err();
        match err {
            Error::Parse { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "a t four");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_field_count() {
        for input in ["s a\n", "s a 1 2\n"] {
            let err = EdgeListLoader::new("s", "t")
                .load_reader(Cursor::new(input))
                .unwrap_err();
            assert!(err.is_parse_error(), "{:?}", err);
        }
    }

    #[test]
    fn test_negative_capacity() {
        let err = parse_line(7, "s a -3").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 7, .. }));
    }

    #[test]
    fn test_duplicate_edge_names_line() {
        let input = "s a 1\nt a 1\na s 2\n";
        let err = EdgeListLoader::new("s", "t")
            .load_reader(Cursor::new(input))
            .unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));
        assert!(err.to_string().contains("a s 2"));
    }

    #[test]
    fn test_invalid_utf8_names_line() {
        let input: &[u8] = b"s a 4\na \xff 3\n";
        let err = EdgeListLoader::new("s", "t")
            .load_reader(Cursor::new(input))
            .unwrap_err();
        match err {
            Error::Parse { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "a \u{fffd} 3");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = "s a 4\r\na t 3\r\n";
        let (mut graph, stats) = EdgeListLoader::new("s", "t")
            .load_reader(Cursor::new(input))
            .unwrap();
        assert_eq!(stats.lines_read, 2);
        assert_eq!(compute_max_flow(&mut graph).unwrap(), 3);

        let err = EdgeListLoader::new("s", "t")
            .load_reader(Cursor::new("s a 4\r\na t x\r\n"))
            .unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, content, .. } if content == "a t x"));
    }

    #[test]
    fn test_same_source_and_sink() {
        let err = EdgeListLoader::new("x", "x")
            .load_reader(Cursor::new("x y 1\n"))
            .unwrap_err();
        assert!(matches!(err, Error::SameSourceSink(name) if name == "x"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_edge_list("/definitely/not/here.txt", "s", "t").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
