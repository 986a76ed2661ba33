//! 数据导入模块
//!
//! 从纯文本（按行）或 CSV 表格（表头单元格下方的区段）读取对象和链接，
//! 交给 `GraphStore` 去重、插入和绑定。

use crate::error::{Error, Issue, Result};
use crate::graph::{ApplyReport, GraphDelta, GraphStore};
use crate::types::{FileFormat, ImportMode};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// 对象区段的默认表头
pub const VERTEX_HEADER: &str = "Objects";

/// 链接区段的默认表头
pub const EDGE_HEADER: &str = "Links";

/// 导入配置
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// CSV 中标记对象区段的单元格内容
    pub vertex_header: String,
    /// CSV 中标记链接区段的单元格内容
    pub edge_header: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            vertex_header: VERTEX_HEADER.to_string(),
            edge_header: EDGE_HEADER.to_string(),
        }
    }
}

/// 导入统计
#[derive(Debug, Default, Clone)]
pub struct ImportStats {
    pub vertices_imported: usize,
    pub edges_imported: usize,
    /// 被跳过的记录
    pub issues: Vec<Issue>,
    pub duration_ms: u64,
}

impl ImportStats {
    fn from_report(report: ApplyReport, start: Instant) -> Self {
        Self {
            vertices_imported: report.vertices_added.len(),
            edges_imported: report.edges_added.len(),
            issues: report.issues,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    pub fn errors(&self) -> usize {
        self.issues.len()
    }
}

/// 文件导入器
pub struct Importer<'s> {
    store: &'s mut GraphStore,
    config: ImportConfig,
}

impl<'s> Importer<'s> {
    pub fn new(store: &'s mut GraphStore) -> Self {
        Self {
            store,
            config: ImportConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    /// 从文件导入对象，格式由扩展名决定
    pub fn import_vertices<P: AsRef<Path>>(&mut self, path: P, mode: ImportMode) -> Result<ImportStats> {
        let format = FileFormat::from_path(&path)?;
        let file = File::open(&path)?;
        info!(path = %path.as_ref().display(), %format, %mode, "导入对象");
        self.import_vertices_from(BufReader::new(file), format, mode)
    }

    /// 从文件导入链接，格式由扩展名决定
    pub fn import_edges<P: AsRef<Path>>(&mut self, path: P, mode: ImportMode) -> Result<ImportStats> {
        let format = FileFormat::from_path(&path)?;
        let file = File::open(&path)?;
        info!(path = %path.as_ref().display(), %format, %mode, "导入链接");
        self.import_edges_from(BufReader::new(file), format, mode)
    }

    pub fn import_vertices_from<R: BufRead>(
        &mut self,
        reader: R,
        format: FileFormat,
        mode: ImportMode,
    ) -> Result<ImportStats> {
        let start = Instant::now();
        let report = match format {
            FileFormat::Text => {
                let lines = read_lines(reader)?;
                self.store.import_vertex_lines(&lines, mode)
            }
            FileFormat::Csv => {
                let grid = read_grid(reader)?;
                let (row, col) = find_header(&grid, &self.config.vertex_header)?;

                let mut delta = GraphDelta::new();
                if mode == ImportMode::Replace {
                    delta = delta.clear_vertices();
                }
                for r in (row + 1)..grid.len() {
                    let name = cell(&grid, r, col);
                    if name.is_empty() {
                        break;
                    }
                    delta = delta.insert_vertex_at(r + 1, name);
                }
                self.store.apply(delta)
            }
        };
        Ok(ImportStats::from_report(report, start))
    }

    pub fn import_edges_from<R: BufRead>(
        &mut self,
        reader: R,
        format: FileFormat,
        mode: ImportMode,
    ) -> Result<ImportStats> {
        let start = Instant::now();
        let report = match format {
            FileFormat::Text => {
                let lines = read_lines(reader)?;
                self.store.import_edge_lines(&lines, mode)
            }
            FileFormat::Csv => {
                let grid = read_grid(reader)?;
                let (row, col) = find_header(&grid, &self.config.edge_header)?;

                let mut delta = GraphDelta::new();
                if mode == ImportMode::Replace {
                    delta = delta.clear_edges();
                }
                for r in (row + 1)..grid.len() {
                    let (left, right) = (cell(&grid, r, col), cell(&grid, r, col + 1));
                    delta = match (left.is_empty(), right.is_empty()) {
                        (true, true) => break,
                        (false, false) => delta.insert_edge_at(r + 1, left, right),
                        _ => delta.reject(Issue::MalformedLine {
                            line: r + 1,
                            content: format!("{},{}", left, right),
                        }),
                    };
                }
                self.store.apply(delta)
            }
        };
        Ok(ImportStats::from_report(report, start))
    }
}

fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    Ok(reader.lines().collect::<std::io::Result<Vec<_>>>()?)
}

/// 读取整张表，行下标等于物理行号减一
///
/// csv 会跳过完全空白的行，这里补回空记录，保证空行能结束区段。
fn read_grid<R: Read>(reader: R) -> Result<Vec<csv::StringRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut grid: Vec<csv::StringRecord> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record
            .position()
            .map_or(grid.len() + 1, |p| p.line() as usize);
        while grid.len() + 1 < line {
            grid.push(csv::StringRecord::new());
        }
        grid.push(record);
    }
    Ok(grid)
}

/// 按行优先查找第一个内容等于表头的单元格
fn find_header(grid: &[csv::StringRecord], header: &str) -> Result<(usize, usize)> {
    grid.iter()
        .enumerate()
        .find_map(|(r, record)| {
            record
                .iter()
                .position(|c| c.trim() == header)
                .map(|c| (r, c))
        })
        .ok_or_else(|| Error::SectionNotFound(header.to_string()))
}

fn cell(grid: &[csv::StringRecord], row: usize, col: usize) -> &str {
    grid.get(row)
        .and_then(|record| record.get(col))
        .map(str::trim)
        .unwrap_or_default()
}

/// 从文本文件导入对象
pub fn import_vertices<P: AsRef<Path>>(store: &mut GraphStore, path: P, mode: ImportMode) -> Result<ImportStats> {
    Importer::new(store).import_vertices(path, mode)
}

/// 从文本文件导入链接
pub fn import_edges<P: AsRef<Path>>(store: &mut GraphStore, path: P, mode: ImportMode) -> Result<ImportStats> {
    Importer::new(store).import_edges(path, mode)
}
