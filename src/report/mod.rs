//! 报告导出模块
//!
//! 把分析后的对象、链接及其连通分量标签写成文本或 CSV 表格，
//! 同时提供不带标签的对象列表和链接列表的保存。

use crate::error::Result;
use crate::graph::GraphStore;
use crate::import::{EDGE_HEADER, VERTEX_HEADER};
use crate::types::{FileFormat, LABEL_SEPARATOR};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// 报告配置
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// 文本报告中对象部分的标题
    pub vertex_title: String,
    /// 文本报告中链接部分的标题
    pub edge_title: String,
    /// CSV 表格中对象区段的表头
    pub vertex_header: String,
    /// CSV 表格中链接区段的表头
    pub edge_header: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            vertex_title: "Objects and their connectivity components:".to_string(),
            edge_title: "Links and their connectivity components:".to_string(),
            vertex_header: VERTEX_HEADER.to_string(),
            edge_header: EDGE_HEADER.to_string(),
        }
    }
}

/// 报告写出器，只读取存储中的当前标签
pub struct ReportWriter<'s> {
    store: &'s GraphStore,
    config: ReportConfig,
}

impl<'s> ReportWriter<'s> {
    pub fn new(store: &'s GraphStore) -> Self {
        Self {
            store,
            config: ReportConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReportConfig) -> Self {
        self.config = config;
        self
    }

    // ==================== 连通性报告 ====================

    /// 保存连通性报告，格式由扩展名决定
    pub fn save_report<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let format = FileFormat::from_path(&path)?;
        let mut out = BufWriter::new(File::create(&path)?);
        self.write_report(&mut out, format)?;
        out.flush()?;
        info!(path = %path.as_ref().display(), %format, "报告已保存");
        Ok(())
    }

    pub fn write_report<W: Write>(&self, out: W, format: FileFormat) -> Result<()> {
        match format {
            FileFormat::Text => self.write_text_report(out),
            FileFormat::Csv => self.write_csv_report(out),
        }
    }

    fn write_text_report<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, "{}", self.config.vertex_title)?;
        for v in self.store.vertices() {
            writeln!(out, "{}{}{}", v.name(), LABEL_SEPARATOR, v.component())?;
        }

        writeln!(out)?;
        writeln!(out, "{}", self.config.edge_title)?;
        for e in self.store.edges() {
            writeln!(out, "{}{}{}", e, LABEL_SEPARATOR, e.component())?;
        }
        Ok(())
    }

    /// 两个区段并排：对象占第 1-2 列，链接占第 4-6 列
    fn write_csv_report<W: Write>(&self, out: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record([
            self.config.vertex_header.as_str(),
            "",
            "",
            self.config.edge_header.as_str(),
            "",
            "",
        ])?;

        let vertices: Vec<_> = self.store.vertices().collect();
        let edges: Vec<_> = self.store.edges().collect();
        for row in 0..vertices.len().max(edges.len()) {
            let mut record = vec![String::new(); 6];
            if let Some(v) = vertices.get(row) {
                record[0] = v.name().to_string();
                record[1] = v.component().to_string();
            }
            if let Some(e) = edges.get(row) {
                record[3] = e.left().name().to_string();
                record[4] = e.right().name().to_string();
                record[5] = e.component().to_string();
            }
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }

    // ==================== 列表保存 ====================

    /// 保存对象列表，可被导入模块重新读取
    pub fn save_vertices<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let format = FileFormat::from_path(&path)?;
        let mut out = BufWriter::new(File::create(&path)?);
        self.write_vertices(&mut out, format)?;
        out.flush()?;
        info!(path = %path.as_ref().display(), count = self.store.vertex_count(), "对象列表已保存");
        Ok(())
    }

    pub fn write_vertices<W: Write>(&self, mut out: W, format: FileFormat) -> Result<()> {
        match format {
            FileFormat::Text => {
                for v in self.store.vertices() {
                    writeln!(out, "{}", v.name())?;
                }
            }
            FileFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(out);
                wtr.write_record([self.config.vertex_header.as_str()])?;
                for v in self.store.vertices() {
                    wtr.write_record([v.name()])?;
                }
                wtr.flush()?;
            }
        }
        Ok(())
    }

    /// 保存链接列表，可被导入模块重新读取
    pub fn save_edges<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let format = FileFormat::from_path(&path)?;
        let mut out = BufWriter::new(File::create(&path)?);
        self.write_edges(&mut out, format)?;
        out.flush()?;
        info!(path = %path.as_ref().display(), count = self.store.edge_count(), "链接列表已保存");
        Ok(())
    }

    pub fn write_edges<W: Write>(&self, mut out: W, format: FileFormat) -> Result<()> {
        match format {
            FileFormat::Text => {
                for e in self.store.edges() {
                    writeln!(out, "{}", e)?;
                }
            }
            FileFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(out);
                wtr.write_record([self.config.edge_header.as_str(), ""])?;
                for e in self.store.edges() {
                    wtr.write_record([e.left().name(), e.right().name()])?;
                }
                wtr.flush()?;
            }
        }
        Ok(())
    }
}

/// 保存连通性报告
pub fn save_report<P: AsRef<Path>>(store: &GraphStore, path: P) -> Result<()> {
    ReportWriter::new(store).save_report(path)
}

pub fn save_vertices<P: AsRef<Path>>(store: &GraphStore, path: P) -> Result<()> {
    ReportWriter::new(store).save_vertices(path)
}

pub fn save_edges<P: AsRef<Path>>(store: &GraphStore, path: P) -> Result<()> {
    ReportWriter::new(store).save_edges(path)
}
