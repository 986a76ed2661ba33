//! 结果打印器
//!
//! 提供表格和垂直格式的结果输出

use crate::algorithm::Connectivity;
use crate::error::Issue;
use crate::graph::GraphStore;
use crate::import::ImportStats;
use prettytable::{format, row, Cell, Row, Table};

/// 打印模式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrintMode {
    /// 表格模式
    Table,
    /// 垂直模式 (\G)
    Vertical,
}

/// 结果打印器
#[derive(Debug)]
pub struct Printer {
    mode: PrintMode,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(PrintMode::Table)
    }
}

impl Printer {
    pub fn new(mode: PrintMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PrintMode {
        self.mode
    }

    /// 设置打印模式
    pub fn set_mode(&mut self, mode: PrintMode) {
        self.mode = mode;
    }

    /// 打印通用结果集
    pub fn print_result(&self, columns: &[&str], rows: &[Vec<String>]) -> String {
        if columns.is_empty() || rows.is_empty() {
            return "Empty set\n".to_string();
        }

        let output = match self.mode {
            PrintMode::Table => self.format_table(columns, rows),
            PrintMode::Vertical => self.format_vertical(columns, rows),
        };

        format!("{}\n{} row(s) in set\n", output, rows.len())
    }

    /// 表格格式
    fn format_table(&self, columns: &[&str], rows: &[Vec<String>]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        let header: Vec<Cell> = columns.iter().map(|c| Cell::new(c)).collect();
        table.set_titles(Row::new(header));

        for row_data in rows {
            let cells: Vec<Cell> = row_data.iter().map(|v| Cell::new(v)).collect();
            table.add_row(Row::new(cells));
        }

        table.to_string()
    }

    /// 垂直格式
    fn format_vertical(&self, columns: &[&str], rows: &[Vec<String>]) -> String {
        let max_col_width = columns.iter().map(|c| c.len()).max().unwrap_or(0);
        let mut output = String::new();

        for (i, row_data) in rows.iter().enumerate() {
            output.push_str(&format!(
                "*************************** {}. row ***************************\n",
                i + 1
            ));

            for (j, col) in columns.iter().enumerate() {
                let value = row_data.get(j).map(|s| s.as_str()).unwrap_or("");
                output.push_str(&format!("{:>width$}: {}\n", col, value, width = max_col_width));
            }
        }

        output
    }

    /// 对象列表
    pub fn print_vertices(&self, store: &GraphStore) -> String {
        let rows: Vec<Vec<String>> = store
            .vertices()
            .map(|v| {
                vec![
                    v.id().to_string(),
                    v.name().to_string(),
                    v.degree().to_string(),
                    v.component().to_string(),
                ]
            })
            .collect();
        self.print_result(&["ID", "Name", "Degree", "Component"], &rows)
    }

    /// 链接列表
    pub fn print_edges(&self, store: &GraphStore) -> String {
        let rows: Vec<Vec<String>> = store
            .edges()
            .map(|e| {
                let dangling: Vec<&str> = e
                    .endpoints()
                    .iter()
                    .filter(|end| end.is_placeholder())
                    .map(|end| end.name())
                    .collect();
                vec![
                    e.id().to_string(),
                    e.to_string(),
                    e.component().to_string(),
                    dangling.join(", "),
                ]
            })
            .collect();
        self.print_result(&["ID", "Link", "Component", "Dangling"], &rows)
    }

    /// 连通分量列表
    pub fn print_components(&self, result: &Connectivity) -> String {
        let rows: Vec<Vec<String>> = result
            .components()
            .iter()
            .map(|c| {
                let members: Vec<String> = c
                    .members
                    .iter()
                    .map(|m| {
                        if m.placeholder {
                            format!("{}?", m.name)
                        } else {
                            m.name.clone()
                        }
                    })
                    .collect();
                vec![
                    c.label.to_string(),
                    c.size().to_string(),
                    c.edges.len().to_string(),
                    members.join(", "),
                ]
            })
            .collect();
        self.print_result(&["Component", "Size", "Links", "Members"], &rows)
    }

    /// 没有对应对象的链接端点
    pub fn print_dangling(&self, store: &GraphStore) -> String {
        let rows: Vec<Vec<String>> = store
            .dangling_endpoints()
            .into_iter()
            .map(|(id, name)| vec![id.to_string(), name.to_string()])
            .collect();
        self.print_result(&["Link ID", "Missing Object"], &rows)
    }

    /// 打印统计信息
    pub fn print_stats(&self, store: &GraphStore, components: Option<usize>) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(row!["Property", "Value"]);
        table.add_row(row!["Object Count", store.vertex_count().to_string()]);
        table.add_row(row!["Link Count", store.edge_count().to_string()]);
        table.add_row(row![
            "Dangling Endpoints",
            store.dangling_endpoints().len().to_string()
        ]);
        table.add_row(row![
            "Components",
            components.map_or_else(|| "-".to_string(), |n| n.to_string())
        ]);
        table.to_string()
    }

    /// 导入结果摘要
    pub fn print_import(&self, what: &str, stats: &ImportStats) -> String {
        let imported = stats.vertices_imported + stats.edges_imported;
        let mut output = format!(
            "Imported {} {} ({} skipped, {} ms)\n",
            imported,
            what,
            stats.errors(),
            stats.duration_ms
        );
        output.push_str(&self.print_issues(&stats.issues));
        output
    }

    pub fn print_issues(&self, issues: &[Issue]) -> String {
        issues.iter().map(|issue| format!("  - {}\n", issue)).collect()
    }
}

/// 检查命令是否以 \G 结尾（垂直显示）
pub fn check_vertical_display(input: &str) -> (String, bool) {
    let trimmed = input.trim();
    if trimmed.ends_with("\\G") || trimmed.ends_with("\\g") {
        let clean = trimmed[..trimmed.len() - 2].trim().to_string();
        (clean, true)
    } else {
        (trimmed.to_string(), false)
    }
}
