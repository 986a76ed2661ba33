//! LinkGraph 批量分析工具
//!
//! 读取对象和链接文件，执行连通分量分析并输出报告

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use linkgraph::{FileFormat, GraphStore, ImportMode, ImportStats, Importer, ReportWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "linkgraph-import")]
#[command(about = "LinkGraph 连通分量分析工具")]
struct Args {
    /// 对象文件（.txt 或 .csv），可重复指定，之后的文件追加导入
    #[arg(short = 'n', long = "vertices")]
    vertices: Vec<PathBuf>,

    /// 链接文件（.txt 或 .csv），可重复指定，之后的文件追加导入
    #[arg(short, long)]
    edges: Vec<PathBuf>,

    /// 报告输出路径
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// 报告格式: txt, csv（默认按扩展名判断）
    #[arg(short, long)]
    format: Option<FileFormat>,

    /// 结束时打印 Prometheus 格式指标
    #[arg(long)]
    metrics: bool,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    println!("{}", "LinkGraph 连通分量分析工具".bold());
    println!("==========================");

    let mut store = GraphStore::new();

    for (i, path) in args.vertices.iter().enumerate() {
        let stats = Importer::new(&mut store)
            .import_vertices(path, mode_for(i))
            .with_context(|| format!("无法导入对象文件 {}", path.display()))?;
        print_import("对象", path, &stats);
    }
    for (i, path) in args.edges.iter().enumerate() {
        let stats = Importer::new(&mut store)
            .import_edges(path, mode_for(i))
            .with_context(|| format!("无法导入链接文件 {}", path.display()))?;
        print_import("链接", path, &stats);
    }

    let result = store.analyze();

    println!("\n分析完成!");
    println!("  对象数: {}", store.vertex_count());
    println!("  链接数: {}", store.edge_count());
    println!("  缺失对象的端点: {}", store.dangling_endpoints().len());
    println!("  连通分量: {}", result.component_count().to_string().green());
    for component in result.components() {
        println!(
            "    {:>4}: {} ({} 个成员)",
            component.label,
            component.member_names().join(", "),
            component.size()
        );
    }

    if let Some(path) = &args.report {
        write_report(&store, path, args.format)
            .with_context(|| format!("无法写入报告 {}", path.display()))?;
        println!("\n报告已保存: {}", path.display());
    }

    if args.metrics {
        print!("\n{}", store.metrics().to_prometheus().content);
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// 第一个文件替换，其余追加
fn mode_for(index: usize) -> ImportMode {
    if index == 0 {
        ImportMode::Replace
    } else {
        ImportMode::Append
    }
}

fn print_import(what: &str, path: &Path, stats: &ImportStats) {
    let imported = stats.vertices_imported + stats.edges_imported;
    let skipped = if stats.errors() > 0 {
        stats.errors().to_string().yellow()
    } else {
        stats.errors().to_string().normal()
    };
    println!(
        "{} {}: 导入 {} 条{}，跳过 {} 条 ({} ms)",
        "✔".green(),
        path.display(),
        imported,
        what,
        skipped,
        stats.duration_ms
    );
    for issue in &stats.issues {
        println!("    {}", issue.to_string().dimmed());
    }
}

fn write_report(store: &GraphStore, path: &Path, format: Option<FileFormat>) -> Result<()> {
    let writer = ReportWriter::new(store);
    match format {
        Some(format) => {
            let mut out = BufWriter::new(File::create(path)?);
            writer.write_report(&mut out, format)?;
            out.flush()?;
        }
        None => writer.save_report(path)?,
    }
    Ok(())
}
