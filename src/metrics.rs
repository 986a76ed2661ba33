//! 运行指标收集模块
//!
//! 每个 `GraphStore` 持有自己的指标实例，不使用进程级全局状态

use crate::error::Issue;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 图存储指标
#[derive(Debug)]
pub struct Metrics {
    /// 图操作统计
    graph_stats: GraphStats,
    /// 分析统计
    analysis_stats: AnalysisStats,
    /// 创建时间
    start_time: Instant,
}

/// 图操作统计
#[derive(Debug, Default)]
struct GraphStats {
    vertices_inserted: AtomicU64,
    edges_inserted: AtomicU64,
    vertices_removed: AtomicU64,
    edges_removed: AtomicU64,
    /// 重复对象/链接
    duplicates_rejected: AtomicU64,
    /// 格式错误的行和空名称
    malformed_records: AtomicU64,
}

/// 分析统计
#[derive(Debug, Default)]
struct AnalysisStats {
    total_runs: AtomicU64,
    /// 分析总耗时（微秒）
    total_duration_us: AtomicU64,
    last_component_count: AtomicU64,
}

/// 可导出的指标快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    // 图操作指标
    pub vertices_inserted: u64,
    pub edges_inserted: u64,
    pub vertices_removed: u64,
    pub edges_removed: u64,
    pub duplicates_rejected: u64,
    pub malformed_records: u64,

    // 分析指标
    pub analyses_run: u64,
    pub avg_analysis_duration_ms: f64,
    pub last_component_count: u64,

    pub uptime_seconds: u64,
}

/// Prometheus 格式指标
#[derive(Debug, Clone)]
pub struct PrometheusMetrics {
    pub content: String,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            graph_stats: GraphStats::default(),
            analysis_stats: AnalysisStats::default(),
            start_time: Instant::now(),
        }
    }

    pub fn record_vertex_insert(&self, count: usize) {
        self.graph_stats
            .vertices_inserted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_edge_insert(&self, count: usize) {
        self.graph_stats
            .edges_inserted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_removal(&self, vertices: usize, edges: usize) {
        self.graph_stats
            .vertices_removed
            .fetch_add(vertices as u64, Ordering::Relaxed);
        self.graph_stats
            .edges_removed
            .fetch_add(edges as u64, Ordering::Relaxed);
    }

    /// 记录被跳过的记录
    pub fn record_issue(&self, issue: &Issue) {
        let counter = if issue.is_duplicate() {
            &self.graph_stats.duplicates_rejected
        } else {
            &self.graph_stats.malformed_records
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录分析开始
    pub fn record_analysis_start(&self) -> AnalysisTimer {
        self.analysis_stats.total_runs.fetch_add(1, Ordering::Relaxed);
        AnalysisTimer::new()
    }

    /// 记录分析完成
    pub fn record_analysis_complete(&self, timer: AnalysisTimer, components: usize) {
        self.analysis_stats
            .total_duration_us
            .fetch_add(timer.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.analysis_stats
            .last_component_count
            .store(components as u64, Ordering::Relaxed);
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        let runs = self.analysis_stats.total_runs.load(Ordering::Relaxed);
        let total_duration_us = self.analysis_stats.total_duration_us.load(Ordering::Relaxed);

        let avg_analysis_duration_ms = if runs > 0 {
            (total_duration_us as f64) / (runs as f64) / 1000.0
        } else {
            0.0
        };

        MetricsSnapshot {
            vertices_inserted: self.graph_stats.vertices_inserted.load(Ordering::Relaxed),
            edges_inserted: self.graph_stats.edges_inserted.load(Ordering::Relaxed),
            vertices_removed: self.graph_stats.vertices_removed.load(Ordering::Relaxed),
            edges_removed: self.graph_stats.edges_removed.load(Ordering::Relaxed),
            duplicates_rejected: self.graph_stats.duplicates_rejected.load(Ordering::Relaxed),
            malformed_records: self.graph_stats.malformed_records.load(Ordering::Relaxed),
            analyses_run: runs,
            avg_analysis_duration_ms,
            last_component_count: self
                .analysis_stats
                .last_component_count
                .load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// 导出为 Prometheus 格式
    pub fn to_prometheus(&self) -> PrometheusMetrics {
        let s = self.snapshot();
        let series: [(&str, &str, &str, String); 9] = [
            ("vertices_inserted_total", "counter", "Total vertices inserted", s.vertices_inserted.to_string()),
            ("edges_inserted_total", "counter", "Total edges inserted", s.edges_inserted.to_string()),
            ("vertices_removed_total", "counter", "Total vertices removed", s.vertices_removed.to_string()),
            ("edges_removed_total", "counter", "Total edges removed", s.edges_removed.to_string()),
            ("duplicates_rejected_total", "counter", "Duplicate vertices or links rejected", s.duplicates_rejected.to_string()),
            ("malformed_records_total", "counter", "Malformed lines and blank names skipped", s.malformed_records.to_string()),
            ("analyses_total", "counter", "Connectivity analyses run", s.analyses_run.to_string()),
            ("analysis_duration_avg_ms", "gauge", "Average analysis duration in milliseconds", format!("{:.3}", s.avg_analysis_duration_ms)),
            ("components", "gauge", "Component count of the last analysis", s.last_component_count.to_string()),
        ];

        let mut content = String::new();
        for (name, kind, help, value) in series {
            content.push_str(&format!("# HELP linkgraph_{} {}\n", name, help));
            content.push_str(&format!("# TYPE linkgraph_{} {}\n", name, kind));
            content.push_str(&format!("linkgraph_{} {}\n", name, value));
        }

        PrometheusMetrics { content }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// 分析计时器
pub struct AnalysisTimer {
    start: Instant,
}

impl AnalysisTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_snapshot() {
        let metrics = Metrics::new();

        metrics.record_vertex_insert(3);
        metrics.record_edge_insert(1);
        metrics.record_issue(&Issue::DuplicateVertex {
            name: "A".to_string(),
            line: None,
        });
        metrics.record_issue(&Issue::MalformedLine {
            line: 2,
            content: "x".to_string(),
        });
        let timer = metrics.record_analysis_start();
        metrics.record_analysis_complete(timer, 4);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.vertices_inserted, 3);
        assert_eq!(snapshot.edges_inserted, 1);
        assert_eq!(snapshot.duplicates_rejected, 1);
        assert_eq!(snapshot.malformed_records, 1);
        assert_eq!(snapshot.analyses_run, 1);
        assert_eq!(snapshot.last_component_count, 4);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = Metrics::new();
        metrics.record_vertex_insert(1);

        let prom = metrics.to_prometheus();
        assert!(prom.content.contains("linkgraph_vertices_inserted_total 1"));
        assert!(prom.content.contains("# TYPE linkgraph_components gauge"));
    }
}
