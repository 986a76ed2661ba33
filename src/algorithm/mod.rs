//! 图算法模块
//!
//! 无向图连通分量分析

mod connectivity;

pub use connectivity::{Component, Connectivity, ConnectivityAnalyzer, Member};
