//! LinkGraph CLI 工具
//!
//! 交互式命令行界面

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use linkgraph::cli::{execute_command, CommandCompleter, CommandResult, ConsoleState};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const HISTORY_FILE: &str = ".linkgraph_history";

#[derive(Parser, Debug)]
#[command(name = "linkgraph-cli")]
#[command(about = "LinkGraph 命令行工具")]
struct Args {
    /// 启动时加载的对象文件
    #[arg(short = 'n', long)]
    vertices: Option<PathBuf>,

    /// 启动时加载的链接文件
    #[arg(short = 'l', long)]
    edges: Option<PathBuf>,

    /// 执行命令后退出，可重复指定
    #[arg(short = 'e', long)]
    execute: Vec<String>,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long, default_value = "error")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut state = ConsoleState::new();

    if let Some(path) = &args.vertices {
        handle_command(&mut state, &format!("load nodes {}", path.display()));
    }
    if let Some(path) = &args.edges {
        handle_command(&mut state, &format!("load links {}", path.display()));
    }

    // 单命令模式
    if !args.execute.is_empty() {
        for command in &args.execute {
            if !handle_command(&mut state, command) {
                break;
            }
        }
        return Ok(());
    }

    println!("{}", "LinkGraph CLI - 无向图连通分量分析".bold());
    println!("==================================");
    println!("\n输入 'help' 查看命令列表，'quit' 退出\n");

    let mut rl: Editor<CommandCompleter, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CommandCompleter::new()));

    let history = dirs::home_dir().map(|home| home.join(HISTORY_FILE));
    if let Some(path) = &history {
        if rl.load_history(path).is_err() {
            debug!(path = %path.display(), "没有历史记录");
        }
    }

    loop {
        match rl.readline("linkgraph> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;
                if !handle_command(&mut state, line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("输入 'quit' 退出");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(path) = &history {
        if let Err(e) = rl.save_history(path) {
            debug!(error = %e, "无法保存历史记录");
        }
    }

    println!("再见！");
    Ok(())
}

/// 执行一条命令，返回 false 表示退出
fn handle_command(state: &mut ConsoleState, input: &str) -> bool {
    match execute_command(input, state) {
        CommandResult::Continue => {}
        CommandResult::Exit => return false,
        CommandResult::Message(message) => {
            if message.ends_with('\n') {
                print!("{}", message);
            } else {
                println!("{}", message);
            }
        }
        CommandResult::Error(message) => {
            eprintln!("{} {}", "错误:".red(), message);
        }
    }
    true
}
