//! 控制台命令处理
//!
//! 命令可以带 : 前缀，也可以不带

use std::path::Path;

use crate::algorithm::Connectivity;
use crate::cli::printer::{check_vertical_display, PrintMode, Printer};
use crate::graph::{parse_link, GraphStore};
use crate::import::Importer;
use crate::report::ReportWriter;
use crate::types::{ImportMode, EDGE_SEPARATOR};

/// 控制台命令执行结果
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// 继续运行
    Continue,
    /// 退出程序
    Exit,
    /// 显示消息
    Message(String),
    /// 错误
    Error(String),
}

/// 命令作用的集合
#[derive(Debug, Clone, Copy, PartialEq)]
enum Collection {
    Vertices,
    Edges,
}

impl Collection {
    fn parse(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "node" | "nodes" | "object" | "objects" | "vertex" | "vertices" => {
                Some(Collection::Vertices)
            }
            "link" | "links" | "edge" | "edges" => Some(Collection::Edges),
            _ => None,
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Collection::Vertices => "objects",
            Collection::Edges => "links",
        }
    }
}

/// 控制台状态
#[derive(Debug, Default)]
pub struct ConsoleState {
    pub store: GraphStore,
    pub printer: Printer,
    /// 最近一次分析结果，图被修改后失效
    last_analysis: Option<Connectivity>,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: GraphStore) -> Self {
        Self {
            store,
            ..Default::default()
        }
    }

    pub fn last_analysis(&self) -> Option<&Connectivity> {
        self.last_analysis.as_ref()
    }

    fn invalidate(&mut self) {
        self.last_analysis = None;
    }

    fn import(&mut self, collection: Collection, path: &str, mode: ImportMode) -> CommandResult {
        let mut importer = Importer::new(&mut self.store);
        let result = match collection {
            Collection::Vertices => importer.import_vertices(path, mode),
            Collection::Edges => importer.import_edges(path, mode),
        };
        self.invalidate();

        match result {
            Ok(stats) => {
                CommandResult::Message(self.printer.print_import(collection.as_str(), &stats))
            }
            Err(e) => CommandResult::Error(format!("Cannot import {}: {}", path, e)),
        }
    }
}

/// 解析并执行控制台命令
pub fn execute_command(input: &str, state: &mut ConsoleState) -> CommandResult {
    let (input, vertical) = check_vertical_display(input);
    let mode = if vertical {
        PrintMode::Vertical
    } else {
        PrintMode::Table
    };
    state.printer.set_mode(mode);

    // 移除开头的冒号
    let cmd_line = input.strip_prefix(':').unwrap_or(&input);

    let parts: Vec<&str> = cmd_line.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let args = parts.get(1).copied().unwrap_or("").trim();

    match cmd.as_str() {
        "" => CommandResult::Continue,

        "help" | "h" | "?" => CommandResult::Message(get_help_text()),

        "quit" | "q" | "exit" => CommandResult::Exit,

        "load" | "add" => {
            let mode = if cmd == "load" {
                ImportMode::Replace
            } else {
                ImportMode::Append
            };
            match split_target(args) {
                Some((collection, path)) if !path.is_empty() => {
                    state.import(collection, path, mode)
                }
                _ => CommandResult::Error(format!("Usage: {} nodes|links <file>", cmd)),
            }
        }

        "node" => {
            if args.is_empty() {
                return CommandResult::Error("Usage: node <name>".to_string());
            }
            let result = state.store.insert_vertex(args);
            state.invalidate();
            match result {
                Ok(id) => CommandResult::Message(format!("Object #{} created", id)),
                Err(issue) => CommandResult::Error(issue.to_string()),
            }
        }

        "link" => match link_args(args) {
            Some((left, right)) => {
                let result = state.store.insert_edge(&left, &right);
                state.invalidate();
                match result {
                    Ok(id) => CommandResult::Message(format!("Link #{} created", id)),
                    Err(issue) => CommandResult::Error(issue.to_string()),
                }
            }
            None => CommandResult::Error("Usage: link <a> <b> | link a<->b".to_string()),
        },

        "remove" | "rm" => match split_target(args) {
            Some((Collection::Vertices, name)) if !name.is_empty() => {
                let removed = state.store.remove_vertex(name);
                state.invalidate();
                if removed {
                    CommandResult::Message(format!("Object {} removed", name))
                } else {
                    CommandResult::Error(format!("No object named {}", name))
                }
            }
            Some((Collection::Edges, rest)) => match link_args(rest) {
                Some((left, right)) => {
                    let removed = state.store.remove_edge(&left, &right);
                    state.invalidate();
                    if removed {
                        CommandResult::Message(format!("Link {}{}{} removed", left, EDGE_SEPARATOR, right))
                    } else {
                        CommandResult::Error(format!("No link {}{}{}", left, EDGE_SEPARATOR, right))
                    }
                }
                None => CommandResult::Error("Usage: remove link <a> <b>".to_string()),
            },
            _ => CommandResult::Error("Usage: remove node <name> | remove link <a> <b>".to_string()),
        },

        "clear" => {
            match args.to_lowercase().as_str() {
                "" | "all" => state.store.clear(),
                other => match Collection::parse(other) {
                    Some(Collection::Vertices) => state.store.clear_vertices(),
                    Some(Collection::Edges) => state.store.clear_edges(),
                    None => return CommandResult::Error("Usage: clear [nodes|links|all]".to_string()),
                },
            }
            state.invalidate();
            CommandResult::Message("Cleared".to_string())
        }

        "analyze" | "analyse" => {
            let result = state.store.analyze();
            let output = format!(
                "{}{} component(s) found\n",
                state.printer.print_components(&result),
                result.component_count()
            );
            state.last_analysis = Some(result);
            CommandResult::Message(output)
        }

        "show" | "ls" => match args.to_lowercase().as_str() {
            "components" | "comp" => match state.last_analysis() {
                Some(result) => CommandResult::Message(state.printer.print_components(result)),
                None => CommandResult::Error("No analysis yet. Run analyze first.".to_string()),
            },
            "dangling" => CommandResult::Message(state.printer.print_dangling(&state.store)),
            other => match Collection::parse(other) {
                Some(Collection::Vertices) => {
                    CommandResult::Message(state.printer.print_vertices(&state.store))
                }
                Some(Collection::Edges) => {
                    CommandResult::Message(state.printer.print_edges(&state.store))
                }
                None => CommandResult::Error(
                    "Usage: show nodes|links|components|dangling".to_string(),
                ),
            },
        },

        "save" => match split_target(args) {
            Some((collection, path)) if !path.is_empty() => {
                let writer = ReportWriter::new(&state.store);
                let result = match collection {
                    Collection::Vertices => writer.save_vertices(path),
                    Collection::Edges => writer.save_edges(path),
                };
                match result {
                    Ok(()) => CommandResult::Message(format!(
                        "Saved {} to {}",
                        collection.as_str(),
                        path
                    )),
                    Err(e) => CommandResult::Error(format!("Cannot save {}: {}", path, e)),
                }
            }
            _ => CommandResult::Error("Usage: save nodes|links <file>".to_string()),
        },

        "report" => {
            if args.is_empty() {
                return CommandResult::Error("Usage: report <file.txt|file.csv>".to_string());
            }
            if state.last_analysis.is_none() {
                state.last_analysis = Some(state.store.analyze());
            }
            match ReportWriter::new(&state.store).save_report(Path::new(args)) {
                Ok(()) => CommandResult::Message(format!("Report saved to {}", args)),
                Err(e) => CommandResult::Error(format!("Cannot save report: {}", e)),
            }
        }

        "stats" | "info" => {
            let components = state.last_analysis().map(|r| r.component_count());
            CommandResult::Message(state.printer.print_stats(&state.store, components))
        }

        "metrics" => {
            let metrics = state.store.metrics();
            match args.to_lowercase().as_str() {
                "" | "prometheus" | "prom" => {
                    CommandResult::Message(metrics.to_prometheus().content)
                }
                "json" => match serde_json::to_string_pretty(&metrics.snapshot()) {
                    Ok(json) => CommandResult::Message(format!("{}\n", json)),
                    Err(e) => CommandResult::Error(e.to_string()),
                },
                _ => CommandResult::Error("Usage: metrics [prometheus|json]".to_string()),
            }
        }

        _ => CommandResult::Error(format!("Unknown command: {}. Type help for help.", cmd)),
    }
}

/// 拆分 `<集合> <其余参数>`
fn split_target(args: &str) -> Option<(Collection, &str)> {
    let (word, rest) = args.split_once(' ').unwrap_or((args, ""));
    Collection::parse(word).map(|c| (c, rest.trim()))
}

/// 链接参数：`a<->b` 或两个以空白分隔的名称
fn link_args(args: &str) -> Option<(String, String)> {
    if args.contains(EDGE_SEPARATOR) {
        return parse_link(1, args).ok();
    }
    match args.split_whitespace().collect::<Vec<_>>().as_slice() {
        [left, right] => Some((left.to_string(), right.to_string())),
        _ => None,
    }
}

fn get_help_text() -> String {
    r#"
╔═══════════════════════════════════════════════════════════════╗
║                         Commands                              ║
╠═══════════════════════════════════════════════════════════════╣
║ load nodes|links <file>    Replace objects/links from a file  ║
║ add nodes|links <file>     Append objects/links from a file   ║
║ node <name>                Create an object                   ║
║ link <a> <b>, link a<->b   Create a link                      ║
║ remove node <name>         Remove an object                   ║
║ remove link <a> <b>        Remove a link                      ║
║ clear [nodes|links|all]    Clear collections                  ║
║ analyze                    Label connectivity components      ║
║ show nodes|links           List objects or links              ║
║ show components|dangling   Last analysis / missing objects    ║
║ save nodes|links <file>    Save a list (.txt or .csv)         ║
║ report <file>              Save the connectivity report       ║
║ stats                      Show graph statistics              ║
║ metrics [prometheus|json]  Show runtime metrics               ║
║ help, h                    Show this help                     ║
║ quit, q, exit              Exit the program                   ║
╠═══════════════════════════════════════════════════════════════╣
║ Tip: Use \G at end of a show command for vertical display     ║
╚═══════════════════════════════════════════════════════════════╝
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn run(state: &mut ConsoleState, input: &str) -> String {
        match execute_command(input, state) {
            CommandResult::Message(m) => m,
            other => panic!("{} -> {:?}", input, other),
        }
    }

    #[test]
    fn test_build_and_analyze() {
        let mut state = ConsoleState::new();
        run(&mut state, "node A");
        run(&mut state, ":node B");
        run(&mut state, "node C");
        run(&mut state, "link A B");
        run(&mut state, "link B <-> C");

        let output = run(&mut state, "analyze");
        assert!(output.ends_with("1 component(s) found\n"));
        assert_eq!(state.last_analysis().unwrap().label_of("C"), Some(1));

        // 修改后分析结果失效
        run(&mut state, "node D");
        assert!(state.last_analysis().is_none());
        assert!(matches!(
            execute_command("show components", &mut state),
            CommandResult::Error(_)
        ));
    }

    #[test]
    fn test_duplicates_are_errors() {
        let mut state = ConsoleState::new();
        run(&mut state, "node A");
        run(&mut state, "link A B");

        assert!(matches!(execute_command("node A", &mut state), CommandResult::Error(_)));
        assert!(matches!(execute_command("link B A", &mut state), CommandResult::Error(_)));
        assert!(matches!(execute_command("link A", &mut state), CommandResult::Error(_)));
        assert_eq!(state.store.edge_count(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut state = ConsoleState::new();
        run(&mut state, "node A");
        run(&mut state, "node B");
        run(&mut state, "link A<->B");

        run(&mut state, "remove node A");
        assert_eq!(state.store.dangling_endpoints().len(), 1);
        assert!(matches!(
            execute_command("remove node A", &mut state),
            CommandResult::Error(_)
        ));

        run(&mut state, "remove link B A");
        assert_eq!(state.store.edge_count(), 0);

        run(&mut state, "clear");
        assert!(state.store.is_empty());
    }

    #[test]
    fn test_load_add_save_report() {
        let dir = TempDir::new().unwrap();
        let nodes = dir.path().join("nodes.txt");
        let links = dir.path().join("links.txt");
        let mut f = std::fs::File::create(&nodes).unwrap();
        writeln!(f, "X\nY\nZ").unwrap();
        let mut f = std::fs::File::create(&links).unwrap();
        writeln!(f, "X<->Y").unwrap();

        let mut state = ConsoleState::new();
        let output = run(&mut state, &format!("load nodes {}", nodes.display()));
        assert!(output.starts_with("Imported 3 objects (0 skipped"));
        let output = run(&mut state, &format!("add links {}", links.display()));
        assert!(output.starts_with("Imported 1 links"));

        // 再次追加同一文件全部重复
        let output = run(&mut state, &format!("add nodes {}", nodes.display()));
        assert!(output.contains("3 skipped"));
        run(&mut state, &format!("load nodes {}", nodes.display()));
        assert_eq!(state.store.vertex_count(), 3);

        let report = dir.path().join("report.txt");
        run(&mut state, &format!("report {}", report.display()));
        let text = std::fs::read_to_string(&report).unwrap();
        assert!(text.contains("Z : 2\n"));
        assert!(text.contains("X<->Y : 1\n"));

        let saved = dir.path().join("saved.csv");
        run(&mut state, &format!("save links {}", saved.display()));
        let saved = std::fs::read_to_string(&saved).unwrap();
        assert_eq!(saved.lines().collect::<Vec<_>>(), vec!["Links,", "X,Y"]);
    }

    #[test]
    fn test_missing_file_and_usage() {
        let mut state = ConsoleState::new();
        assert!(matches!(
            execute_command("load nodes /nonexistent/nodes.txt", &mut state),
            CommandResult::Error(_)
        ));
        assert!(matches!(execute_command("load", &mut state), CommandResult::Error(_)));
        assert!(matches!(execute_command("frobnicate", &mut state), CommandResult::Error(_)));
        assert_eq!(execute_command("  ", &mut state), CommandResult::Continue);
        assert_eq!(execute_command(":q", &mut state), CommandResult::Exit);
    }

    #[test]
    fn test_stats_and_metrics() {
        let mut state = ConsoleState::new();
        run(&mut state, "node A");
        run(&mut state, "analyze");

        let stats = run(&mut state, "stats");
        assert!(stats.contains("Object Count"));
        let prom = run(&mut state, "metrics");
        assert!(prom.contains("linkgraph_analyses_total 1"));
        let json = run(&mut state, "metrics json");
        assert!(json.contains("\"vertices_inserted\": 1"));
    }

    #[test]
    fn test_vertical_show() {
        let mut state = ConsoleState::new();
        run(&mut state, "node A");
        let output = run(&mut state, "show nodes\\G");
        assert!(output.contains("1. row"));
        assert_eq!(state.printer.mode(), PrintMode::Vertical);
    }
}
