//! 命令补全器
//!
//! 基于 rustyline 实现 Tab 补全功能

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// 命令列表
const COMMANDS: &[&str] = &[
    "load", "add", "node", "link", "remove", "clear", "analyze", "show", "save",
    "report", "stats", "metrics", "help", "quit", "exit",
];

/// 子命令映射
fn get_sub_commands(command: &str) -> Option<&'static [&'static str]> {
    match command {
        "load" | "add" | "save" => Some(&["nodes", "links"]),
        "remove" | "rm" => Some(&["node", "link"]),
        "clear" => Some(&["nodes", "links", "all"]),
        "show" | "ls" => Some(&["nodes", "links", "components", "dangling"]),
        "metrics" => Some(&["prometheus", "json"]),
        _ => None,
    }
}

fn pairs<'a>(candidates: impl Iterator<Item = &'a &'static str>) -> Vec<Pair> {
    candidates
        .map(|c| Pair {
            display: c.to_string(),
            replacement: c.to_string(),
        })
        .collect()
}

/// LinkGraph CLI 补全器
#[derive(Default)]
pub struct CommandCompleter;

impl CommandCompleter {
    pub fn new() -> Self {
        Self
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];
        let words: Vec<&str> = line_to_cursor.split_whitespace().collect();

        // 光标在空格之后：提示下一个单词
        if line_to_cursor.is_empty() || line_to_cursor.ends_with(' ') {
            return Ok(match words.as_slice() {
                [] => (pos, pairs(COMMANDS.iter())),
                [command] => {
                    let command = command.trim_start_matches(':').to_lowercase();
                    match get_sub_commands(&command) {
                        Some(subs) => (pos, pairs(subs.iter())),
                        None => (pos, vec![]),
                    }
                }
                _ => (pos, vec![]),
            });
        }

        // 补全当前正在输入的单词
        let current = words.last().copied().unwrap_or_default();
        let start_pos = pos - current.len();
        let lower = current.to_lowercase();

        match words.len() {
            1 => {
                let prefix = lower.trim_start_matches(':');
                let offset = current.len() - prefix.len();
                let completions = pairs(COMMANDS.iter().filter(|c| c.starts_with(prefix)));
                Ok((start_pos + offset, completions))
            }
            2 => {
                let command = words[0].trim_start_matches(':').to_lowercase();
                match get_sub_commands(&command) {
                    Some(subs) => {
                        let completions = pairs(subs.iter().filter(|s| s.starts_with(&lower)));
                        Ok((start_pos, completions))
                    }
                    None => Ok((pos, vec![])),
                }
            }
            _ => Ok((pos, vec![])),
        }
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl Helper for CommandCompleter {}
