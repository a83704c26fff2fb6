//! 입력 중인 명령의 자동완성 후보 생성.

use std::iter;

use crate::domain::argparser::{PartialLine, split_partial};
use crate::domain::cmd::{CommandTree, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Group,
    Command,
    Option,
}

/// 자동완성 후보 하나.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// 입력 중인 단어를 대체할 문자열
    pub text: String,
    /// 대체가 시작되는 바이트 오프셋
    pub start: usize,
    pub description: String,
    pub kind: CompletionKind,
}

/// 부분 입력에 대한 후보를 지연 시퀀스로 돌려준다.
pub trait Complete {
    fn complete<'a>(&'a self, input: &'a str) -> Box<dyn Iterator<Item = Completion> + 'a>;
}

/// 명령 트리 스냅샷 기반 자동완성기.
/// 세션이 명령 구성을 바꿀 때마다 새로 만든다.
#[derive(Debug, Clone, Default)]
pub struct CommandCompleter {
    tree: CommandTree,
}

impl CommandCompleter {
    pub fn new(tree: CommandTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }
}

impl Complete for CommandCompleter {
    fn complete<'a>(&'a self, input: &'a str) -> Box<dyn Iterator<Item = Completion> + 'a> {
        let PartialLine {
            words,
            current,
            start,
        } = split_partial(input);
        let mut level = &self.tree;
        let mut command = None;

        for word in &words {
            match level.get(word) {
                Some(Node::Group(group)) => level = group,
                Some(Node::Command(cmd)) => {
                    command = Some(cmd);
                    break;
                }
                None => return Box::new(iter::empty()),
            }
        }

        if let Some(cmd) = command {
            // 명령 이후에는 선언된 옵션 이름만 완성한다.
            let Some(spec) = cmd.arg_spec() else {
                return Box::new(iter::empty());
            };
            if !current.starts_with('-') {
                return Box::new(iter::empty());
            }
            return Box::new(
                spec.option_names()
                    .filter(move |name| name.starts_with(current.as_str()))
                    .filter(move |name| !words.contains(name))
                    .map(move |name| Completion {
                        text: name,
                        start,
                        description: String::new(),
                        kind: CompletionKind::Option,
                    }),
            );
        }

        Box::new(
            level
                .iter_prefixed(current)
                .map(move |(name, node)| match node {
                    Node::Command(cmd) => Completion {
                        text: name.to_string(),
                        start,
                        description: cmd.description().to_string(),
                        kind: CompletionKind::Command,
                    },
                    Node::Group(group) => Completion {
                        text: name.to_string(),
                        start,
                        description: format!("{} sub-commands", group.len()),
                        kind: CompletionKind::Group,
                    },
                }),
        )
    }
}

/// 후보를 입력에 적용하고 다음 단어를 위해 공백을 붙인다.
pub fn apply_completion(input: &str, completion: &Completion) -> String {
    let head = input.get(..completion.start).unwrap_or(input);
    let text = if completion.text.chars().any(char::is_whitespace) {
        format!("\"{}\"", completion.text)
    } else {
        completion.text.clone()
    };
    format!("{head}{text} ")
}

/// 후보들의 공통 접두사. 후보가 없으면 `None`.
pub fn common_prefix(candidates: &[Completion]) -> Option<String> {
    let (first, rest) = candidates.split_first()?;
    let mut prefix = first.text.as_str();
    for candidate in rest {
        let shared = prefix
            .char_indices()
            .zip(candidate.text.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((idx, ch), _)| idx + ch.len_utf8())
            .unwrap_or(0);
        prefix = &prefix[..shared];
    }
    Some(prefix.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::argparser::ArgSpec;
    use crate::domain::cmd::Command;

    fn completer() -> CommandCompleter {
        let net = CommandTree::new()
            .with_command(Command::new("ping", |_| Ok(())).describe("send echo"))
            .unwrap()
            .with_command(Command::new("show", |_| Ok(())))
            .unwrap();
        let tree = CommandTree::new()
            .with_command(Command::new("start", |_| Ok(())))
            .unwrap()
            .with_command(Command::new("status", |_| Ok(())))
            .unwrap()
            .with_command(Command::new("stop", |_| Ok(())))
            .unwrap()
            .with_command(
                Command::new("deploy", |_| Ok(())).args(
                    ArgSpec::new()
                        .required("env")
                        .short_flag('f', "force")
                        .flag("dry-run"),
                ),
            )
            .unwrap()
            .with_group("net", net)
            .unwrap();
        CommandCompleter::new(tree)
    }

    fn texts(c: &CommandCompleter, input: &str) -> Vec<String> {
        c.complete(input).map(|c| c.text).collect()
    }

    #[test]
    fn completes_top_level_prefix() {
        let c = completer();
        assert_eq!(texts(&c, "st"), vec!["start", "status", "stop"]);
        assert_eq!(texts(&c, "").len(), 5);
    }

    #[test]
    fn completes_nested_group() {
        let c = completer();
        let all: Vec<Completion> = c.complete("net p").collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].text, "ping");
        assert_eq!(all[0].start, 4);
        assert_eq!(all[0].description, "send echo");
        assert_eq!(texts(&c, "net "), vec!["ping", "show"]);
    }

    #[test]
    fn group_candidates_are_marked() {
        let c = completer();
        let all: Vec<Completion> = c.complete("n").collect();
        assert_eq!(all[0].kind, CompletionKind::Group);
        assert_eq!(all[0].description, "2 sub-commands");
    }

    #[test]
    fn completes_options_after_command() {
        let c = completer();
        assert_eq!(texts(&c, "deploy prod --"), vec!["--force", "--dry-run"]);
        assert_eq!(texts(&c, "deploy prod --force --"), vec!["--dry-run"]);
        assert!(texts(&c, "deploy pr").is_empty());
    }

    #[test]
    fn unknown_path_has_no_candidates() {
        let c = completer();
        assert!(texts(&c, "bogus ").is_empty());
        assert!(texts(&c, "net bogus ").is_empty());
    }

    #[test]
    fn iteration_is_lazy() {
        let c = completer();
        let mut it = c.complete("");
        assert_eq!(it.next().map(|c| c.text), Some("deploy".to_string()));
    }

    #[test]
    fn apply_and_common_prefix() {
        let c = completer();
        let all: Vec<Completion> = c.complete("net p").collect();
        assert_eq!(apply_completion("net p", &all[0]), "net ping ");

        let st: Vec<Completion> = c.complete("st").collect();
        assert_eq!(common_prefix(&st), Some("st".to_string()));
        let sta: Vec<Completion> = c.complete("sta").collect();
        assert_eq!(common_prefix(&sta), Some("sta".to_string()));
        assert_eq!(common_prefix(&[]), None);
    }
}
