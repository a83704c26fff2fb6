//! 명령 정의와 명령 트리.
//!
//! 명령 트리는 이름 → 명령/하위 그룹의 정렬된 맵이며,
//! 여러 컬렉션을 깊은 병합(deep merge)해 현재 컨텍스트의 유효 트리를 만든다.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;

use crate::domain::argparser::{ArgError, ArgSpec, ParsedArgs, TokenizeError, tokenize};
use crate::domain::message::MessageLevel;
use crate::domain::state::{SessionError, SessionState, StateId, StateTree};

pub type Handler = Box<dyn Fn(&mut Invocation<'_>) -> Result<()> + Send + Sync>;
pub type Availability = Box<dyn Fn(&SessionState) -> bool + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("duplicate command name: {0}")]
    DuplicateCommand(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("empty command")]
    Empty,
    #[error("Unknown command: \"{0}\"")]
    Unknown(String),
    #[error("\"{0}\" has several sub-commands")]
    Incomplete(String),
    #[error("\"{0}\" is not usable in the current context")]
    Unavailable(String),
    #[error(transparent)]
    Syntax(#[from] TokenizeError),
    #[error("{source} (usage: {usage})")]
    Args { usage: String, source: ArgError },
}

/// 등록 가능한 단일 명령.
pub struct Command {
    name: String,
    description: String,
    usage: Option<String>,
    aliases: Vec<String>,
    args: Option<ArgSpec>,
    handler: Handler,
    availability: Option<Availability>,
}

impl Command {
    pub fn new<F>(name: &str, handler: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            description: String::new(),
            usage: None,
            aliases: Vec::new(),
            args: None,
            handler: Box::new(handler),
            availability: None,
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// 인자 선언에서 생성되는 사용법 대신 고정 문자열을 쓴다.
    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    /// 최상위 레벨에서만 유효한 별칭을 추가한다.
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn args(mut self, spec: ArgSpec) -> Self {
        self.args = Some(spec);
        self
    }

    /// 세션 상태에 따라 명령 사용 가능 여부를 결정하는 조건.
    pub fn available_when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&SessionState) -> bool + Send + Sync + 'static,
    {
        self.availability = Some(Box::new(predicate));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn arg_spec(&self) -> Option<&ArgSpec> {
        self.args.as_ref()
    }

    pub fn usage_line(&self, path: &str) -> String {
        if let Some(usage) = &self.usage {
            return usage.clone();
        }
        match &self.args {
            Some(spec) => spec.usage(path),
            None => path.to_string(),
        }
    }

    pub fn available(&self, state: &SessionState) -> bool {
        self.availability.as_ref().is_none_or(|pred| pred(state))
    }

    pub fn parse_args(&self, tokens: &[String]) -> Result<ParsedArgs, ArgError> {
        match &self.args {
            Some(spec) => spec.parse(tokens),
            None => Ok(ParsedArgs::from_tokens(tokens.to_vec())),
        }
    }

    pub fn run(&self, invocation: &mut Invocation<'_>) -> Result<()> {
        (self.handler)(invocation)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("aliases", &self.aliases)
            .field("args", &self.args)
            .field("conditional", &self.availability.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Command(Arc<Command>),
    Group(CommandTree),
}

/// 명령 경로 해석 결과.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub command: Arc<Command>,
    /// 명령에 도달하기까지 소비한 이름들
    pub path: Vec<String>,
    /// 명령 뒤에 남은 인자 토큰
    pub args: Vec<String>,
}

/// 실행 준비가 끝난 명령.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub command: Arc<Command>,
    pub path: Vec<String>,
    pub args: ParsedArgs,
}

#[derive(Debug, Clone, Default)]
pub struct CommandTree {
    entries: BTreeMap<String, Node>,
}

impl CommandTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, command: Command) -> Result<(), TreeError> {
        self.insert_node(command.name.clone(), Node::Command(Arc::new(command)))
    }

    pub fn insert_group(&mut self, name: &str, group: CommandTree) -> Result<(), TreeError> {
        self.insert_node(name.to_string(), Node::Group(group))
    }

    fn insert_node(&mut self, name: String, node: Node) -> Result<(), TreeError> {
        match self.entries.entry(name) {
            btree_map::Entry::Occupied(e) => Err(TreeError::DuplicateCommand(e.key().clone())),
            btree_map::Entry::Vacant(e) => {
                e.insert(node);
                Ok(())
            }
        }
    }

    pub fn with_command(mut self, command: Command) -> Result<Self, TreeError> {
        self.insert(command)?;
        Ok(self)
    }

    pub fn with_group(mut self, name: &str, group: CommandTree) -> Result<Self, TreeError> {
        self.insert_group(name, group)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `prefix`로 시작하는 항목만 정렬 순서대로 지연 순회한다.
    pub fn iter_prefixed(
        &self,
        prefix: impl Into<String>,
    ) -> impl Iterator<Item = (&str, &Node)> + '_ {
        let prefix: String = prefix.into();
        self.entries
            .range::<String, _>(prefix.clone()..)
            .take_while(move |(k, _)| k.starts_with(prefix.as_str()))
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 다른 트리를 깊은 병합한다. 같은 이름은 나중 값이 이긴다.
    pub fn merge(&mut self, other: CommandTree) {
        for (name, incoming) in other.entries {
            match incoming {
                Node::Group(next) => {
                    if let Some(Node::Group(existing)) = self.entries.get_mut(&name) {
                        existing.merge(next);
                    } else {
                        self.entries.insert(name, Node::Group(next));
                    }
                }
                node => {
                    self.entries.insert(name, node);
                }
            }
        }
    }

    /// 최상위 명령의 별칭을 실제 항목으로 펼친 사본을 만든다.
    pub fn with_aliases(&self) -> CommandTree {
        let mut out = self.clone();
        for node in self.entries.values() {
            let Node::Command(cmd) = node else {
                continue;
            };
            for alias in &cmd.aliases {
                out.entries
                    .insert(alias.clone(), Node::Command(Arc::clone(cmd)));
            }
        }
        out
    }

    /// 토큰을 따라 그룹을 내려가며 명령을 찾는다.
    pub fn resolve(&self, tokens: &[String]) -> Result<Resolved, LookupError> {
        if tokens.is_empty() {
            return Err(LookupError::Empty);
        }

        let joined = || tokens.join(" ");
        let mut level = self;
        let mut path = Vec::new();

        for (idx, token) in tokens.iter().enumerate() {
            match level.entries.get(token) {
                None => return Err(LookupError::Unknown(joined())),
                Some(Node::Command(cmd)) => {
                    path.push(token.clone());
                    return Ok(Resolved {
                        command: Arc::clone(cmd),
                        path,
                        args: tokens[idx + 1..].to_vec(),
                    });
                }
                Some(Node::Group(group)) => {
                    path.push(token.clone());
                    level = group;
                }
            }
        }

        Err(LookupError::Incomplete(joined()))
    }

    /// 입력 한 줄을 토큰화하고 명령 해석, 사용 가능 여부, 인자 검사까지 수행한다.
    pub fn lookup(&self, line: &str, state: &SessionState) -> Result<Lookup, LookupError> {
        let tokens = tokenize(line)?;
        let resolved = self.resolve(&tokens)?;
        if !resolved.command.available(state) {
            return Err(LookupError::Unavailable(line.trim().to_string()));
        }

        let args = resolved
            .command
            .parse_args(&resolved.args)
            .map_err(|source| LookupError::Args {
                usage: resolved.command.usage_line(&resolved.path.join(" ")),
                source,
            })?;

        Ok(Lookup {
            command: resolved.command,
            path: resolved.path,
            args,
        })
    }

    /// 경로 이름으로 노드를 찾는다(도움말용).
    pub fn find(&self, path: &[String]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.entries.get(first)?;
        for name in rest {
            let Node::Group(group) = node else {
                return None;
            };
            node = group.entries.get(name)?;
        }
        Some(node)
    }
}

/// 핸들러가 세션에 요청할 수 있는 동작.
pub trait SessionHandle {
    fn state(&self) -> &SessionState;
    fn state_mut(&mut self) -> &mut SessionState;
    fn contexts(&self) -> &StateTree;
    /// 현재 컨텍스트의 유효 명령 트리(별칭 포함).
    fn commands(&self) -> &CommandTree;
    fn write(&mut self, level: MessageLevel, text: &str) -> Result<()>;
    fn extend(&mut self, collection: &str, tree: CommandTree);
    fn remove(&mut self, collection: &str) -> Result<CommandTree, SessionError>;
    fn add_context(
        &mut self,
        parent: StateId,
        name: &str,
        label: &str,
        inherit: bool,
    ) -> Result<StateId, SessionError>;
    fn extend_context(
        &mut self,
        id: StateId,
        collection: &str,
        tree: CommandTree,
    ) -> Result<(), SessionError>;
    fn enter(&mut self, id: StateId) -> Result<(), SessionError>;
    fn leave(&mut self) -> bool;
    fn exit(&mut self, code: i32);
}

/// 한 번의 명령 실행에 전달되는 문맥.
pub struct Invocation<'a> {
    pub args: ParsedArgs,
    pub path: Vec<String>,
    pub session: &'a mut dyn SessionHandle,
}

impl Invocation<'_> {
    pub fn print(&mut self, text: &str) -> Result<()> {
        self.session.write(MessageLevel::Plain, text)
    }

    pub fn info(&mut self, text: &str) -> Result<()> {
        self.session.write(MessageLevel::Info, text)
    }

    pub fn success(&mut self, text: &str) -> Result<()> {
        self.session.write(MessageLevel::Success, text)
    }

    pub fn warn(&mut self, text: &str) -> Result<()> {
        self.session.write(MessageLevel::Warning, text)
    }

    pub fn error(&mut self, text: &str) -> Result<()> {
        self.session.write(MessageLevel::Error, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> Command {
        Command::new(name, |_| Ok(()))
    }

    fn toks(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut tree = CommandTree::new();
        tree.insert(noop("ls")).unwrap();
        assert_eq!(
            tree.insert(noop("ls")),
            Err(TreeError::DuplicateCommand("ls".into()))
        );
        assert_eq!(
            tree.insert_group("ls", CommandTree::new()),
            Err(TreeError::DuplicateCommand("ls".into()))
        );
    }

    #[test]
    fn resolve_walks_groups() {
        let net = CommandTree::new().with_command(noop("ping")).unwrap();
        let tree = CommandTree::new()
            .with_command(noop("ls"))
            .unwrap()
            .with_group("net", net)
            .unwrap();

        let resolved = tree.resolve(&toks("net ping host -c 3")).unwrap();
        assert_eq!(resolved.command.name(), "ping");
        assert_eq!(resolved.path, toks("net ping"));
        assert_eq!(resolved.args, toks("host -c 3"));

        assert_eq!(
            tree.resolve(&toks("net")).unwrap_err(),
            LookupError::Incomplete("net".into())
        );
        assert_eq!(
            tree.resolve(&toks("net pong")).unwrap_err(),
            LookupError::Unknown("net pong".into())
        );
        assert_eq!(tree.resolve(&[]).unwrap_err(), LookupError::Empty);
    }

    #[test]
    fn merge_is_deep_and_later_wins() {
        let mut base = CommandTree::new()
            .with_group(
                "net",
                CommandTree::new().with_command(noop("ping")).unwrap(),
            )
            .unwrap()
            .with_command(noop("ls").describe("old"))
            .unwrap();
        let extra = CommandTree::new()
            .with_group(
                "net",
                CommandTree::new().with_command(noop("trace")).unwrap(),
            )
            .unwrap()
            .with_command(noop("ls").describe("new"))
            .unwrap();

        base.merge(extra);

        let Some(Node::Group(net)) = base.get("net") else {
            panic!("net should stay a group");
        };
        assert!(net.get("ping").is_some());
        assert!(net.get("trace").is_some());
        let Some(Node::Command(ls)) = base.get("ls") else {
            panic!("ls should be a command");
        };
        assert_eq!(ls.description(), "new");
    }

    #[test]
    fn aliases_expand_top_level_only() {
        let nested = CommandTree::new()
            .with_command(noop("inner").alias("in"))
            .unwrap();
        let tree = CommandTree::new()
            .with_command(noop("exit").alias("quit").alias("q"))
            .unwrap()
            .with_group("grp", nested)
            .unwrap()
            .with_aliases();

        assert_eq!(tree.resolve(&toks("q")).unwrap().command.name(), "exit");
        assert_eq!(tree.resolve(&toks("quit")).unwrap().command.name(), "exit");
        assert!(tree.resolve(&toks("grp in")).is_err());
    }

    #[test]
    fn prefixed_iteration_is_sorted() {
        let tree = CommandTree::new()
            .with_command(noop("stop"))
            .unwrap()
            .with_command(noop("start"))
            .unwrap()
            .with_command(noop("add"))
            .unwrap()
            .with_command(noop("status"))
            .unwrap();
        let names: Vec<&str> = tree.iter_prefixed("st").map(|(k, _)| k).collect();
        assert_eq!(names, vec!["start", "status", "stop"]);
    }

    #[test]
    fn availability_and_usage() {
        let cmd = noop("deploy")
            .args(ArgSpec::new().required("env").flag("force"))
            .available_when(|state| state.get::<bool>("logged_in").unwrap_or(false));
        let mut state = SessionState::new(StateId::ROOT);
        assert!(!cmd.available(&state));
        state.set("logged_in", true).unwrap();
        assert!(cmd.available(&state));
        assert_eq!(cmd.usage_line("deploy"), "deploy <env> [--force]");
        assert_eq!(noop("ls").usage("ls [dir]").usage_line("ls"), "ls [dir]");
    }

    #[test]
    fn lookup_checks_availability_and_arguments() {
        let tree = CommandTree::new()
            .with_command(noop("say").args(ArgSpec::new().required("text")))
            .unwrap()
            .with_command(noop("admin").available_when(|_| false))
            .unwrap();
        let state = SessionState::new(StateId::ROOT);

        let found = tree.lookup("say \"hi there\"", &state).unwrap();
        assert_eq!(found.args.get("text"), Some("hi there"));

        assert_eq!(
            tree.lookup(" admin ", &state).unwrap_err(),
            LookupError::Unavailable("admin".into())
        );
        let err = tree.lookup("say", &state).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required argument: <text> (usage: say <text>)"
        );
        assert!(matches!(
            tree.lookup("say \"open", &state),
            Err(LookupError::Syntax(_))
        ));
    }

    #[test]
    fn find_by_path() {
        let tree = CommandTree::new()
            .with_group(
                "net",
                CommandTree::new().with_command(noop("ping")).unwrap(),
            )
            .unwrap();
        assert!(matches!(tree.find(&toks("net ping")), Some(Node::Command(_))));
        assert!(matches!(tree.find(&toks("net")), Some(Node::Group(_))));
        assert!(tree.find(&toks("net ping more")).is_none());
    }
}
