//! 명령 세션: 입력을 읽고 해석해 핸들러로 보내며 컨텍스트를 전환한다.

use anyhow::Result;
use tracing::{debug, warn};

use crate::application::builtins::builtin_commands;
use crate::application::config::{DEFAULT_PROMPT, SessionConfig};
use crate::application::ports::{Io, PromptRequest, ReadEvent};
use crate::domain::cmd::{CommandTree, Invocation, Lookup, LookupError, SessionHandle, TreeError};
use crate::domain::completer::CommandCompleter;
use crate::domain::message::MessageLevel;
use crate::domain::state::{SessionError, SessionState, StateId, StateTree};
use crate::domain::validator::{AllOf, CommandValidator, Validate};
use crate::infrastructure::host::local_identity;

/// 생성자에 넘긴 명령이 들어가는 기본 컬렉션 이름.
pub const INIT_COLLECTION: &str = "__init__";

pub type PromptFn = Box<dyn Fn(&PromptInfo<'_>) -> String>;
pub type CleanupFn = Box<dyn FnOnce()>;

/// 프롬프트 생성에 쓰이는 현재 상태 요약.
pub struct PromptInfo<'a> {
    pub state: &'a SessionState,
    /// 루트를 제외한 컨텍스트 라벨
    pub labels: Vec<&'a str>,
    pub user: &'a str,
    pub host: &'a str,
}

enum Prompt {
    Template(String),
    Custom(PromptFn),
}

/// `{user}`, `{host}`, `{context}`, `{path}` 자리표시자를 치환한다.
pub fn render_prompt_template(template: &str, info: &PromptInfo<'_>) -> String {
    let context = info.labels.join("/");
    let path = if context.is_empty() {
        String::new()
    } else {
        format!("({context})")
    };
    template
        .replace("{user}", info.user)
        .replace("{host}", info.host)
        .replace("{context}", &context)
        .replace("{path}", &path)
}

/// 세션 생성기.
pub struct SessionBuilder {
    io: Box<dyn Io>,
    prompt: Prompt,
    root_label: String,
    builtins: bool,
    cleanup: Option<CleanupFn>,
    validators: Vec<Box<dyn Validate>>,
    user: String,
    host: String,
}

impl SessionBuilder {
    /// 설정 파일 값(프롬프트, 기본 명령 사용 여부)을 반영한다.
    pub fn config(mut self, config: &SessionConfig) -> Self {
        self.prompt = Prompt::Template(config.prompt());
        self.builtins = config.builtins();
        self
    }

    pub fn prompt(mut self, template: &str) -> Self {
        self.prompt = Prompt::Template(template.to_string());
        self
    }

    /// 상태에 따라 달라지는 프롬프트를 함수로 지정한다.
    pub fn prompt_fn<F>(mut self, prompt: F) -> Self
    where
        F: Fn(&PromptInfo<'_>) -> String + 'static,
    {
        self.prompt = Prompt::Custom(Box::new(prompt));
        self
    }

    pub fn root_label(mut self, label: &str) -> Self {
        self.root_label = label.to_string();
        self
    }

    pub fn builtins(mut self, enabled: bool) -> Self {
        self.builtins = enabled;
        self
    }

    /// 세션 종료 시 한 번 호출된다.
    pub fn cleanup<F>(mut self, cleanup: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.cleanup = Some(Box::new(cleanup));
        self
    }

    /// 명령 검증 전에 적용할 추가 검증기.
    pub fn validator(mut self, validator: impl Validate + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn identity(mut self, user: &str, host: &str) -> Self {
        self.user = user.to_string();
        self.host = host.to_string();
        self
    }

    pub fn build(self, commands: CommandTree) -> Result<Session, TreeError> {
        let mut contexts = StateTree::new(&self.root_label);
        if let Some(root) = contexts.get_mut(StateId::ROOT) {
            root.extend(INIT_COLLECTION, commands);
        }
        let builtins = if self.builtins {
            builtin_commands()?
        } else {
            CommandTree::new()
        };

        let mut session = Session {
            io: self.io,
            contexts,
            builtins,
            state: SessionState::new(StateId::ROOT),
            prompt: self.prompt,
            cleanup: self.cleanup,
            validators: self.validators,
            effective: CommandTree::new(),
            completer: CommandCompleter::default(),
            running: false,
            exit_code: 0,
            user: self.user,
            host: self.host,
        };
        session.refresh();
        Ok(session)
    }
}

/// 대화형 명령 세션.
pub struct Session {
    io: Box<dyn Io>,
    contexts: StateTree,
    /// 모든 컨텍스트의 맨 아래에 깔리는 기본 명령
    builtins: CommandTree,
    state: SessionState,
    prompt: Prompt,
    cleanup: Option<CleanupFn>,
    validators: Vec<Box<dyn Validate>>,
    effective: CommandTree,
    completer: CommandCompleter,
    running: bool,
    exit_code: i32,
    user: String,
    host: String,
}

impl Session {
    /// 프롬프트의 사용자/호스트 이름은 로컬 계정에서 가져온다.
    pub fn builder(io: Box<dyn Io>) -> SessionBuilder {
        let identity = local_identity();
        SessionBuilder {
            io,
            prompt: Prompt::Template(DEFAULT_PROMPT.to_string()),
            root_label: "root".to_string(),
            builtins: true,
            cleanup: None,
            validators: Vec::new(),
            user: identity.user,
            host: identity.host,
        }
    }

    /// 기본 설정으로 세션을 만든다.
    pub fn new(io: Box<dyn Io>, commands: CommandTree) -> Result<Self, TreeError> {
        Self::builder(io).build(commands)
    }

    /// 사용자가 입력을 끝낼 때까지 명령을 처리하고 종료 코드를 반환한다.
    pub fn handle_forever(&mut self) -> Result<i32> {
        self.running = true;

        while self.running {
            let prompt = self.render_prompt();
            let event = {
                let commands = CommandValidator::new(&self.effective, &self.state);
                let mut chain: Vec<&dyn Validate> = Vec::with_capacity(self.validators.len() + 1);
                for extra in &self.validators {
                    chain.push(extra.as_ref());
                }
                chain.push(&commands);
                let validator = AllOf::new(chain);
                let request = PromptRequest {
                    prompt: &prompt,
                    completer: &self.completer,
                    validator: &validator,
                };
                self.io.read_line(&request)?
            };

            match event {
                ReadEvent::Line(line) => self.handle(&line)?,
                ReadEvent::Interrupted => {
                    debug!("input interrupted");
                    continue;
                }
                ReadEvent::Eof => {
                    debug!("input closed");
                    break;
                }
            }
        }

        self.running = false;
        self.run_cleanup();
        Ok(self.exit_code)
    }

    /// 한 줄 입력을 처리한다. 명령 오류는 출력만 하고 세션을 멈추지 않는다.
    pub fn handle(&mut self, line: &str) -> Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }

        let Lookup {
            command,
            path,
            args,
        } = match self.lookup(line) {
            Ok(found) => found,
            Err(err) => {
                debug!(input = line, error = %err, "lookup failed");
                return self.io.write(MessageLevel::Error, &err.to_string());
            }
        };

        debug!(command = %path.join(" "), "dispatching command");
        let mut invocation = Invocation {
            args,
            path,
            session: &mut *self,
        };
        if let Err(err) = command.run(&mut invocation) {
            warn!(command = command.name(), error = %err, "command failed");
            self.io.write(
                MessageLevel::Error,
                &format!("Error while executing command: {err:#}"),
            )?;
        }
        Ok(())
    }

    /// 현재 컨텍스트에서 입력을 실행 가능한 명령으로 해석한다.
    pub fn lookup(&self, line: &str) -> Result<Lookup, LookupError> {
        self.effective.lookup(line, &self.state)
    }

    /// 현재 컨텍스트의 유효 명령 트리와 자동완성기를 다시 만든다.
    /// 기본 명령은 상속 여부와 관계없이 가장 아래 층이라 사용자 명령이 덮어쓸 수 있다.
    pub fn refresh(&mut self) {
        let mut effective = self.builtins.with_aliases();
        effective.merge(self.contexts.effective_tree(self.state.current()));
        self.effective = effective;
        self.completer = CommandCompleter::new(self.effective.clone());
        debug!(
            context = ?self.state.current(),
            commands = self.effective.len(),
            "command tree refreshed"
        );
    }

    /// 루트 컨텍스트에 명령 컬렉션을 추가(같은 이름이면 교체)한다.
    pub fn extend(&mut self, collection: &str, tree: CommandTree) {
        if let Some(root) = self.contexts.get_mut(StateId::ROOT) {
            root.extend(collection, tree);
        }
        self.refresh();
    }

    pub fn remove(&mut self, collection: &str) -> Result<CommandTree, SessionError> {
        self.remove_from(StateId::ROOT, collection)
    }

    pub fn extend_context(
        &mut self,
        id: StateId,
        collection: &str,
        tree: CommandTree,
    ) -> Result<(), SessionError> {
        self.contexts.node_mut(id)?.extend(collection, tree);
        self.refresh();
        Ok(())
    }

    pub fn remove_from(
        &mut self,
        id: StateId,
        collection: &str,
    ) -> Result<CommandTree, SessionError> {
        let removed = self
            .contexts
            .node_mut(id)?
            .remove(collection)
            .ok_or_else(|| SessionError::UnknownCollection(collection.to_string()))?;
        self.refresh();
        Ok(removed)
    }

    pub fn add_context(
        &mut self,
        parent: StateId,
        name: &str,
        label: &str,
        inherit: bool,
    ) -> Result<StateId, SessionError> {
        self.contexts.add(parent, name, label, inherit)
    }

    pub fn enter(&mut self, id: StateId) -> Result<(), SessionError> {
        self.contexts.node(id)?;
        self.state.set_current(id);
        self.refresh();
        Ok(())
    }

    /// 부모 컨텍스트로 돌아간다. 루트에서는 `false`.
    pub fn leave(&mut self) -> bool {
        let Some(parent) = self.contexts.parent(self.state.current()) else {
            return false;
        };
        self.state.set_current(parent);
        self.refresh();
        true
    }

    pub fn current(&self) -> StateId {
        self.state.current()
    }

    pub fn context_path(&self) -> Vec<&str> {
        self.contexts.path_labels(self.state.current())
    }

    /// 현재 처리 중인 명령이 끝나면 루프를 멈춘다.
    pub fn exit(&mut self, code: i32) {
        debug!(code, "session exit requested");
        self.exit_code = code;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn contexts(&self) -> &StateTree {
        &self.contexts
    }

    pub fn commands(&self) -> &CommandTree {
        &self.effective
    }

    pub fn completer(&self) -> &CommandCompleter {
        &self.completer
    }

    pub fn write(&mut self, level: MessageLevel, text: &str) -> Result<()> {
        self.io.write(level, text)
    }

    pub fn render_prompt(&self) -> String {
        let info = PromptInfo {
            state: &self.state,
            labels: self.contexts.path_labels(self.state.current()),
            user: &self.user,
            host: &self.host,
        };
        match &self.prompt {
            Prompt::Template(template) => render_prompt_template(template, &info),
            Prompt::Custom(prompt) => prompt(&info),
        }
    }

    fn run_cleanup(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            debug!("running session cleanup");
            cleanup();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.run_cleanup();
    }
}

impl SessionHandle for Session {
    fn state(&self) -> &SessionState {
        Session::state(self)
    }

    fn state_mut(&mut self) -> &mut SessionState {
        Session::state_mut(self)
    }

    fn contexts(&self) -> &StateTree {
        Session::contexts(self)
    }

    fn commands(&self) -> &CommandTree {
        Session::commands(self)
    }

    fn write(&mut self, level: MessageLevel, text: &str) -> Result<()> {
        Session::write(self, level, text)
    }

    fn extend(&mut self, collection: &str, tree: CommandTree) {
        Session::extend(self, collection, tree)
    }

    fn remove(&mut self, collection: &str) -> Result<CommandTree, SessionError> {
        Session::remove(self, collection)
    }

    fn add_context(
        &mut self,
        parent: StateId,
        name: &str,
        label: &str,
        inherit: bool,
    ) -> Result<StateId, SessionError> {
        Session::add_context(self, parent, name, label, inherit)
    }

    fn extend_context(
        &mut self,
        id: StateId,
        collection: &str,
        tree: CommandTree,
    ) -> Result<(), SessionError> {
        Session::extend_context(self, id, collection, tree)
    }

    fn enter(&mut self, id: StateId) -> Result<(), SessionError> {
        Session::enter(self, id)
    }

    fn leave(&mut self) -> bool {
        Session::leave(self)
    }

    fn exit(&mut self, code: i32) {
        Session::exit(self, code)
    }
}
