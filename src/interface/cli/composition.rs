//! 애플리케이션 조립(composition root) 모듈.

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::config::SessionConfig;
use crate::application::ports::{ConfigRepository, Io};
use crate::application::session::Session;
use crate::application::usecases::inspect_config::InspectConfigUseCase;
use crate::domain::validator::PredicateValidator;
use crate::infrastructure::adapters::JsonConfigRepository;
use crate::infrastructure::io::{PlainIo, TerminalIo};
use crate::interface::cli::command::SessionOptions;
use crate::interface::cli::demo::{demo_commands, install_contexts};

// 이보다 긴 입력은 편집기에서 거부한다.
const MAX_INPUT_CHARS: usize = 1024;

/// 실행 시점 의존성을 한 곳에서 조립하는 컨테이너.
pub struct AppComposition {
    config_repo: JsonConfigRepository,
}

impl Default for AppComposition {
    fn default() -> Self {
        Self {
            config_repo: JsonConfigRepository,
        }
    }
}

impl AppComposition {
    /// 설정 점검 유스케이스를 생성한다.
    pub fn inspect_config_usecase(&self) -> InspectConfigUseCase<'_> {
        InspectConfigUseCase {
            config_repo: &self.config_repo,
        }
    }

    pub fn load_config(&self) -> Result<SessionConfig> {
        self.config_repo.load()
    }

    /// 설정과 실행 옵션에 맞는 입출력을 골라 예제 세션을 만든다.
    pub fn demo_session(
        &self,
        config: &SessionConfig,
        options: &SessionOptions,
    ) -> Result<Session> {
        let io = select_io(config, options)?;

        let mut builder = Session::builder(io)
            .config(config)
            .root_label("hans")
            .validator(PredicateValidator::new(
                |line: &str| line.chars().count() <= MAX_INPUT_CHARS,
                "input is too long",
            ))
            .cleanup(|| debug!("demo session closed"));
        if let Some(prompt) = &options.prompt {
            builder = builder.prompt(prompt);
        }

        let mut session = builder.build(demo_commands()?)?;
        install_contexts(&mut session)?;
        Ok(session)
    }
}

fn select_io(config: &SessionConfig, options: &SessionOptions) -> Result<Box<dyn Io>> {
    let color = config.color() && io::stdout().is_terminal();

    if let Some(path) = &options.script {
        let file = File::open(path)
            .with_context(|| format!("failed to open script {}", path.display()))?;
        debug!(script = %path.display(), "reading commands from script");
        return Ok(Box::new(
            PlainIo::new(BufReader::new(file), io::stdout())
                .color(color)
                .echo(true),
        ));
    }

    if options.plain || !config.interactive() {
        return Ok(Box::new(PlainIo::stdio(color)));
    }

    Ok(Box::new(
        TerminalIo::new(config.history_size())
            .color(config.color())
            .complete_while_typing(config.complete_while_typing()),
    ))
}
