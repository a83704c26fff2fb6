//! 애플리케이션 계층이 의존하는 포트(추상 인터페이스) 모음.

use anyhow::Result;

use crate::application::config::SessionConfig;
use crate::domain::completer::Complete;
use crate::domain::message::MessageLevel;
use crate::domain::validator::Validate;

/// 한 번의 입력 요청 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEvent {
    Line(String),
    /// Ctrl-C: 현재 입력만 버리고 루프는 계속한다.
    Interrupted,
    /// Ctrl-D 또는 입력 종료
    Eof,
}

/// 입력 한 줄을 받을 때 IO 구현체에 넘기는 문맥.
pub struct PromptRequest<'a> {
    pub prompt: &'a str,
    pub completer: &'a dyn Complete,
    pub validator: &'a dyn Validate,
}

/// 터미널 장치와 세션 루프를 분리하는 입출력 포트.
pub trait Io {
    fn read_line(&mut self, request: &PromptRequest<'_>) -> Result<ReadEvent>;
    fn write(&mut self, level: MessageLevel, text: &str) -> Result<()>;
}

/// 설정 로딩/점검을 담당하는 저장소 포트.
pub trait ConfigRepository: Send + Sync {
    fn load(&self) -> Result<SessionConfig>;
    fn inspect_pretty_json(&self) -> Result<String>;
}
