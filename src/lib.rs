//! hans library root.
//! 대화형 명령 세션(명령 트리, 컨텍스트, 자동완성, 검증, 입출력)을 계층별로 노출한다.

use anyhow::Result;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;

pub use application::config::SessionConfig;
pub use application::ports::{Io, PromptRequest, ReadEvent};
pub use application::session::{PromptInfo, Session, SessionBuilder};
pub use domain::argparser::{ArgError, ArgSpec, ParsedArgs, TokenizeError, tokenize};
pub use domain::cmd::{
    Command, CommandTree, Invocation, LookupError, Node, SessionHandle, TreeError,
};
pub use domain::completer::{Complete, CommandCompleter, Completion, CompletionKind};
pub use domain::message::MessageLevel;
pub use domain::state::{SessionError, SessionState, StateId};
pub use domain::validator::{PredicateValidator, Validate, ValidationError};
pub use infrastructure::io::{PlainIo, ScriptedIo, TerminalIo};

use interface::cli::AppComposition;

/// 설정 점검 JSON 출력용 함수.
pub fn inspect_config_pretty_json() -> Result<String> {
    let composition = AppComposition::default();
    composition.inspect_config_usecase().execute()
}
