//! 미리 정한 입력을 순서대로 돌려주는 IO. 테스트와 스크립트 실행에 사용한다.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};

use crate::application::ports::{Io, PromptRequest, ReadEvent};
use crate::domain::message::MessageLevel;

#[derive(Debug, Default)]
struct Shared {
    script: VecDeque<ReadEvent>,
    messages: Vec<(MessageLevel, String)>,
    prompts: Vec<String>,
}

/// 복제본끼리 입력 대기열과 출력 기록을 공유한다.
/// 세션에 하나를 넘기고 다른 하나로 결과를 확인하는 식으로 쓴다.
///
/// 입력 검증은 하지 않는다. 잘못된 줄도 그대로 세션에 전달되어 오류 메시지로 기록된다.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIo {
    shared: Arc<Mutex<Shared>>,
}

impl ScriptedIo {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_events(lines.into_iter().map(|l| ReadEvent::Line(l.into())))
    }

    pub fn from_events(events: impl IntoIterator<Item = ReadEvent>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                script: events.into_iter().collect(),
                ..Shared::default()
            })),
        }
    }

    /// 지금까지 출력된 메시지.
    pub fn messages(&self) -> Vec<(MessageLevel, String)> {
        self.lock().map(|s| s.messages.clone()).unwrap_or_default()
    }

    /// 입력을 요청할 때마다 표시된 프롬프트.
    pub fn prompts(&self) -> Vec<String> {
        self.lock().map(|s| s.prompts.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.lock().map(|s| s.script.len()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Shared>> {
        self.shared
            .lock()
            .map_err(|_| anyhow!("scripted io state poisoned"))
    }
}

impl Io for ScriptedIo {
    fn read_line(&mut self, request: &PromptRequest<'_>) -> Result<ReadEvent> {
        let mut shared = self.lock()?;
        shared.prompts.push(request.prompt.to_string());
        Ok(shared.script.pop_front().unwrap_or(ReadEvent::Eof))
    }

    fn write(&mut self, level: MessageLevel, text: &str) -> Result<()> {
        self.lock()?.messages.push((level, text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::completer::CommandCompleter;
    use crate::domain::validator::PredicateValidator;

    #[test]
    fn clones_share_script_and_transcript() {
        let mut io = ScriptedIo::new(["a", "b"]);
        let observer = io.clone();
        let completer = CommandCompleter::default();
        let validator = PredicateValidator::new(|_: &str| true, "");
        let request = PromptRequest {
            prompt: "> ",
            completer: &completer,
            validator: &validator,
        };

        assert_eq!(io.read_line(&request).unwrap(), ReadEvent::Line("a".into()));
        io.write(MessageLevel::Info, "hi").unwrap();
        assert_eq!(observer.remaining(), 1);
        assert_eq!(io.read_line(&request).unwrap(), ReadEvent::Line("b".into()));
        assert_eq!(io.read_line(&request).unwrap(), ReadEvent::Eof);

        assert_eq!(observer.messages(), vec![(MessageLevel::Info, "hi".into())]);
        assert_eq!(observer.prompts(), vec!["> ", "> ", "> "]);
    }
}
