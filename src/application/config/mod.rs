//! 세션이 사용하는 설정 스키마(순수 데이터).
//!
//! 주의: 파일/환경변수/프로세스 접근은 `infrastructure`에서만 수행한다.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROMPT: &str = "{user}@{host}{path}$ ";
pub const DEFAULT_HISTORY_SIZE: usize = 500;

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// 프롬프트 템플릿({user}, {host}, {context}, {path} 치환)
    pub prompt: Option<String>,
    /// 메모리에 유지할 입력 기록 개수
    pub history_size: Option<usize>,
    /// 입력 중 실시간 추천 표시 여부(기본 true)
    pub complete_while_typing: Option<bool>,
    /// 메시지 색상 사용 여부(기본 true, TTY가 아니면 무시)
    pub color: Option<bool>,
    /// raw mode 라인 편집기 사용 여부(기본 true)
    pub interactive: Option<bool>,
    /// help/back/exit 기본 명령 등록 여부(기본 true)
    pub builtins: Option<bool>,
}

impl SessionConfig {
    pub fn prompt(&self) -> String {
        self.prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string())
    }

    pub fn history_size(&self) -> usize {
        self.history_size.unwrap_or(DEFAULT_HISTORY_SIZE)
    }

    pub fn complete_while_typing(&self) -> bool {
        self.complete_while_typing.unwrap_or(true)
    }

    pub fn color(&self) -> bool {
        self.color.unwrap_or(true)
    }

    pub fn interactive(&self) -> bool {
        self.interactive.unwrap_or(true)
    }

    pub fn builtins(&self) -> bool {
        self.builtins.unwrap_or(true)
    }

    /// 후순위(나중 파일) 값으로 덮어쓰는 병합 규칙.
    pub fn merge_from(&mut self, other: SessionConfig) {
        if other.prompt.is_some() {
            self.prompt = other.prompt;
        }
        if other.history_size.is_some() {
            self.history_size = other.history_size;
        }
        if other.complete_while_typing.is_some() {
            self.complete_while_typing = other.complete_while_typing;
        }
        if other.color.is_some() {
            self.color = other.color;
        }
        if other.interactive.is_some() {
            self.interactive = other.interactive;
        }
        if other.builtins.is_some() {
            self.builtins = other.builtins;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.prompt(), DEFAULT_PROMPT);
        assert_eq!(cfg.history_size(), DEFAULT_HISTORY_SIZE);
        assert!(cfg.complete_while_typing());
        assert!(cfg.interactive());
        assert!(cfg.builtins());
    }

    #[test]
    fn later_values_win_on_merge() {
        let mut base: SessionConfig =
            serde_json::from_str(r#"{"prompt": "a> ", "history_size": 10}"#).unwrap();
        let over: SessionConfig =
            serde_json::from_str(r#"{"history_size": 20, "color": false}"#).unwrap();
        base.merge_from(over);

        assert_eq!(base.prompt(), "a> ");
        assert_eq!(base.history_size(), 20);
        assert!(!base.color());
    }
}
