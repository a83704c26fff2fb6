//! 출력 메시지 등급.

/// 세션 출력 메시지의 종류. IO 계층이 기호/색상을 결정한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
    /// 장식 없이 그대로 출력한다.
    Plain,
}

impl MessageLevel {
    pub fn symbol(self) -> Option<char> {
        match self {
            Self::Info => Some('*'),
            Self::Success => Some('+'),
            Self::Warning => Some('!'),
            Self::Error => Some('-'),
            Self::Plain => None,
        }
    }
}
