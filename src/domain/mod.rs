//! Domain layer
//! 명령 모델, 인자 해석, 자동완성, 검증, 컨텍스트 상태를 외부 의존성 없이 표현한다.

pub mod argparser;
pub mod cmd;
pub mod completer;
pub mod message;
pub mod state;
pub mod validator;
