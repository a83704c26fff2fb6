//! Application layer
//! 세션 루프와 기본 명령을 정의하고 포트(추상 인터페이스)를 통해 인프라를 사용한다.

pub mod builtins;
pub mod config;
pub mod ports;
pub mod session;
pub mod usecases;
