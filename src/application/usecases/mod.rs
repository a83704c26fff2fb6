//! 인터페이스 계층에서 호출하는 유스케이스 모음.

pub mod inspect_config;
