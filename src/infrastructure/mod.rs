//! Infrastructure layer
//! 터미널, 설정 파일, 환경 변수처럼 외부 시스템과 직접 통신하는 구현체 집합.

pub mod adapters;
pub mod config;
pub mod host;
pub mod io;
