//! 설정 저장소 포트 구현 어댑터.

use anyhow::Result;

use crate::application::config::SessionConfig;
use crate::application::ports::ConfigRepository;
use crate::infrastructure::config;

/// JSON 기반 설정 저장소 어댑터.
pub struct JsonConfigRepository;

impl ConfigRepository for JsonConfigRepository {
    fn load(&self) -> Result<SessionConfig> {
        config::load()
    }

    fn inspect_pretty_json(&self) -> Result<String> {
        config::inspect_pretty_json()
    }
}
