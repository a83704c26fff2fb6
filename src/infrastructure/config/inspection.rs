//! 적용 설정 진단(inspection) 뷰 모델.

use serde::Serialize;

use super::loader::LoadedConfig;
use crate::application::config::SessionConfig;

#[derive(Debug, Clone, Serialize)]
pub struct ConfigInspection {
    pub searched_paths: Vec<String>,
    pub loaded_paths: Vec<String>,
    /// 파일에 적힌 값 그대로
    pub config: SessionConfig,
    /// 기본값까지 반영한 실제 적용 값
    pub effective: EffectiveConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub prompt: String,
    pub history_size: usize,
    pub complete_while_typing: bool,
    pub color: bool,
    pub interactive: bool,
    pub builtins: bool,
}

impl ConfigInspection {
    pub(crate) fn from_loaded(loaded: LoadedConfig) -> Self {
        let effective = EffectiveConfig::from(&loaded.config);
        Self {
            searched_paths: loaded
                .searched_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            loaded_paths: loaded
                .loaded_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            config: loaded.config,
            effective,
        }
    }
}

impl From<&SessionConfig> for EffectiveConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            prompt: config.prompt(),
            history_size: config.history_size(),
            complete_while_typing: config.complete_while_typing(),
            color: config.color(),
            interactive: config.interactive(),
            builtins: config.builtins(),
        }
    }
}
