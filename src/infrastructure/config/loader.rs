//! 설정 파일 탐색/병합 로더.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::config::SessionConfig;

/// 최우선 설정 파일 경로를 지정하는 환경 변수.
pub const CONFIG_ENV: &str = "HANS_CONFIG";

#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    pub config: SessionConfig,
    pub searched_paths: Vec<PathBuf>,
    pub loaded_paths: Vec<PathBuf>,
}

/// 주어진 경로를 순서대로 읽어 병합한다. 없는 파일은 건너뛴다.
pub(crate) fn load_merged_config(paths: &[PathBuf]) -> Result<LoadedConfig> {
    // 낮은 우선순위에서 높은 우선순위 순서로 병합한다.
    let mut merged = SessionConfig::default();
    let mut loaded_paths = Vec::new();

    for path in paths {
        if !path.exists() {
            continue;
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let parsed: SessionConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?;
        debug!(path = %path.display(), "config loaded");
        merged.merge_from(parsed);
        loaded_paths.push(path.to_path_buf());
    }

    Ok(LoadedConfig {
        config: merged,
        searched_paths: paths.to_vec(),
        loaded_paths,
    })
}

/// 시스템 + 사용자 + 프로젝트 + 명시 경로 순으로 병합 경로를 구성한다.
pub fn config_paths() -> Vec<PathBuf> {
    // 낮은 우선순위 -> 높은 우선순위 순서로 병합됨.
    let mut paths = vec![PathBuf::from("/etc/hans/config.json")];

    if let Some(base) = dirs::config_dir() {
        paths.push(base.join("hans").join("config.json"));
    }

    paths.push(PathBuf::from(".hans/config.json"));

    if let Ok(path) = env::var(CONFIG_ENV) {
        paths.push(Path::new(&path).to_path_buf());
    }

    dedup_paths(paths)
}

fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for p in paths {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn later_files_override_earlier_ones() {
        let temp_dir = TempDir::new().unwrap();
        let low = temp_dir.path().join("low.json");
        let high = temp_dir.path().join("high.json");
        fs::write(&low, r#"{"prompt": "low> ", "history_size": 5}"#).unwrap();
        fs::write(&high, r#"{"prompt": "high> "}"#).unwrap();

        let paths = vec![
            low.clone(),
            temp_dir.path().join("missing.json"),
            high.clone(),
        ];
        let loaded = load_merged_config(&paths).unwrap();

        assert_eq!(loaded.config.prompt(), "high> ");
        assert_eq!(loaded.config.history_size(), 5);
        assert_eq!(loaded.loaded_paths, vec![low, high]);
        assert_eq!(loaded.searched_paths.len(), 3);
    }

    #[test]
    fn invalid_json_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let bad = temp_dir.path().join("bad.json");
        fs::write(&bad, "{ nope").unwrap();

        let err = load_merged_config(std::slice::from_ref(&bad)).unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }

    #[test]
    fn duplicate_paths_are_removed_in_order() {
        let paths = dedup_paths(vec![
            PathBuf::from("a"),
            PathBuf::from("b"),
            PathBuf::from("a"),
        ]);
        assert_eq!(paths, vec![PathBuf::from("a"), PathBuf::from("b")]);
    }
}
