//! 프롬프트에 표시할 로컬 사용자/호스트 이름 조회.

use std::env;
use std::fs;

const UNKNOWN_USER: &str = "user";
const UNKNOWN_HOST: &str = "localhost";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub host: String,
}

/// 환경 변수와 `/etc/hostname`에서 찾고, 없으면 기본값을 쓴다.
pub fn local_identity() -> Identity {
    Identity {
        user: first_non_empty(["USER", "USERNAME", "LOGNAME"].iter().map(|k| env::var(k).ok()))
            .unwrap_or_else(|| UNKNOWN_USER.to_string()),
        host: first_non_empty([
            env::var("HOSTNAME").ok(),
            env::var("COMPUTERNAME").ok(),
            fs::read_to_string("/etc/hostname").ok(),
        ])
        .unwrap_or_else(|| UNKNOWN_HOST.to_string()),
    }
}

fn first_non_empty(candidates: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
