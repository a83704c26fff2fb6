//! 입력 기록(최대 개수 제한, 연속 중복 제거, 위/아래 탐색, 접두사 추천).

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
    position: Option<usize>,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            position: None,
        }
    }

    /// 빈 줄과 직전과 같은 줄은 기록하지 않는다. 탐색 위치는 초기화된다.
    pub fn add(&mut self, line: &str) {
        self.position = None;
        if line.trim().is_empty() || self.capacity == 0 {
            return;
        }
        if self.entries.back().is_some_and(|last| last == line) {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_string());
    }

    /// 한 칸 이전 기록. 가장 오래된 기록에서 멈춘다.
    pub fn previous(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let index = match self.position {
            None => self.entries.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.position = Some(index);
        self.entries.get(index).map(String::as_str)
    }

    /// 한 칸 다음 기록. 가장 최근 기록을 지나면 `None`으로 돌아간다.
    pub fn next(&mut self) -> Option<&str> {
        let i = self.position?;
        if i + 1 >= self.entries.len() {
            self.position = None;
            return None;
        }
        self.position = Some(i + 1);
        self.entries.get(i + 1).map(String::as_str)
    }

    pub fn reset_position(&mut self) {
        self.position = None;
    }

    pub fn is_navigating(&self) -> bool {
        self.position.is_some()
    }

    /// `prefix`로 시작하는 가장 최근 기록에서 남은 부분을 돌려준다.
    pub fn suggest(&self, prefix: &str) -> Option<&str> {
        if prefix.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.len() > prefix.len() && entry.starts_with(prefix))
            .map(|entry| &entry[prefix.len()..])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
