//! 출력 메시지 서식(심볼 접두사, 구분선, 가운데 정렬).

use crossterm::style::{Color, Stylize};
use crossterm::terminal;
use rand::seq::SliceRandom;
use unicode_width::UnicodeWidthStr;

use crate::domain::message::MessageLevel;

const FALLBACK_WIDTH: usize = 80;
const TITLE_COLORS: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

/// 심볼 접두사와 색상을 붙인다. `[-]` 빨강, `[!]` 노랑, `[+]` 초록, `[*]` 무색.
pub fn format_message(level: MessageLevel, text: &str) -> String {
    let Some(symbol) = level.symbol() else {
        return text.to_string();
    };
    let tag = format!("[{symbol}]");
    let tag = match level {
        MessageLevel::Error => tag.red().to_string(),
        MessageLevel::Warning => tag.yellow().to_string(),
        MessageLevel::Success => tag.green().to_string(),
        MessageLevel::Info | MessageLevel::Plain => tag,
    };
    format!("{tag} {text}")
}

/// 색상 없이 심볼 접두사만 붙인다.
pub fn plain_message(level: MessageLevel, text: &str) -> String {
    match level.symbol() {
        Some(symbol) => format!("[{symbol}] {text}"),
        None => text.to_string(),
    }
}

pub fn hr(ch: char, width: usize) -> String {
    ch.to_string().repeat(width)
}

/// 표시 폭 기준으로 가운데 정렬한다. 폭을 넘는 문자열은 그대로 둔다.
pub fn center_text(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    if used >= width {
        return text.to_string();
    }
    let left = (width - used) / 2;
    let right = width - used - left;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

/// 위아래 구분선 사이에 가운데 정렬된 제목.
pub fn title(text: &str, width: usize) -> String {
    let rule = hr('=', width);
    format!("{rule}\n{}\n{rule}", center_text(text, width))
}

/// 글자마다 임의의 색을 입힌다. 공백은 그대로 둔다.
pub fn color_text(text: &str) -> String {
    let mut rng = rand::thread_rng();
    text.chars()
        .map(|ch| match TITLE_COLORS.choose(&mut rng) {
            Some(color) if !ch.is_whitespace() => ch.to_string().with(*color).to_string(),
            _ => ch.to_string(),
        })
        .collect()
}

/// `title`과 같은 틀에 제목 글자만 무작위 색으로 칠한다.
pub fn colored_title(text: &str, width: usize) -> String {
    let rule = hr('=', width);
    format!("{rule}\n{}\n{rule}", color_text(&center_text(text, width)))
}

/// 현재 터미널 폭. 알 수 없으면 80.
pub fn terminal_width() -> usize {
    terminal::size()
        .map(|(w, _)| w as usize)
        .ok()
        .filter(|w| *w > 0)
        .unwrap_or(FALLBACK_WIDTH)
}
