//! 세션 입출력 포트 구현체와 출력 서식 도우미.

mod format;
mod history;
mod plain;
mod scripted;
mod terminal;

pub use format::{
    center_text, color_text, colored_title, format_message, hr, plain_message, terminal_width,
    title,
};
pub use history::History;
pub use plain::PlainIo;
pub use scripted::ScriptedIo;
pub use terminal::TerminalIo;
