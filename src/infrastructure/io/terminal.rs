//! raw mode 라인 편집기.
//! 입력 중 자동완성 후보와 검증 힌트를 프롬프트 아래에 표시하고,
//! 기록 탐색과 기록 기반 추천(회색 글자)을 지원한다.

use std::env;
use std::io::{self, IsTerminal, Stdout, Write};

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, ClearType};
use crossterm::{execute, queue};
use tracing::debug;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::format::{format_message, plain_message};
use super::history::History;
use super::plain::PlainIo;
use crate::application::ports::{Io, PromptRequest, ReadEvent};
use crate::domain::completer::{Complete, Completion, apply_completion, common_prefix};
use crate::domain::message::MessageLevel;
use crate::domain::validator::Validate;

// 한 번에 표시하는 후보 줄 수
const MAX_VISIBLE_SUGGESTIONS: usize = 8;
// 공통 접두사 계산에 쓰는 후보 상한
const MAX_CANDIDATES: usize = 256;

pub struct TerminalIo {
    history: History,
    color: bool,
    complete_while_typing: bool,
    interactive: bool,
}

impl TerminalIo {
    pub fn new(history_size: usize) -> Self {
        Self {
            history: History::new(history_size),
            color: true,
            complete_while_typing: true,
            interactive: true,
        }
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// 끄면 Tab을 누를 때만 후보를 표시한다.
    pub fn complete_while_typing(mut self, enabled: bool) -> Self {
        self.complete_while_typing = enabled;
        self
    }

    /// 끄면 항상 일반 줄 입력을 사용한다.
    pub fn interactive(mut self, enabled: bool) -> Self {
        self.interactive = enabled;
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn read_line_interactive(&mut self, request: &PromptRequest<'_>) -> Result<ReadEvent> {
        let mut stdout = io::stdout();
        let _guard = InputGuard::enter(&mut stdout)?;
        let mut editor = Editor::new(
            request.completer,
            request.validator,
            &mut self.history,
            self.complete_while_typing,
        );

        loop {
            let width = terminal::size().map(|(w, _)| w as usize).unwrap_or(80).max(20);
            render_frame(&mut stdout, request.prompt, &editor, width, self.color)?;

            let step = match event::read()? {
                Event::Paste(text) => {
                    editor.insert_str(&text);
                    Step::Continue
                }
                Event::Key(key) if key.kind == KeyEventKind::Press => editor.handle_key(key),
                _ => Step::Continue,
            };

            match step {
                Step::Continue => {}
                Step::Submit(line) => {
                    finish_frame(&mut stdout, request.prompt, &line, width)?;
                    return Ok(ReadEvent::Line(line));
                }
                Step::Interrupted => {
                    let shown = format!("{}^C", editor.input);
                    finish_frame(&mut stdout, request.prompt, &shown, width)?;
                    return Ok(ReadEvent::Interrupted);
                }
                Step::Eof => {
                    finish_frame(&mut stdout, request.prompt, "", width)?;
                    return Ok(ReadEvent::Eof);
                }
            }
        }
    }

    fn read_line_fallback(&mut self, request: &PromptRequest<'_>) -> Result<ReadEvent> {
        let event = PlainIo::stdio(self.use_color()).read_line(request)?;
        if let ReadEvent::Line(line) = &event {
            self.history.add(line);
        }
        Ok(event)
    }

    fn use_color(&self) -> bool {
        self.color && io::stdout().is_terminal()
    }
}

impl Io for TerminalIo {
    fn read_line(&mut self, request: &PromptRequest<'_>) -> Result<ReadEvent> {
        if !self.interactive || !supports_interactive_input() {
            return self.read_line_fallback(request);
        }

        match self.read_line_interactive(request) {
            Ok(event) => Ok(event),
            Err(err) => {
                debug!(error = %err, "raw mode unavailable, falling back to line input");
                self.read_line_fallback(request)
            }
        }
    }

    fn write(&mut self, level: MessageLevel, text: &str) -> Result<()> {
        let rendered = if self.use_color() {
            format_message(level, text)
        } else {
            plain_message(level, text)
        };
        let mut stdout = io::stdout();
        writeln!(stdout, "{rendered}")?;
        stdout.flush()?;
        Ok(())
    }
}

fn supports_interactive_input() -> bool {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return false;
    }

    // dumb 터미널에서는 제어 시퀀스 기반 UI를 비활성화한다.
    if let Ok(term) = env::var("TERM")
        && term.eq_ignore_ascii_case("dumb")
    {
        return false;
    }

    true
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Continue,
    Submit(String),
    Interrupted,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Hint {
    color: Color,
    text: String,
}

/// 키 입력에 따른 편집 상태. 화면 출력과 분리되어 있다.
struct Editor<'a> {
    completer: &'a dyn Complete,
    validator: &'a dyn Validate,
    history: &'a mut History,
    complete_while_typing: bool,
    input: String,
    /// 문자 단위 커서 위치
    cursor: usize,
    suggestions: Vec<Completion>,
    selected: Option<usize>,
    /// Tab으로 후보 표시를 요청한 상태
    completing: bool,
    /// Enter 거부 시의 오류
    error: Option<String>,
    /// 기록 탐색 전 입력 중이던 내용
    draft: Option<String>,
}

impl<'a> Editor<'a> {
    fn new(
        completer: &'a dyn Complete,
        validator: &'a dyn Validate,
        history: &'a mut History,
        complete_while_typing: bool,
    ) -> Self {
        history.reset_position();
        Self {
            completer,
            validator,
            history,
            complete_while_typing,
            input: String::new(),
            cursor: 0,
            suggestions: Vec::new(),
            selected: None,
            completing: false,
            error: None,
            draft: None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Step {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return Step::Interrupted,
            KeyCode::Char('d') if ctrl => {
                if self.input.is_empty() {
                    return Step::Eof;
                }
                self.delete_at_cursor();
            }
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::Char('u') if ctrl => {
                let tail = self.input.chars().skip(self.cursor).collect();
                self.input = tail;
                self.cursor = 0;
                self.edited();
            }
            KeyCode::Enter => return self.submit(),
            KeyCode::Tab => self.complete(),
            KeyCode::BackTab => self.select_previous(),
            KeyCode::Esc => {
                self.completing = false;
                self.selected = None;
                self.refresh_suggestions();
            }
            KeyCode::Up => {
                if self.suggestions.is_empty() {
                    self.history_previous();
                } else {
                    self.select_previous();
                }
            }
            KeyCode::Down => {
                if self.suggestions.is_empty() {
                    self.history_next();
                } else {
                    self.select_next();
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => {
                if self.cursor == self.len()
                    && let Some(ghost) = self.ghost()
                {
                    let ghost = ghost.to_string();
                    self.insert_str(&ghost);
                } else {
                    self.cursor = (self.cursor + 1).min(self.len());
                }
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    remove_char_at(&mut self.input, self.cursor - 1);
                    self.cursor -= 1;
                    self.edited();
                }
            }
            KeyCode::Delete => self.delete_at_cursor(),
            KeyCode::Char(ch) => {
                if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) {
                    insert_char_at(&mut self.input, self.cursor, ch);
                    self.cursor += 1;
                    self.edited();
                }
            }
            _ => {}
        }
        Step::Continue
    }

    fn submit(&mut self) -> Step {
        // 후보를 고른 상태의 Enter는 실행 대신 후보를 적용한다.
        if let Some(choice) = self.selected.and_then(|i| self.suggestions.get(i)).cloned() {
            self.accept(&choice);
            return Step::Continue;
        }

        match self.validator.validate(&self.input) {
            Ok(()) => {
                self.history.add(&self.input);
                Step::Submit(self.input.clone())
            }
            Err(err) => {
                self.cursor = char_index_at_byte(&self.input, err.cursor);
                self.error = Some(err.message);
                Step::Continue
            }
        }
    }

    /// 후보가 하나면 적용하고, 여럿이면 공통 접두사까지 채운 뒤 목록을 띄운다.
    fn complete(&mut self) {
        self.completing = true;
        if let Some(choice) = self.selected.and_then(|i| self.suggestions.get(i)).cloned() {
            self.accept(&choice);
            return;
        }

        self.refresh_suggestions();
        match self.suggestions.as_slice() {
            [] => {}
            [only] => {
                let only = only.clone();
                self.accept(&only);
            }
            many => {
                let start = many[0].start;
                let head = self.head();
                let current = head.get(start..).unwrap_or_default();
                match common_prefix(many) {
                    Some(prefix) if prefix.len() > current.len() => {
                        let extended = format!("{}{prefix}", head.get(..start).unwrap_or_default());
                        self.replace_head(extended);
                        self.refresh_suggestions();
                    }
                    _ => self.selected = Some(0),
                }
            }
        }
    }

    fn accept(&mut self, completion: &Completion) {
        let head = apply_completion(&self.head(), completion);
        self.replace_head(head);
        self.selected = None;
        self.error = None;
        self.refresh_suggestions();
    }

    fn select_next(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        let last = self.suggestions.len() - 1;
        self.selected = Some(match self.selected {
            None => 0,
            Some(i) if i >= last => 0,
            Some(i) => i + 1,
        });
    }

    fn select_previous(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        let last = self.suggestions.len() - 1;
        self.selected = Some(match self.selected {
            None | Some(0) => last,
            Some(i) => i - 1,
        });
    }

    fn history_previous(&mut self) {
        if !self.history.is_navigating() {
            self.draft = Some(self.input.clone());
        }
        if let Some(entry) = self.history.previous() {
            let entry = entry.to_string();
            self.set_input(entry);
        }
    }

    fn history_next(&mut self) {
        if !self.history.is_navigating() {
            return;
        }
        let entry = match self.history.next() {
            Some(entry) => entry.to_string(),
            None => self.draft.take().unwrap_or_default(),
        };
        self.set_input(entry);
    }

    /// 기록에서 추천하는 남은 입력. 커서가 끝에 있을 때만 표시한다.
    fn ghost(&self) -> Option<&str> {
        if self.cursor != self.len() || self.history.is_navigating() {
            return None;
        }
        self.history.suggest(&self.input)
    }

    /// 현재 표시할 힌트. 거부된 입력의 오류가 우선이다.
    fn hint(&self) -> Option<Hint> {
        if let Some(error) = &self.error {
            return Some(Hint {
                color: Color::Red,
                text: format!("error: {error}"),
            });
        }
        if !self.complete_while_typing
            || self.input.trim().is_empty()
            || !self.suggestions.is_empty()
        {
            return None;
        }
        self.validator.validate(&self.input).err().map(|err| Hint {
            color: Color::Yellow,
            text: format!("hint: {}", err.message),
        })
    }

    fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            // 여러 줄 붙여넣기는 한 줄 명령으로 합친다.
            let ch = if ch == '\n' || ch == '\r' { ' ' } else { ch };
            insert_char_at(&mut self.input, self.cursor, ch);
            self.cursor += 1;
        }
        self.edited();
    }

    fn delete_at_cursor(&mut self) {
        if self.cursor < self.len() {
            remove_char_at(&mut self.input, self.cursor);
            self.edited();
        }
    }

    fn set_input(&mut self, input: String) {
        self.input = input;
        self.cursor = self.len();
        self.selected = None;
        self.error = None;
        self.suggestions.clear();
    }

    fn edited(&mut self) {
        self.selected = None;
        self.error = None;
        self.history.reset_position();
        self.draft = None;
        self.refresh_suggestions();
    }

    fn refresh_suggestions(&mut self) {
        let head = self.head();
        let show = self.completing || (self.complete_while_typing && !head.trim().is_empty());
        self.suggestions = if show {
            self.completer.complete(&head).take(MAX_CANDIDATES).collect()
        } else {
            Vec::new()
        };
        if self.suggestions.is_empty() {
            self.completing = false;
        }
        if self.selected.is_some_and(|i| i >= self.suggestions.len()) {
            self.selected = None;
        }
    }

    /// 커서 앞부분. 자동완성은 이 부분만 본다.
    fn head(&self) -> String {
        self.input.chars().take(self.cursor).collect()
    }

    fn replace_head(&mut self, head: String) {
        let tail: String = self.input.chars().skip(self.cursor).collect();
        self.cursor = head.chars().count();
        self.input = format!("{head}{tail}");
    }

    fn len(&self) -> usize {
        self.input.chars().count()
    }
}

fn render_frame(
    stdout: &mut Stdout,
    prompt: &str,
    editor: &Editor<'_>,
    width: usize,
    color: bool,
) -> Result<()> {
    queue!(
        stdout,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::FromCursorDown)
    )?;

    let prompt_width = display_width(prompt);
    let available = width.saturating_sub(prompt_width + 1);
    let shown = tail_with_ellipsis_display(&editor.input, available);
    queue!(stdout, Print(prompt), Print(&shown))?;

    let overflow = display_width(&editor.input) > available;
    if !overflow && let Some(ghost) = editor.ghost() {
        let room = available.saturating_sub(display_width(&shown));
        queue!(
            stdout,
            SetForegroundColor(Color::DarkGrey),
            Print(clip_line_display(ghost, room)),
            ResetColor
        )?;
    }

    let mut rows = Vec::new();
    if let Some(hint) = editor.hint() {
        rows.push((hint.color, clip_line_display(&hint.text, width.saturating_sub(1))));
    }
    rows.extend(suggestion_rows(editor, width.saturating_sub(1)));

    for (fg, line) in &rows {
        queue!(stdout, Print("\r\n"))?;
        if color {
            queue!(stdout, SetForegroundColor(*fg), Print(line), ResetColor)?;
        } else {
            queue!(stdout, Print(line))?;
        }
    }
    if !rows.is_empty() {
        queue!(stdout, cursor::MoveUp(rows.len() as u16))?;
    }

    let cursor_col = if overflow {
        // 넘친 입력은 끝부분만 보이므로 커서를 입력 끝에 둔다.
        prompt_width + display_width(&shown)
    } else {
        let before: String = editor.input.chars().take(editor.cursor).collect();
        prompt_width + display_width(&before)
    };
    queue!(
        stdout,
        cursor::MoveToColumn(cursor_col.min(width.saturating_sub(1)) as u16),
        cursor::Show
    )?;
    stdout.flush()?;
    Ok(())
}

/// 선택 항목이 보이도록 창을 옮겨 가며 후보 목록을 만든다.
fn suggestion_rows(editor: &Editor<'_>, width: usize) -> Vec<(Color, String)> {
    let total = editor.suggestions.len();
    if total == 0 {
        return Vec::new();
    }
    let selected = editor.selected.unwrap_or(0);
    let first = selected
        .saturating_sub(MAX_VISIBLE_SUGGESTIONS - 1)
        .min(total.saturating_sub(MAX_VISIBLE_SUGGESTIONS));
    let visible = &editor.suggestions[first..total.min(first + MAX_VISIBLE_SUGGESTIONS)];
    let name_width = visible
        .iter()
        .map(|c| display_width(&c.text))
        .max()
        .unwrap_or(0);

    let mut rows: Vec<(Color, String)> = visible
        .iter()
        .enumerate()
        .map(|(offset, completion)| {
            let is_selected = editor.selected == Some(first + offset);
            let marker = if is_selected { ">" } else { " " };
            let line = format!(
                "{marker} {}  {}",
                pad_line_display(&completion.text, name_width),
                completion.description
            );
            let fg = if is_selected { Color::Cyan } else { Color::White };
            (fg, clip_line_display(line.trim_end(), width))
        })
        .collect();

    if total > MAX_VISIBLE_SUGGESTIONS {
        rows.push((
            Color::DarkGrey,
            format!("  ({}/{total})", selected + 1),
        ));
    }
    rows
}

/// 입력을 확정한 뒤 힌트/후보 줄을 지우고 다음 줄로 내려간다.
fn finish_frame(stdout: &mut Stdout, prompt: &str, line: &str, width: usize) -> Result<()> {
    let available = width.saturating_sub(display_width(prompt) + 1);
    queue!(
        stdout,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::FromCursorDown),
        Print(prompt),
        Print(tail_with_ellipsis_display(line, available)),
        Print("\r\n")
    )?;
    stdout.flush()?;
    Ok(())
}

fn tail_with_ellipsis_display(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    if display_width(text) <= max_width {
        return text.to_string();
    }

    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let target = max_width - 3;
    let mut tail_rev = String::new();
    let mut used = 0usize;

    for ch in text.chars().rev() {
        let cw = char_display_width(ch);
        if used + cw > target {
            break;
        }
        tail_rev.push(ch);
        used += cw;
    }

    let tail: String = tail_rev.chars().rev().collect();
    format!("...{tail}")
}

fn clip_line_display(line: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    if display_width(line) <= max_width {
        return line.to_string();
    }

    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let mut out = String::new();
    let mut used = 0usize;
    let cap = max_width - 3;

    for ch in line.chars() {
        let cw = char_display_width(ch);
        if used + cw > cap {
            break;
        }
        out.push(ch);
        used += cw;
    }

    out.push_str("...");
    out
}

fn pad_line_display(line: &str, width: usize) -> String {
    let mut out = line.to_string();
    let used = display_width(line);
    if used < width {
        out.push_str(&" ".repeat(width - used));
    }
    out
}

fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn char_display_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

struct InputGuard;

impl InputGuard {
    fn enter(stdout: &mut Stdout) -> Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = Self;
        execute!(stdout, EnableBracketedPaste, cursor::Show)?;
        Ok(guard)
    }
}

impl Drop for InputGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableBracketedPaste, cursor::Show, ResetColor);
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

fn insert_char_at(input: &mut String, char_idx: usize, ch: char) {
    let byte_idx = byte_index_at_char(input, char_idx);
    input.insert(byte_idx, ch);
}

fn remove_char_at(input: &mut String, char_idx: usize) {
    let start = byte_index_at_char(input, char_idx);
    let end = byte_index_at_char(input, char_idx + 1);
    if start < end && end <= input.len() {
        input.replace_range(start..end, "");
    }
}

fn byte_index_at_char(input: &str, char_idx: usize) -> usize {
    input
        .char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}

fn char_index_at_byte(input: &str, byte_idx: usize) -> usize {
    input
        .char_indices()
        .take_while(|(idx, _)| *idx < byte_idx)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::argparser::ArgSpec;
    use crate::domain::cmd::{Command, CommandTree};
    use crate::domain::completer::CommandCompleter;
    use crate::domain::state::{SessionState, StateId};
    use crate::domain::validator::CommandValidator;

    fn tree() -> CommandTree {
        CommandTree::new()
            .with_command(Command::new("greet", |_| Ok(())).describe("say hello"))
            .unwrap()
            .with_command(
                Command::new("grep", |_| Ok(())).args(ArgSpec::new().required("pattern")),
            )
            .unwrap()
            .with_command(Command::new("exit", |_| Ok(())))
            .unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_text(editor: &mut Editor<'_>, text: &str) {
        for ch in text.chars() {
            assert_eq!(editor.handle_key(key(KeyCode::Char(ch))), Step::Continue);
        }
    }

    struct Fixture {
        tree: CommandTree,
        completer: CommandCompleter,
        state: SessionState,
        history: History,
    }

    impl Fixture {
        fn new() -> Self {
            let tree = tree();
            Self {
                completer: CommandCompleter::new(tree.clone()),
                tree,
                state: SessionState::new(StateId::ROOT),
                history: History::new(10),
            }
        }
    }

    #[test]
    fn tab_completes_unique_and_common_prefix() {
        let mut fx = Fixture::new();
        let validator = CommandValidator::new(&fx.tree, &fx.state);
        let mut editor = Editor::new(&fx.completer, &validator, &mut fx.history, false);

        type_text(&mut editor, "e");
        editor.handle_key(key(KeyCode::Tab));
        assert_eq!(editor.input, "exit ");

        editor.handle_key(ctrl('u'));
        type_text(&mut editor, "g");
        editor.handle_key(key(KeyCode::Tab));
        assert_eq!(editor.input, "gre");
        assert_eq!(editor.suggestions.len(), 2);

        editor.handle_key(key(KeyCode::Tab));
        assert_eq!(editor.selected, Some(0));
        editor.handle_key(key(KeyCode::Down));
        editor.handle_key(key(KeyCode::Enter));
        assert_eq!(editor.input, "grep ");
    }

    #[test]
    fn enter_rejects_invalid_input_with_error_hint() {
        let mut fx = Fixture::new();
        let validator = CommandValidator::new(&fx.tree, &fx.state);
        let mut editor = Editor::new(&fx.completer, &validator, &mut fx.history, true);

        type_text(&mut editor, "grep");
        editor.selected = None;
        assert_eq!(editor.submit(), Step::Continue);
        let hint = editor.hint().unwrap();
        assert_eq!(hint.color, Color::Red);
        assert!(hint.text.starts_with("error: "));

        type_text(&mut editor, " x");
        assert_eq!(editor.error, None);
        assert_eq!(editor.handle_key(key(KeyCode::Enter)), Step::Submit("grep x".into()));
        assert_eq!(fx.history.iter().collect::<Vec<_>>(), vec!["grep x"]);
    }

    #[test]
    fn history_navigation_restores_draft() {
        let mut fx = Fixture::new();
        fx.history.add("greet");
        fx.history.add("exit");
        let validator = CommandValidator::new(&fx.tree, &fx.state);
        let mut editor = Editor::new(&fx.completer, &validator, &mut fx.history, false);

        type_text(&mut editor, "gr");
        editor.suggestions.clear();
        editor.handle_key(key(KeyCode::Up));
        assert_eq!(editor.input, "exit");
        editor.handle_key(key(KeyCode::Up));
        assert_eq!(editor.input, "greet");
        editor.handle_key(key(KeyCode::Down));
        assert_eq!(editor.input, "exit");
        editor.handle_key(key(KeyCode::Down));
        assert_eq!(editor.input, "gr");
    }

    #[test]
    fn right_arrow_accepts_history_suggestion() {
        let mut fx = Fixture::new();
        fx.history.add("grep needle");
        let validator = CommandValidator::new(&fx.tree, &fx.state);
        let mut editor = Editor::new(&fx.completer, &validator, &mut fx.history, false);

        type_text(&mut editor, "grep n");
        assert_eq!(editor.ghost(), Some("eedle"));
        editor.handle_key(key(KeyCode::Right));
        assert_eq!(editor.input, "grep needle");
        assert_eq!(editor.ghost(), None);
    }

    #[test]
    fn control_keys_map_to_events() {
        let mut fx = Fixture::new();
        let validator = CommandValidator::new(&fx.tree, &fx.state);
        let mut editor = Editor::new(&fx.completer, &validator, &mut fx.history, false);

        type_text(&mut editor, "ab");
        editor.handle_key(key(KeyCode::Home));
        assert_eq!(editor.handle_key(ctrl('d')), Step::Continue);
        assert_eq!(editor.input, "b");
        editor.handle_key(key(KeyCode::Delete));
        assert_eq!(editor.handle_key(ctrl('d')), Step::Eof);
        assert_eq!(editor.handle_key(ctrl('c')), Step::Interrupted);
    }

    #[test]
    fn paste_inserts_at_cursor_as_single_line() {
        let mut fx = Fixture::new();
        let validator = CommandValidator::new(&fx.tree, &fx.state);
        let mut editor = Editor::new(&fx.completer, &validator, &mut fx.history, false);

        type_text(&mut editor, "gx");
        editor.handle_key(key(KeyCode::Left));
        editor.insert_str("re\nep");
        assert_eq!(editor.input, "gre epx");
        assert_eq!(editor.cursor, 6);
    }

    #[test]
    fn display_helpers_respect_width() {
        assert_eq!(tail_with_ellipsis_display("abcdefgh", 6), "...fgh");
        assert_eq!(clip_line_display("abcdefgh", 6), "abc...");
        assert_eq!(pad_line_display("한", 4), "한  ");
        assert_eq!(char_index_at_byte("한a", 3), 1);
        assert_eq!(byte_index_at_char("한a", 1), 3);
    }
}
