//! 줄 단위 입출력. 표준 입출력이나 스크립트 파일처럼 raw mode를 쓸 수 없는 경우에 사용한다.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use anyhow::{Context, Result};
use tracing::debug;

use super::format::{format_message, plain_message};
use crate::application::ports::{Io, PromptRequest, ReadEvent};
use crate::domain::message::MessageLevel;

pub struct PlainIo<R, W> {
    reader: R,
    writer: W,
    color: bool,
    echo: bool,
}

impl PlainIo<StdinLock<'static>, Stdout> {
    pub fn stdio(color: bool) -> Self {
        Self::new(io::stdin().lock(), io::stdout()).color(color)
    }
}

impl<R: BufRead, W: Write> PlainIo<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            color: false,
            echo: false,
        }
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// 읽은 줄을 프롬프트 뒤에 다시 출력한다. 스크립트 실행 기록을 남길 때 쓴다.
    pub fn echo(mut self, enabled: bool) -> Self {
        self.echo = enabled;
        self
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn read_raw(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.writer, "{prompt}")?;
        self.writer.flush()?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .context("failed to read input line")?;
        if read == 0 {
            if !prompt.is_empty() {
                writeln!(self.writer)?;
            }
            return Ok(None);
        }

        let line = trim_newline(line);
        if self.echo {
            writeln!(self.writer, "{line}")?;
        }
        Ok(Some(line))
    }
}

impl<R: BufRead, W: Write> Io for PlainIo<R, W> {
    /// 검증에 실패한 줄은 오류를 출력하고 다시 입력을 받는다.
    fn read_line(&mut self, request: &PromptRequest<'_>) -> Result<ReadEvent> {
        loop {
            let Some(line) = self.read_raw(request.prompt)? else {
                return Ok(ReadEvent::Eof);
            };
            match request.validator.validate(&line) {
                Ok(()) => return Ok(ReadEvent::Line(line)),
                Err(err) => {
                    debug!(input = %line, error = %err, "rejected input");
                    self.write(MessageLevel::Error, &err.message)?;
                }
            }
        }
    }

    fn write(&mut self, level: MessageLevel, text: &str) -> Result<()> {
        let rendered = if self.color {
            format_message(level, text)
        } else {
            plain_message(level, text)
        };
        writeln!(self.writer, "{rendered}")?;
        Ok(())
    }
}

pub(crate) fn trim_newline(mut s: String) -> String {
    while matches!(s.chars().last(), Some('\n' | '\r')) {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::domain::completer::CommandCompleter;
    use crate::domain::validator::PredicateValidator;

    fn read_all(input: &str, echo: bool) -> (Vec<ReadEvent>, String) {
        let mut io = PlainIo::new(Cursor::new(input.to_string()), Vec::new()).echo(echo);
        let completer = CommandCompleter::default();
        let validator = PredicateValidator::new(|line: &str| !line.contains('!'), "no bangs");
        let request = PromptRequest {
            prompt: "> ",
            completer: &completer,
            validator: &validator,
        };

        let mut events = Vec::new();
        loop {
            let event = io.read_line(&request).unwrap();
            let done = event == ReadEvent::Eof;
            events.push(event);
            if done {
                break;
            }
        }
        let (_, out) = io.into_inner();
        (events, String::from_utf8(out).unwrap())
    }

    #[test]
    fn reads_lines_until_eof_and_rejects_invalid() {
        let (events, out) = read_all("one\r\nbad!\ntwo", false);
        assert_eq!(
            events,
            vec![
                ReadEvent::Line("one".into()),
                ReadEvent::Line("two".into()),
                ReadEvent::Eof,
            ]
        );
        assert_eq!(out, "> > [-] no bangs\n> > \n");
    }

    #[test]
    fn echo_repeats_input_after_prompt() {
        let (_, out) = read_all("hi\n", true);
        assert_eq!(out, "> hi\n> \n");
    }

    #[test]
    fn writes_plain_symbols_without_color() {
        let mut io = PlainIo::new(Cursor::new(String::new()), Vec::new());
        io.write(MessageLevel::Success, "done").unwrap();
        io.write(MessageLevel::Plain, "raw").unwrap();
        let (_, out) = io.into_inner();
        assert_eq!(String::from_utf8(out).unwrap(), "[+] done\nraw\n");
    }
}
