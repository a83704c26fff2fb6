//! 입력 라인 토큰화 및 명령 인자 파싱 모듈.
//!
//! 토큰화는 `shlex` 규칙(따옴표, 백슬래시 이스케이프, `#` 주석)을 따르며,
//! 자동완성을 위해 미완성 입력도 관대하게 분해할 수 있다.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("unterminated {quote} quote starting at offset {offset}")]
    Unterminated { quote: char, offset: usize },
    #[error("dangling escape at offset {offset}")]
    DanglingEscape { offset: usize },
}

impl TokenizeError {
    /// 오류가 시작된 바이트 오프셋.
    pub fn offset(&self) -> usize {
        match self {
            Self::Unterminated { offset, .. } | Self::DanglingEscape { offset } => *offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("missing value for option: --{0}")]
    MissingValue(String),
    #[error("option does not take a value: --{0}")]
    UnexpectedValue(String),
    #[error("missing required argument: <{0}>")]
    MissingArgument(String),
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

/// 자동완성용으로 분해된 미완성 입력.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialLine {
    /// 이미 완성된(공백으로 끝난) 단어들
    pub words: Vec<String>,
    /// 커서 아래에서 입력 중인 단어
    pub current: String,
    /// `current`가 시작되는 바이트 오프셋
    pub start: usize,
}

/// 오류를 내지 않는 스캐너. 단어 시작 오프셋과 열린 따옴표 위치를 함께 돌려준다.
struct Scan {
    words: Vec<String>,
    current: Option<(String, usize)>,
    open_quote: Option<(char, usize)>,
}

fn scan(line: &str) -> Scan {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<(char, usize)> = None;
    let mut chars = line.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        match quote {
            Some((q, _)) if ch == q => quote = None,
            Some(('"', _)) if ch == '\\' => {
                // 큰따옴표 안에서는 `\"`, `\\`만 이스케이프로 취급한다.
                match chars.peek() {
                    Some(&(_, next)) if next == '"' || next == '\\' => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push('\\'),
                }
            }
            Some(_) => current.push(ch),
            None => match ch {
                '\\' => {
                    start.get_or_insert(idx);
                    if let Some((_, next)) = chars.next() {
                        current.push(next);
                    }
                }
                '"' | '\'' => {
                    start.get_or_insert(idx);
                    quote = Some((ch, idx));
                }
                c if c.is_whitespace() => {
                    if start.take().is_some() {
                        words.push(std::mem::take(&mut current));
                    }
                }
                c => {
                    start.get_or_insert(idx);
                    current.push(c);
                }
            },
        }
    }

    Scan {
        words,
        current: start.map(|s| (current, s)),
        open_quote: quote,
    }
}

/// 한 줄 입력을 셸 규칙으로 토큰 목록으로 분해한다.
pub fn tokenize(line: &str) -> Result<Vec<String>, TokenizeError> {
    shlex::split(line).ok_or_else(|| match scan(line).open_quote {
        Some((quote, offset)) => TokenizeError::Unterminated { quote, offset },
        None => TokenizeError::DanglingEscape {
            offset: line.len().saturating_sub(1),
        },
    })
}

/// 닫히지 않은 따옴표를 허용하며 완성 단어와 입력 중인 단어를 분리한다.
pub fn split_partial(line: &str) -> PartialLine {
    let scan = scan(line);
    match scan.current {
        Some((current, start)) => PartialLine {
            words: scan.words,
            current,
            start,
        },
        None => PartialLine {
            words: scan.words,
            current: String::new(),
            start: line.len(),
        },
    }
}

#[derive(Debug, Clone)]
struct Positional {
    name: String,
    required: bool,
    variadic: bool,
}

#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub long: String,
    pub short: Option<char>,
    pub takes_value: bool,
}

/// 명령이 받는 인자 선언.
#[derive(Debug, Clone, Default)]
pub struct ArgSpec {
    positionals: Vec<Positional>,
    options: Vec<OptionSpec>,
}

impl ArgSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self, name: &str) -> Self {
        self.push_positional(name, true, false)
    }

    pub fn optional(self, name: &str) -> Self {
        self.push_positional(name, false, false)
    }

    /// 남은 위치 인자를 모두 받는 가변 인자.
    /// 선언 순서와 관계없이 마지막 위치 인자가 되며, 두 번째 가변 인자는 무시된다.
    pub fn rest(self, name: &str) -> Self {
        self.push_positional(name, false, true)
    }

    fn push_positional(mut self, name: &str, required: bool, variadic: bool) -> Self {
        let positional = Positional {
            name: name.to_string(),
            required,
            variadic,
        };
        match self.positionals.iter().position(|p| p.variadic) {
            Some(_) if variadic => {}
            Some(idx) => self.positionals.insert(idx, positional),
            None => self.positionals.push(positional),
        }
        self
    }

    pub fn flag(self, long: &str) -> Self {
        self.push_option(long, None, false)
    }

    pub fn short_flag(self, short: char, long: &str) -> Self {
        self.push_option(long, Some(short), false)
    }

    pub fn option(self, long: &str) -> Self {
        self.push_option(long, None, true)
    }

    pub fn short_option(self, short: char, long: &str) -> Self {
        self.push_option(long, Some(short), true)
    }

    fn push_option(mut self, long: &str, short: Option<char>, takes_value: bool) -> Self {
        self.options.push(OptionSpec {
            long: long.to_string(),
            short,
            takes_value,
        });
        self
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// 자동완성 후보용 `--long` 이름 목록.
    pub fn option_names(&self) -> impl Iterator<Item = String> + '_ {
        self.options.iter().map(|o| format!("--{}", o.long))
    }

    /// `cmd <a> [b] [rest...] [-f|--force] [--out <out>]` 형태의 사용법 문자열.
    pub fn usage(&self, path: &str) -> String {
        let mut out = path.to_string();
        for p in &self.positionals {
            let part = match (p.required, p.variadic) {
                (_, true) => format!(" [{}...]", p.name),
                (true, false) => format!(" <{}>", p.name),
                (false, false) => format!(" [{}]", p.name),
            };
            out.push_str(&part);
        }
        for o in &self.options {
            let name = match o.short {
                Some(short) => format!("-{short}|--{}", o.long),
                None => format!("--{}", o.long),
            };
            if o.takes_value {
                out.push_str(&format!(" [{name} <{}>]", o.long));
            } else {
                out.push_str(&format!(" [{name}]"));
            }
        }
        out
    }

    /// 토큰 목록을 선언에 맞춰 해석한다.
    pub fn parse(&self, tokens: &[String]) -> Result<ParsedArgs, ArgError> {
        let mut parsed = ParsedArgs {
            raw: tokens.to_vec(),
            ..ParsedArgs::default()
        };
        let mut loose = Vec::new();
        let mut only_positional = false;
        let mut iter = tokens.iter();

        while let Some(tok) = iter.next() {
            if only_positional {
                loose.push(tok.clone());
                continue;
            }
            if tok == "--" {
                only_positional = true;
                continue;
            }

            if let Some(body) = tok.strip_prefix("--") {
                let (name, inline) = match body.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (body, None),
                };
                let spec = self
                    .options
                    .iter()
                    .find(|o| o.long == name)
                    .ok_or_else(|| ArgError::UnknownOption(format!("--{name}")))?;
                apply_option(spec, inline, &mut iter, &mut parsed)?;
                continue;
            }

            if tok.len() > 1 && tok.starts_with('-') && !looks_numeric(tok) {
                let cluster: Vec<char> = tok.chars().skip(1).collect();
                for (idx, short) in cluster.iter().enumerate() {
                    let spec = self
                        .options
                        .iter()
                        .find(|o| o.short == Some(*short))
                        .ok_or_else(|| ArgError::UnknownOption(format!("-{short}")))?;
                    if spec.takes_value {
                        // `-ovalue` 또는 `-o value` 모두 허용한다.
                        let attached: String = cluster[idx + 1..].iter().collect();
                        let inline = (!attached.is_empty()).then_some(attached.as_str());
                        apply_option(spec, inline, &mut iter, &mut parsed)?;
                        break;
                    }
                    apply_option(spec, None, &mut iter, &mut parsed)?;
                }
                continue;
            }

            loose.push(tok.clone());
        }

        let mut remaining = loose.into_iter();
        for p in &self.positionals {
            if p.variadic {
                let all: Vec<String> = remaining.by_ref().collect();
                parsed.positionals.extend(all.iter().cloned());
                parsed.named.insert(p.name.clone(), all);
                break;
            }
            match remaining.next() {
                Some(value) => {
                    parsed.positionals.push(value.clone());
                    parsed.named.insert(p.name.clone(), vec![value]);
                }
                None if p.required => return Err(ArgError::MissingArgument(p.name.clone())),
                None => {}
            }
        }

        if let Some(extra) = remaining.next() {
            return Err(ArgError::UnexpectedArgument(extra));
        }

        Ok(parsed)
    }
}

fn apply_option<'a>(
    spec: &OptionSpec,
    inline: Option<&str>,
    iter: &mut impl Iterator<Item = &'a String>,
    parsed: &mut ParsedArgs,
) -> Result<(), ArgError> {
    if !spec.takes_value {
        if inline.is_some() {
            return Err(ArgError::UnexpectedValue(spec.long.clone()));
        }
        parsed.flags.insert(spec.long.clone());
        return Ok(());
    }

    let value = match inline {
        Some(v) => v.to_string(),
        None => iter
            .next()
            .cloned()
            .ok_or_else(|| ArgError::MissingValue(spec.long.clone()))?,
    };
    parsed
        .options
        .entry(spec.long.clone())
        .or_default()
        .push(value);
    Ok(())
}

fn looks_numeric(tok: &str) -> bool {
    tok[1..].parse::<f64>().is_ok()
}

/// 해석된 명령 인자.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    raw: Vec<String>,
    positionals: Vec<String>,
    /// 이름 있는 위치 인자
    named: BTreeMap<String, Vec<String>>,
    options: BTreeMap<String, Vec<String>>,
    flags: BTreeSet<String>,
}

impl ParsedArgs {
    /// 선언 없이 모든 토큰을 위치 인자로 받는다.
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self {
            positionals: tokens.clone(),
            raw: tokens,
            ..Self::default()
        }
    }

    /// 이름 있는 위치 인자의 값, 없으면 같은 이름 옵션의 마지막 값.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.argument(name).or_else(|| self.option(name))
    }

    /// `get`과 같은 우선순위로 모든 값을 돌려준다.
    pub fn get_all(&self, name: &str) -> &[String] {
        match self.named.get(name) {
            Some(values) if !values.is_empty() => values,
            _ => self.option_all(name),
        }
    }

    pub fn argument(&self, name: &str) -> Option<&str> {
        self.named
            .get(name)
            .and_then(|v| v.last())
            .map(String::as_str)
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.option_all(name).last().map(String::as_str)
    }

    pub fn option_all(&self, name: &str) -> &[String] {
        self.options.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}
