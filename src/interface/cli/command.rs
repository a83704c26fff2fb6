//! CLI 명령 파싱 모듈.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "hans")]
#[command(about = "Interactive command session toolkit demo shell")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use plain line input (no raw mode, no live suggestions)
    #[arg(long)]
    plain: bool,

    /// Read commands from a file instead of the terminal
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Prompt template ({user}, {host}, {context}, {path})
    #[arg(long, value_name = "TEMPLATE")]
    prompt: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show effective merged config and where it was loaded from
    Config,
}

/// 세션 실행 방식.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub plain: bool,
    pub script: Option<PathBuf>,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Interactive(SessionOptions),
    InspectConfig,
}

impl Cli {
    pub fn parse_action() -> CliAction {
        Cli::parse().into_action()
    }

    fn into_action(self) -> CliAction {
        match self.command {
            Some(Commands::Config) => CliAction::InspectConfig,
            None => CliAction::Interactive(SessionOptions {
                plain: self.plain,
                script: self.script,
                prompt: self.prompt,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(args: &[&str]) -> CliAction {
        Cli::try_parse_from(args).unwrap().into_action()
    }

    #[test]
    fn parses_session_flags() {
        assert_eq!(
            action(&["hans", "--plain", "--script", "cmds.txt", "--prompt", "> "]),
            CliAction::Interactive(SessionOptions {
                plain: true,
                script: Some(PathBuf::from("cmds.txt")),
                prompt: Some("> ".to_string()),
            })
        );
        assert_eq!(
            action(&["hans"]),
            CliAction::Interactive(SessionOptions::default())
        );
    }

    #[test]
    fn parses_config_subcommand() {
        assert_eq!(action(&["hans", "config"]), CliAction::InspectConfig);
    }
}
