//! `hans` 대화형 쉘(REPL) 인터페이스.

use std::io::{self, IsTerminal};

use anyhow::Result;
use crossterm::style::Stylize;

use crate::interface::cli::command::SessionOptions;
use crate::interface::cli::composition::AppComposition;
use crate::infrastructure::io::{center_text, hr, terminal_width};

/// 예제 세션을 실행하고 종료 코드를 돌려준다.
pub fn run_repl(composition: &AppComposition, options: &SessionOptions) -> Result<i32> {
    let config = composition.load_config()?;
    let mut session = composition.demo_session(&config, options)?;

    if options.script.is_none() {
        print_welcome(config.color() && io::stdout().is_terminal());
    }
    session.handle_forever()
}

fn print_welcome(color: bool) {
    let width = terminal_width().min(64);
    let heading = center_text("hans interactive shell", width);
    let heading = if color {
        heading.cyan().bold().to_string()
    } else {
        heading
    };

    println!("{}", hr('-', width));
    println!("{heading}");
    println!("{}", hr('-', width));
    println!("  help            list commands in the current context");
    println!("  notes           open the notebook context (back to leave)");
    println!("  net <Tab>       sub-command group");
    println!("  exit [code]     leave the shell");
    println!("{}", hr('-', width));
    println!();
}
