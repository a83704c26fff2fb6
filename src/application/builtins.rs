//! 모든 세션에 기본으로 붙는 명령(help/back/exit).

use anyhow::{Context, Result, anyhow};
use unicode_width::UnicodeWidthStr;

use crate::domain::argparser::ArgSpec;
use crate::domain::cmd::{Command, CommandTree, Invocation, Node, TreeError};
use crate::domain::state::SessionState;

pub fn builtin_commands() -> Result<CommandTree, TreeError> {
    CommandTree::new()
        .with_command(
            Command::new("help", help)
                .describe("show available commands")
                .args(ArgSpec::new().rest("command")),
        )?
        .with_command(Command::new("back", back).describe("leave the current context"))?
        .with_command(
            Command::new("exit", exit)
                .describe("end the session")
                .alias("quit")
                .args(ArgSpec::new().optional("code")),
        )
}

fn help(inv: &mut Invocation<'_>) -> Result<()> {
    let path = inv.args.get_all("command").to_vec();
    let lines = {
        let tree = inv.session.commands();
        let state = inv.session.state();
        if path.is_empty() {
            listing(tree, "", state)
        } else {
            match tree.find(&path) {
                Some(Node::Group(group)) => listing(group, &path.join(" "), state),
                Some(Node::Command(cmd)) => {
                    let mut lines = vec![cmd.usage_line(&path.join(" "))];
                    if !cmd.description().is_empty() {
                        lines.push(format!("  {}", cmd.description()));
                    }
                    if !cmd.aliases().is_empty() {
                        lines.push(format!("  aliases: {}", cmd.aliases().join(", ")));
                    }
                    lines
                }
                None => return Err(anyhow!("no help for \"{}\"", path.join(" "))),
            }
        }
    };

    for line in lines {
        inv.print(&line)?;
    }
    Ok(())
}

/// 그룹 하나의 명령 목록. 별칭 항목과 현재 사용할 수 없는 명령은 숨긴다.
fn listing(tree: &CommandTree, prefix: &str, state: &SessionState) -> Vec<String> {
    let mut rows = Vec::new();
    for (name, node) in tree.iter() {
        let full = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix} {name}")
        };
        match node {
            Node::Command(cmd) => {
                if cmd.name() != name || !cmd.available(state) {
                    continue;
                }
                rows.push((cmd.usage_line(&full), cmd.description().to_string()));
            }
            Node::Group(group) => {
                rows.push((
                    format!("{full} <sub-command>"),
                    format!("{} sub-commands", group.len()),
                ));
            }
        }
    }

    // 한글 등 넓은 문자도 열이 맞도록 표시 폭으로 채운다.
    let width = rows
        .iter()
        .map(|(usage, _)| UnicodeWidthStr::width(usage.as_str()))
        .max()
        .unwrap_or(0);
    rows.into_iter()
        .map(|(usage, description)| {
            let pad = " ".repeat(width - UnicodeWidthStr::width(usage.as_str()));
            format!("  {usage}{pad}  {description}")
                .trim_end()
                .to_string()
        })
        .collect()
}

fn back(inv: &mut Invocation<'_>) -> Result<()> {
    if !inv.session.leave() {
        inv.warn("already at the top level")?;
    }
    Ok(())
}

fn exit(inv: &mut Invocation<'_>) -> Result<()> {
    let code = match inv.args.get("code") {
        Some(raw) => raw
            .parse::<i32>()
            .with_context(|| format!("invalid exit code: {raw}"))?,
        None => 0,
    };
    inv.session.exit(code);
    Ok(())
}
