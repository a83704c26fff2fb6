//! `hans` 바이너리에 들어 있는 예제 명령 모음.
//! 인자 선언, 하위 명령 그룹, 컨텍스트 이동, 실행 중 컬렉션 추가/제거, 사용 가능 조건을 모두 보여 준다.

use anyhow::{Context, Result, anyhow, bail};

use crate::application::session::Session;
use crate::domain::argparser::ArgSpec;
use crate::domain::cmd::{Command, CommandTree, Invocation};
use crate::domain::state::StateId;
use crate::infrastructure::io::{colored_title, terminal_width, title};

pub const NOTES_CONTEXT: &str = "notes";
const EXTRAS_COLLECTION: &str = "extras";
const NOTES_KEY: &str = "notes";
const ADMIN_KEY: &str = "admin";

/// 루트 컨텍스트에 등록할 예제 명령.
pub fn demo_commands() -> Result<CommandTree> {
    let net = CommandTree::new()
        .with_command(
            Command::new("ping", ping)
                .describe("pretend to ping a host")
                .args(ArgSpec::new().required("host").short_option('c', "count")),
        )?
        .with_command(
            Command::new("lookup", lookup)
                .describe("pretend to resolve a host name")
                .args(ArgSpec::new().required("host")),
        )?;

    let tree = CommandTree::new()
        .with_command(
            Command::new("echo", echo)
                .describe("print the given words")
                .args(ArgSpec::new().rest("words").short_flag('u', "upper")),
        )?
        .with_command(
            Command::new("set", set_var)
                .describe("store a session variable")
                .args(ArgSpec::new().required("key").rest("value")),
        )?
        .with_command(
            Command::new("get", get_var)
                .describe("show a session variable")
                .args(ArgSpec::new().required("key")),
        )?
        .with_command(Command::new("vars", vars).describe("list session variables"))?
        .with_command(Command::new("notes", enter_notes).describe("open the notebook context"))?
        .with_command(Command::new("login", login).describe("unlock admin commands"))?
        .with_command(
            Command::new("logout", logout)
                .describe("lock admin commands")
                .available_when(|state| state.contains(ADMIN_KEY)),
        )?
        .with_command(
            Command::new("shutdown", shutdown)
                .describe("end the session with a code (admin only)")
                .args(ArgSpec::new().optional("code"))
                .available_when(|state| state.contains(ADMIN_KEY)),
        )?
        .with_command(Command::new("load-extras", load_extras).describe("register extra commands"))?
        .with_command(
            Command::new("unload-extras", unload_extras).describe("drop the extra commands"),
        )?
        .with_group("net", net)?;
    Ok(tree)
}

/// 메모장 컨텍스트를 루트 아래에 만든다. 상위 명령(help/back/exit 포함)을 물려받는다.
pub fn install_contexts(session: &mut Session) -> Result<StateId> {
    let notes = session.add_context(StateId::ROOT, NOTES_CONTEXT, NOTES_CONTEXT, true)?;
    let commands = CommandTree::new()
        .with_command(
            Command::new("add", add_note)
                .describe("append a note")
                .args(ArgSpec::new().required("text").rest("more")),
        )?
        .with_command(Command::new("list", list_notes).describe("show all notes").alias("ls"))?
        .with_command(Command::new("clear", clear_notes).describe("delete all notes"))?;
    session.extend_context(notes, NOTES_CONTEXT, commands)?;
    Ok(notes)
}

fn echo(inv: &mut Invocation<'_>) -> Result<()> {
    let text = inv.args.get_all("words").join(" ");
    let text = if inv.args.flag("upper") {
        text.to_uppercase()
    } else {
        text
    };
    inv.print(&text)
}

fn set_var(inv: &mut Invocation<'_>) -> Result<()> {
    let key = inv.args.get("key").unwrap_or_default().to_string();
    let value = inv.args.get_all("value").join(" ");
    inv.session.state_mut().set(&key, &value)?;
    inv.success(&format!("{key} = {value}"))
}

fn get_var(inv: &mut Invocation<'_>) -> Result<()> {
    let key = inv.args.get("key").unwrap_or_default().to_string();
    let value = inv
        .session
        .state()
        .vars()
        .get(&key)
        .map(|value| value.to_string())
        .ok_or_else(|| anyhow!("no variable named {key}"))?;
    inv.print(&value)
}

fn vars(inv: &mut Invocation<'_>) -> Result<()> {
    let lines: Vec<String> = inv
        .session
        .state()
        .vars()
        .iter()
        .map(|(key, value)| format!("  {key} = {value}"))
        .collect();
    if lines.is_empty() {
        return inv.info("no variables set");
    }
    for line in lines {
        inv.print(&line)?;
    }
    Ok(())
}

fn enter_notes(inv: &mut Invocation<'_>) -> Result<()> {
    let id = inv
        .session
        .contexts()
        .child(StateId::ROOT, NOTES_CONTEXT)
        .ok_or_else(|| anyhow!("notes context is not installed"))?;
    inv.session.enter(id)?;
    inv.info("type `back` to return")
}

fn add_note(inv: &mut Invocation<'_>) -> Result<()> {
    let mut words = vec![inv.args.get("text").unwrap_or_default().to_string()];
    words.extend(inv.args.get_all("more").iter().cloned());
    let note = words.join(" ");

    let state = inv.session.state_mut();
    let mut notes: Vec<String> = state.get(NOTES_KEY).unwrap_or_default();
    notes.push(note);
    let count = notes.len();
    state.set(NOTES_KEY, notes)?;
    inv.success(&format!("note #{count} saved"))
}

fn list_notes(inv: &mut Invocation<'_>) -> Result<()> {
    let notes: Vec<String> = inv.session.state().get(NOTES_KEY).unwrap_or_default();
    if notes.is_empty() {
        return inv.info("the notebook is empty");
    }
    for (idx, note) in notes.iter().enumerate() {
        inv.print(&format!("{:>3}. {note}", idx + 1))?;
    }
    Ok(())
}

fn clear_notes(inv: &mut Invocation<'_>) -> Result<()> {
    inv.session.state_mut().remove(NOTES_KEY);
    inv.success("notebook cleared")
}

fn ping(inv: &mut Invocation<'_>) -> Result<()> {
    let host = inv.args.get("host").unwrap_or_default().to_string();
    let count = match inv.args.get("count") {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("invalid count: {raw}"))?,
        None => 1,
    };
    if count == 0 {
        bail!("count must be at least 1");
    }
    for seq in 1..=count {
        inv.print(&format!("reply from {host}: seq={seq}"))?;
    }
    Ok(())
}

fn lookup(inv: &mut Invocation<'_>) -> Result<()> {
    let host = inv.args.get("host").unwrap_or_default().to_string();
    if host == "localhost" {
        inv.success("localhost -> 127.0.0.1")
    } else {
        inv.warn(&format!("{host}: no resolver configured"))
    }
}

fn login(inv: &mut Invocation<'_>) -> Result<()> {
    inv.session.state_mut().set(ADMIN_KEY, true)?;
    inv.success("admin commands unlocked")
}

fn logout(inv: &mut Invocation<'_>) -> Result<()> {
    inv.session.state_mut().remove(ADMIN_KEY);
    inv.success("admin commands locked")
}

fn shutdown(inv: &mut Invocation<'_>) -> Result<()> {
    let code = match inv.args.get("code") {
        Some(raw) => raw
            .parse::<i32>()
            .with_context(|| format!("invalid exit code: {raw}"))?,
        None => 0,
    };
    inv.warn("shutting down")?;
    inv.session.exit(code);
    Ok(())
}

fn load_extras(inv: &mut Invocation<'_>) -> Result<()> {
    let extras = CommandTree::new().with_command(
        Command::new("banner", banner)
            .describe("print a framed title")
            .args(ArgSpec::new().rest("text").short_flag('c', "color")),
    )?;
    inv.session.extend(EXTRAS_COLLECTION, extras);
    inv.success("extra commands loaded: banner")
}

fn unload_extras(inv: &mut Invocation<'_>) -> Result<()> {
    inv.session.remove(EXTRAS_COLLECTION)?;
    inv.success("extra commands removed")
}

fn banner(inv: &mut Invocation<'_>) -> Result<()> {
    let text = inv.args.get_all("text").join(" ");
    let text = if text.is_empty() { "hans".to_string() } else { text };
    let width = terminal_width().min(60);
    let framed = if inv.args.flag("color") {
        colored_title(&text, width)
    } else {
        title(&text, width)
    };
    for line in framed.lines() {
        inv.print(line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::MessageLevel;
    use crate::infrastructure::io::ScriptedIo;

    fn run(lines: &[&str]) -> (i32, Vec<(MessageLevel, String)>) {
        let io = ScriptedIo::new(lines.iter().copied());
        let handle = io.clone();
        let mut session = Session::new(Box::new(io), demo_commands().unwrap()).unwrap();
        install_contexts(&mut session).unwrap();
        let code = session.handle_forever().unwrap();
        (code, handle.messages())
    }

    fn texts(messages: Vec<(MessageLevel, String)>) -> Vec<String> {
        messages.into_iter().map(|(_, m)| m).collect()
    }

    #[test]
    fn echo_and_variables() {
        let (_, out) = run(&["echo -u hi 'there you'", "set who bob smith", "get who", "vars"]);
        assert_eq!(
            texts(out),
            vec![
                "HI THERE YOU",
                "who = bob smith",
                "\"bob smith\"",
                "  who = \"bob smith\"",
            ]
        );
    }

    #[test]
    fn notes_context_inherits_root_commands() {
        let (_, out) = run(&[
            "add x",
            "notes",
            "add buy milk",
            "ls",
            "echo still here",
            "back",
            "list",
        ]);
        assert_eq!(
            texts(out),
            vec![
                "Unknown command: \"add x\"",
                "type `back` to return",
                "note #1 saved",
                "  1. buy milk",
                "still here",
                "Unknown command: \"list\"",
            ]
        );
    }

    #[test]
    fn net_group_requires_subcommand() {
        let (_, out) = run(&["net", "net ping h -c 2", "net ping h --count 0"]);
        let out = texts(out);
        assert_eq!(out[0], "\"net\" has several sub-commands");
        assert_eq!(out[1..3], ["reply from h: seq=1", "reply from h: seq=2"]);
        assert_eq!(out[3], "Error while executing command: count must be at least 1");
    }

    #[test]
    fn admin_commands_follow_login_state() {
        let (code, out) = run(&["shutdown", "login", "shutdown 4", "echo unreachable"]);
        assert_eq!(code, 4);
        assert_eq!(
            texts(out),
            vec![
                "\"shutdown\" is not usable in the current context",
                "admin commands unlocked",
                "shutting down",
            ]
        );
    }

    #[test]
    fn banner_frames_text_with_or_without_color() {
        let (_, out) = run(&["load-extras", "banner hello", "banner -c hello"]);
        let out = texts(out);
        assert_eq!(out.len(), 7);
        for frame in [&out[1..4], &out[4..7]] {
            assert!(!frame[0].is_empty() && frame[0].chars().all(|c| c == '='));
            assert_eq!(frame[0], frame[2]);
        }
        assert_eq!(out[2].trim(), "hello");
    }

    #[test]
    fn extras_can_be_loaded_and_removed() {
        let (_, out) = run(&["load-extras", "unload-extras", "banner", "unload-extras"]);
        assert_eq!(
            texts(out),
            vec![
                "extra commands loaded: banner",
                "extra commands removed",
                "Unknown command: \"banner\"",
                "Error while executing command: unknown command collection: extras",
            ]
        );
    }
}
