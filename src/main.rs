//! `hans` 바이너리 진입점.

use hans::interface::cli::{AppComposition, Cli, CliAction, run_repl};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let action = Cli::parse_action();
    let composition = AppComposition::default();

    match action {
        CliAction::InspectConfig => match composition.inspect_config_usecase().execute() {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: {err:#}");
                std::process::exit(1);
            }
        },
        CliAction::Interactive(options) => match run_repl(&composition, &options) {
            Ok(code) => std::process::exit(code),
            Err(err) => {
                eprintln!("error: {err:#}");
                std::process::exit(1);
            }
        },
    }
}
