use clap::ArgMatches;
use format_bytes::format_bytes;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exitcode;
mod ui;
use error::CommandError;

/// Enable an env-filtered logger to stderr
fn setup_tracing() {
    let registry =
        tracing_subscriber::registry().with(EnvFilter::from_default_env());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    registry.with(fmt_layer).init()
}

fn main() {
    setup_tracing();
    let app = clap::command!()
        .subcommand_required(true)
        .subcommand(commands::build::args())
        .subcommand(commands::suggest::args())
        .subcommand(commands::debugnodes::args());

    let matches = app.get_matches();

    let ui = ui::Ui::new();

    let command_result = match_subcommand(matches, &ui);

    let exit_code = match command_result {
        Ok(()) => exitcode::OK,
        Err(CommandError::Abort { message }) => {
            if !message.is_empty() {
                // Ignore errors when writing to stderr, we're already exiting
                // with failure code so there's not much more we can do.
                let _ =
                    ui.write_stderr(&format_bytes!(b"abort: {}\n", message));
            }
            exitcode::ABORT
        }
        Err(CommandError::StdoutError | CommandError::StderrError) => {
            exitcode::ABORT
        }
    };
    std::process::exit(exit_code)
}

fn match_subcommand(
    matches: ArgMatches,
    ui: &ui::Ui,
) -> Result<(), CommandError> {
    match matches.subcommand() {
        Some(("build", args)) => commands::build::run(ui, args),
        Some(("suggest", args)) => commands::suggest::run(ui, args),
        Some(("debugnodes", args)) => commands::debugnodes::run(ui, args),
        _ => unreachable!(), // Because of subcommand_required(true),
    }
}
