//! `go365` - Microsoft 365 from the command line.
//!
//! Mail, calendars and `OneDrive` over Microsoft Graph, with
//! `go365-<name>` executables on `PATH` picked up as extra subcommands.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command, ConfigCommand, MailCommand};
use commands::Session;

/// Default filter for `-v` repetitions when `RUST_LOG` is unset.
fn default_filter(verbose: u8) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    ["go365", "go365_core", "go365_graph", "go365_oauth"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn init_tracing(verbose: u8) {
    // Logs go to stderr so that stdout stays parseable with --json.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(command = ?cli.command, "starting");

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::External(args) => return commands::plugins::dispatch(args),
        Command::Plugins => commands::plugins::list()?,
        Command::Login(args) => commands::auth::login(&Session::new()?, &args).await?,
        Command::Logout => commands::auth::logout(&Session::new()?)?,
        Command::Status => commands::auth::status(&Session::new()?).await?,
        Command::Config(ConfigCommand::Set(args)) => commands::config::set(&Session::new()?, args)?,
        Command::Config(ConfigCommand::Show) => commands::config::show(&Session::new()?)?,
        Command::Mail(MailCommand::List(args)) => {
            commands::mail::list(&Session::new()?, args).await?;
        }
        Command::Mail(MailCommand::Get { id, output }) => {
            commands::mail::get(&Session::new()?, &id, output).await?;
        }
        Command::Mail(MailCommand::Send(args)) => {
            commands::mail::send(&Session::new()?, args).await?;
        }
        Command::Calendar(command) => commands::calendar::run(&Session::new()?, command).await?,
        Command::Drive(command) => commands::drive::run(&Session::new()?, command).await?,
    }
    Ok(ExitCode::SUCCESS)
}
