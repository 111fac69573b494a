//! procline: a command line whose commands run as logical processes.
//!
//! Without `-c` it starts the interactive session on the terminal. With
//! `-c LINE` it runs one command and exits with the command's status.

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use colored::Colorize;
use pl_core::commands::CommandRegistry;
use pl_core::config::{load_config, DEFAULT_CONFIG_FILE};
use pl_core::connection::Connection;
use pl_core::state::current_pid;
use pl_protocol::{Event, SessionConfig, Signal};
use pl_term::{input_stream, RawMode, Session, TerminalConnection};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Run commands as interruptible logical processes.
#[derive(Parser, Debug)]
#[command(name = "procline", version, about)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Run a single command line and exit with its status
    #[arg(short = 'c', value_name = "LINE")]
    command: Option<String>,

    /// Log at debug level regardless of RUST_LOG and the config
    #[arg(short, long)]
    verbose: bool,

    /// Print lifecycle events as JSON lines on stderr
    #[arg(long)]
    print_events: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    install_hooks()?;
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .wrap_err_with(|| format!("could not load {}", cli.config.display()))?;
    init_tracing(&config, cli.verbose);
    tracing::debug!(?cli, "parsed CLI arguments");

    let connection = Arc::new(TerminalConnection::new());
    let mut session = Session::new(
        connection.clone(),
        config,
        CommandRegistry::with_builtins(),
    );
    if cli.print_events {
        session = session.with_event_sink(print_event);
    }

    match cli.command {
        Some(line) => run_once(&mut session, connection, &line).await,
        None => run_interactive(&mut session, connection).await,
    }
}

/// Install color-eyre's report and panic hooks. Panics inside a command are
/// contained by its process and reported as a fault, so the panic report is
/// skipped for those.
fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        if current_pid().is_none() {
            panic_hook(info);
        }
    }));
    Ok(())
}

/// Install the fmt subscriber on stderr. `RUST_LOG` wins over the configured
/// filter; `--verbose` wins over both.
fn init_tracing(config: &SessionConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_once(
    session: &mut Session,
    connection: Arc<TerminalConnection>,
    line: &str,
) -> Result<ExitCode> {
    // The terminal stays cooked, so Ctrl-C arrives as SIGINT.
    let interrupter = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("received SIGINT");
            connection.deliver_signal(Signal::Int);
        }
    });

    let result = session.run_once(line).await.map_err(|e| eyre!(e));
    interrupter.abort();

    let code = result?.exit_code();
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

async fn run_interactive(
    session: &mut Session,
    connection: Arc<TerminalConnection>,
) -> Result<ExitCode> {
    println!(
        "{} {}",
        "procline".bold(),
        "type 'help' for commands, Ctrl-D to exit".dimmed()
    );

    let _raw = RawMode::enable(connection).map_err(|e| eyre!(e))?;
    session
        .run(input_stream())
        .await
        .map_err(|e| eyre!(e))?;
    Ok(ExitCode::SUCCESS)
}

fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(json) => eprintln!("{json}"),
        Err(e) => tracing::warn!(error = %e, "failed to serialize event"),
    }
}
