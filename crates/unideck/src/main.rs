mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use unideck_config::Defaults;
use unideck_core::{Controller, ControllerConfig};

use crate::cli::{Cli, Command, LogFormat};
use crate::commands::Job;
use crate::error::CliError;
use crate::output::Output;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose, cli.global.log_format);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, format: LogFormat) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("UNIDECK_LOG").unwrap_or_else(|_| EnvFilter::new(filter));

    // stdout belongs to command output (and to the event stream in `serve`).
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "unideck", &mut std::io::stdout());
            Ok(())
        }

        // Config commands don't need a controller connection
        Command::Config(args) => {
            let defaults = config::load(&cli.global)
                .map_or_else(|_| Defaults::default(), |c| c.defaults);
            let out = Output::new(&cli.global, &defaults);
            commands::config_cmd::handle(args, &cli.global, &out)
        }

        Command::Serve => commands::serve::run(&cli.global).await,

        // All other commands log in first
        cmd => {
            let Some(job) = Job::from_command(cmd)? else {
                return Ok(());
            };
            let cfg = config::load(&cli.global)?;
            let out = Output::new(&cli.global, &cfg.defaults);
            let controller_config = unideck_config::to_controller_config(&cfg)?;

            let controller = Controller::new();
            let result =
                run_connected(&controller, controller_config, job, &out, cli.global.yes).await;
            controller.teardown().await;
            result
        }
    }
}

/// Log in, then run one command against the session.
async fn run_connected(
    controller: &Controller,
    config: ControllerConfig,
    job: Job,
    out: &Output,
    yes: bool,
) -> Result<(), CliError> {
    controller.connect_and_login(config).await?;
    tracing::debug!(?job, "dispatching command");
    commands::dispatch(job, controller, out, yes).await
}
