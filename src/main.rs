use std::{panic::AssertUnwindSafe, process::ExitCode};

use clap::Parser;
use color_eyre::Result;
use glossary_linker::{
    cli::{Cli, CliProcess},
    config::Config,
    errors, logging,
    process::{Process, ProcessOutput},
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse cli arguments
    let args = Cli::parse();

    // Initialize the config
    let config = Config::init(args.config.clone())?;

    // Initialize logging
    let (logs_path, logs_filter) = logging::resolve_path_and_filter(&config);
    let log_path = logging::init(logs_path, logs_filter)?;

    tracing::info!("glossary-linker v{}", env!("CARGO_PKG_VERSION"));

    // Run the process, within the error handlers
    let mut success = true;
    errors::init(
        log_path,
        AssertUnwindSafe(async {
            let output = run(args, config).await?;
            success = output.success;
            print_output(output);
            Ok(())
        }),
    )
    .await?;

    Ok(if success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run(args: Cli, config: Config) -> Result<ProcessOutput> {
    match args.process {
        CliProcess::Define(process) => process.execute(config).await,
        CliProcess::Route(process) => process.execute(config).await,
        CliProcess::Config(mut process) => {
            process.config_file = args.config;
            process.execute(config).await
        }
    }
}

fn print_output(output: ProcessOutput) {
    if let Some(stderr) = output.stderr {
        eprintln!("{stderr}");
    }
    if let Some(stdout) = output.stdout {
        print!("{stdout}");
    }
}
