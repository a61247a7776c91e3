//! flowlab - interactive OAuth 2.0 / OIDC flow harness
//!
//! Main entry point for the command-line binary.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use flowlab_app::utils::logging::init_tracing;
use flowlab_app::{execute, AppContext, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(std::io::stderr(), "error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = AppContext::new(cli.config)?;
    let mut stdout = std::io::stdout().lock();
    execute(&ctx, cli.command, &mut stdout).await?;
    stdout.flush()?;
    Ok(())
}
