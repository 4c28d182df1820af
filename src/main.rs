//! churn-prep entry point

use churn_prep::cli::{cmd_info, cmd_transform, Cli, Commands};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "churn_prep=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transform {
            train,
            test,
            target,
            artifact,
        } => cmd_transform(&train, &test, &target, artifact.as_ref())?,
        Commands::Info { data } => cmd_info(&data)?,
    }

    Ok(())
}
