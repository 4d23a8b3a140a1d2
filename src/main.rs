use clap::Parser;
use smart_selector::cli::commands::{cmd_classify, cmd_generate, cmd_query, cmd_replay};
use smart_selector::cli::config::{Cli, Commands, load_config, log_filter};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Generate {
            document,
            target,
            json,
            trace,
        } => {
            cmd_generate(
                &document,
                &target,
                json,
                trace.as_deref(),
                &config,
                cli.verbose,
            )?;
        }
        Commands::Classify { values } => {
            cmd_classify(&values)?;
        }
        Commands::Query { document, selector } => {
            cmd_query(&document, &selector)?;
        }
        Commands::Replay { document, requests } => {
            cmd_replay(&document, &requests, &config)?;
        }
    }

    Ok(())
}
