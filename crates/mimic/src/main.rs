//! Mimic CLI binary.
//!
//! This binary provides command-line access to the message cache:
//! - Partition cached channel entries by author
//! - Purge users from the cache
//! - Look up a user's history through Discord
//! - Inspect stored entries

use clap::Parser;
use mimic::{LoggingConfig, MimicConfig, init_logging};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, run_inspect, run_purge, run_separate};
    #[cfg(feature = "discord")]
    use cli::run_fetch;

    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    init_logging(&LoggingConfig::new(cli.verbose).with_json_logs(cli.json_logs))?;

    let config = match &cli.config {
        Some(path) => MimicConfig::from_file(path)?,
        None => MimicConfig::load()?,
    };

    // Execute the requested command
    match cli.command {
        Commands::Separate => run_separate(&config).await?,

        Commands::Purge { user } => run_purge(&config, user.as_deref()).await?,

        #[cfg(feature = "discord")]
        Commands::Fetch {
            guild,
            channel,
            user,
            months,
            limit,
        } => run_fetch(&config, &guild, &channel, &user, months, limit).await?,

        Commands::Inspect { format } => run_inspect(&config, format).await?,
    }

    Ok(())
}
