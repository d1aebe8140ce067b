//! Discord lookup command handler.

use mimic::{
    DiscordMessageSource, LookupOrigin, MessageHistory, MimicConfig, MimicResult, SystemClock,
    redact_id,
};
use std::sync::Arc;

/// Look up a user's recent messages in a channel and print a sample.
pub async fn run_fetch(
    config: &MimicConfig,
    guild: &str,
    channel: &str,
    user: &str,
    months: Option<u32>,
    limit: usize,
) -> MimicResult<()> {
    let source = Arc::new(DiscordMessageSource::new(&MimicConfig::discord_token()?));
    let history = MessageHistory::from_config(config, source, Arc::new(SystemClock))?;
    let months = months.unwrap_or(*config.time_span_months());

    let found = history.lookup(user, guild, channel, months).await;
    let who = redact_id(user);

    match found.origin() {
        LookupOrigin::Excluded => {
            println!("Sorry, messages for {who} are excluded.");
            return Ok(());
        }
        LookupOrigin::Unreachable(reason) => {
            println!("Could not access channel {channel}: {reason}");
            return Ok(());
        }
        LookupOrigin::Partial(reason) => {
            println!("Warning: history is incomplete ({reason}).");
        }
        LookupOrigin::UserCache | LookupOrigin::GuildCache | LookupOrigin::Fetched => {}
    }

    if found.messages().is_empty() {
        println!("No messages found for {who} in the last {months} months.");
        return Ok(());
    }

    let sample = found.sample_contents(limit);
    println!(
        "Found {} messages from {who} ({}), {} with text:",
        found.messages().len(),
        found.origin().as_ref(),
        sample.len()
    );
    println!("{:-<80}", "");
    for text in sample {
        println!("{text}");
    }
    Ok(())
}
