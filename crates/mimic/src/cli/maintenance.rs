//! Cache maintenance command handlers.

use mimic::{
    CacheMaintainer, FileSystemCacheStore, MimicConfig, MimicResult, SystemClock, UserPartitioner,
    redact_id,
};
use std::sync::Arc;

/// Partition every cached channel entry by author.
pub async fn run_separate(config: &MimicConfig) -> MimicResult<()> {
    let store = Arc::new(FileSystemCacheStore::from_config(&config.cache_config()?, Arc::new(SystemClock))?);
    let written = UserPartitioner::new(store).partition_all().await?;

    if written.is_empty() {
        println!("No channel entries to separate.");
        return Ok(());
    }
    for (key, users) in &written {
        println!("{key}: {users} user entries");
    }
    println!("Separated {} channel entries.", written.len());
    Ok(())
}

/// Purge one user, or every excluded user when `user` is `None`.
pub async fn run_purge(config: &MimicConfig, user: Option<&str>) -> MimicResult<()> {
    let cache_config = config.cache_config()?;
    let store = Arc::new(FileSystemCacheStore::from_config(&cache_config, Arc::new(SystemClock))?);
    let maintainer = CacheMaintainer::new(store, *cache_config.maintenance_concurrency());

    let reports = match user {
        Some(user_id) => vec![maintainer.purge(user_id).await?],
        None => {
            if config.excluded_users().is_empty() {
                println!("No excluded users configured, nothing to clean.");
                return Ok(());
            }
            maintainer.purge_all(config.excluded_users()).await?
        }
    };

    for report in &reports {
        println!(
            "{}: removed {} user entries, {} messages from {} of {} channel entries{}",
            redact_id(report.user_id()),
            report.user_entries_removed(),
            report.messages_removed(),
            report.guild_entries_rewritten(),
            report.guild_entries_checked(),
            match report.failures() {
                0 => String::new(),
                n => format!(" ({n} failures)"),
            }
        );
    }
    Ok(())
}
