//! Cache inspection command handler.

use super::commands::OutputFormat;
use mimic::{
    CacheStore, Clock, FileSystemCacheStore, JsonError, MimicConfig, MimicResult, SystemClock,
    file_name,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntrySummary {
    file: String,
    guild_id: String,
    channel_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    time_span_months: u32,
    message_count: usize,
    fetch_date: String,
    age_hours: i64,
    expired: bool,
}

/// Print every stored entry with its age and message count.
pub async fn run_inspect(config: &MimicConfig, format: OutputFormat) -> MimicResult<()> {
    let cache_config = config.cache_config()?;
    let clock = SystemClock;
    let store = FileSystemCacheStore::from_config(&cache_config, Arc::new(clock))?;
    let now = clock.now();
    let ttl = cache_config.ttl();

    let mut summaries = Vec::new();
    for key in store.keys().await? {
        let Some(entry) = store.load(&key).await? else {
            continue;
        };
        let scope = key.scope();
        summaries.push(EntrySummary {
            file: file_name(&key),
            guild_id: scope.guild_id.clone(),
            channel_id: scope.channel_id.clone(),
            user_id: key.user_id().map(str::to_string),
            time_span_months: scope.time_span_months,
            message_count: entry.message_count(),
            fetch_date: entry.fetched_at().to_rfc3339(),
            age_hours: entry.age(now).num_hours(),
            expired: entry.is_expired(now, ttl),
        });
    }

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summaries).map_err(JsonError::from)?;
            println!("{}", json);
        }
        OutputFormat::Human => {
            println!("Cache entries in {}:", cache_config.cache_dir().display());
            println!("{:-<80}", "");
            for s in &summaries {
                println!(
                    "{:<60} {:>6} msgs {:>5}h{}",
                    s.file,
                    s.message_count,
                    s.age_hours,
                    if s.expired { " (expired)" } else { "" }
                );
            }
            println!("{:-<80}", "");
            println!("Total: {} entries", summaries.len());
        }
    }
    Ok(())
}
