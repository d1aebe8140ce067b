//! Bounded backwards pagination over a message source.

use crate::{MAX_PAGE_SIZE, MessageSource};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use mimic_core::{Clock, ExclusionList, Message, TimeWindow};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn default_max_batches() -> u32 {
    30
}

fn default_page_size() -> u8 {
    MAX_PAGE_SIZE
}

/// Pagination limits.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct FetchConfig {
    /// Most pages requested for a single fetch
    #[serde(default = "default_max_batches")]
    max_batches: u32,

    /// Messages requested per page, at most 100
    #[serde(default = "default_page_size")]
    page_size: u8,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_batches: default_max_batches(),
            page_size: default_page_size(),
        }
    }
}

impl FetchConfig {
    fn effective_page_size(&self) -> u8 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// One channel history to retrieve.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct FetchRequest {
    channel_id: String,
    window: TimeWindow,
    author: Option<String>,
}

impl FetchRequest {
    /// Every author's messages in `channel_id` within the last `months` months.
    pub fn channel(channel_id: impl Into<String>, months: u32) -> Self {
        Self {
            channel_id: channel_id.into(),
            window: TimeWindow::months(months),
            author: None,
        }
    }

    /// Keep only messages written by `author`.
    pub fn narrowed_to(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// Why pagination ended.
#[derive(Debug, Clone, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FetchStop {
    /// The source returned an empty page.
    Exhausted,
    /// A whole page lay before the start of the window.
    WindowDone,
    /// The batch ceiling was reached.
    LimitHit,
    /// A page request failed after at least one page had been read.
    Interrupted(String),
    /// The channel could not be read at all.
    Unreachable(String),
}

impl FetchStop {
    /// Whether the collected messages cover everything the walk was meant to see.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Exhausted | Self::WindowDone | Self::LimitHit)
    }
}

/// Result of a fetch.
#[derive(Debug, Clone, Getters)]
pub struct FetchOutcome {
    /// Kept messages, newest first
    messages: Vec<Message>,
    /// Reason the walk ended
    stop: FetchStop,
    /// Pages successfully read
    batches: u32,
}

impl FetchOutcome {
    /// Take the kept messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

enum Walk {
    Fetching { cursor: Option<String> },
    Done(FetchStop),
}

struct Accumulator<'a> {
    cutoff: DateTime<Utc>,
    exclusions: &'a ExclusionList,
    author: Option<&'a str>,
    kept: Vec<Message>,
}

impl Accumulator<'_> {
    /// Fold one page in and decide what happens next.
    ///
    /// The window check looks at the raw page, before any filtering, so a
    /// page made up entirely of excluded authors still moves the walk along.
    /// Only a page with nothing newer than the cutoff ends the walk.
    fn absorb(&mut self, page: Vec<Message>) -> Walk {
        let Some(oldest) = page.last() else {
            return Walk::Done(FetchStop::Exhausted);
        };
        let cursor = oldest.id().clone();
        let past_window = page.iter().all(|m| *m.created_at() < self.cutoff);

        self.kept.extend(page.into_iter().filter(|m| {
            *m.created_at() > self.cutoff
                && self.exclusions.admits(m)
                && self.author.is_none_or(|a| m.author_id() == a)
        }));

        if past_window {
            Walk::Done(FetchStop::WindowDone)
        } else {
            Walk::Fetching {
                cursor: Some(cursor),
            }
        }
    }
}

/// Walks a channel's history backwards from the newest message.
///
/// Each page is requested with the oldest id of the previous page as its
/// cursor. The walk ends on the first empty page, on the first page lying
/// entirely before the window, after `max_batches` pages, or on a failed
/// request. A failed request never discards what was already collected.
#[derive(Debug, Clone)]
pub struct PaginatedFetcher {
    config: FetchConfig,
    clock: Arc<dyn Clock>,
}

impl PaginatedFetcher {
    /// Fetcher with the given limits, measuring windows against `clock`.
    pub fn new(config: FetchConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Limits in use.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Collect `request` from `source`, dropping excluded authors.
    #[tracing::instrument(
        skip(self, source, request, exclusions),
        fields(
            channel = %request.channel_id(),
            months = request.window().span_months(),
            narrowed = request.author().is_some()
        )
    )]
    pub async fn fetch(
        &self,
        source: &dyn MessageSource,
        request: &FetchRequest,
        exclusions: &ExclusionList,
    ) -> FetchOutcome {
        let mut acc = Accumulator {
            cutoff: request.window().cutoff(self.clock.now()),
            exclusions,
            author: request.author().as_deref(),
            kept: Vec::new(),
        };
        let page_size = self.config.effective_page_size();
        let mut batches = 0u32;
        let mut walk = Walk::Fetching { cursor: None };

        let stop = loop {
            let cursor = match walk {
                Walk::Done(stop) => break stop,
                Walk::Fetching { cursor } => cursor,
            };
            if batches >= self.config.max_batches {
                break FetchStop::LimitHit;
            }

            walk = match source
                .fetch_page(request.channel_id(), cursor.as_deref(), page_size)
                .await
            {
                Ok(page) => {
                    batches += 1;
                    tracing::debug!(batch = batches, size = page.len(), "Fetched page");
                    acc.absorb(page)
                }
                Err(e) if batches == 0 && e.is_unreachable() => {
                    tracing::warn!(error = %e, "Channel unreachable");
                    Walk::Done(FetchStop::Unreachable(e.kind.to_string()))
                }
                Err(e) => {
                    tracing::warn!(batch = batches + 1, error = %e, "Page request failed, keeping partial history");
                    Walk::Done(FetchStop::Interrupted(e.kind.to_string()))
                }
            };
        };

        tracing::info!(
            batches,
            kept = acc.kept.len(),
            stop = stop.as_ref(),
            "Fetch finished"
        );
        FetchOutcome {
            messages: acc.kept,
            stop,
            batches,
        }
    }
}
