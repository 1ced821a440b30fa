//! Order feed parsing.
//!
//! A feed is plain text, one order per line:
//!
//! ```text
//! 0 espresso,latte
//! 2 cappuccino
//! 5 tea,tea,croissant
//! ```
//!
//! The number is the release offset in seconds from the start of service, the
//! rest is a comma-separated item list. The first `<digits><whitespace><rest>`
//! match anywhere on a line is used. Lines without a match, without any
//! non-blank item, or with an offset that does not fit in a `u64` are skipped.
//! Offsets too far out to be anchored to the clock are dropped by [`anchor`].

use crate::error::ServiceError;
use crate::model::{Order, OrderId, ScheduledOrder};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

static LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+(.*)").expect("feed line pattern is valid"));

/// One parsed feed line, not yet anchored to a clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub offset_secs: u64,
    pub items: Vec<String>,
}

/// Parses a single line, or `None` if it is malformed.
pub fn parse_line(line: &str) -> Option<FeedEntry> {
    let captures = LINE.captures(line)?;
    let offset_secs = captures[1].parse().ok()?;
    let items: Vec<String> = captures[2]
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        return None;
    }
    Some(FeedEntry { offset_secs, items })
}

/// Parses a whole feed, skipping malformed lines.
pub fn parse_feed(text: &str) -> Vec<FeedEntry> {
    let mut skipped = 0usize;
    let entries: Vec<FeedEntry> = text
        .lines()
        .filter_map(|line| {
            let entry = parse_line(line);
            if entry.is_none() && !line.trim().is_empty() {
                skipped += 1;
                debug!(line, "Skipping malformed feed line");
            }
            entry
        })
        .collect();
    info!(orders = entries.len(), skipped, "Feed parsed");
    entries
}

/// Reads and parses the feed at `path`.
pub fn read_feed(path: &Path) -> Result<Vec<FeedEntry>, ServiceError> {
    let text = std::fs::read_to_string(path).map_err(|source| ServiceError::Feed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_feed(&text))
}

/// Turns offsets into absolute release instants measured from `start` and
/// numbers the orders in feed order. Entries whose release instant overflows
/// the clock are skipped and take no id.
pub fn anchor(entries: Vec<FeedEntry>, start: Instant) -> Vec<ScheduledOrder> {
    entries
        .into_iter()
        .filter_map(
            |entry| match start.checked_add(Duration::from_secs(entry.offset_secs)) {
                Some(release_at) => Some((release_at, entry.items)),
                None => {
                    debug!(
                        offset_secs = entry.offset_secs,
                        "Skipping feed entry past the clock range"
                    );
                    None
                }
            },
        )
        .zip(1u32..)
        .map(|((release_at, items), id)| {
            ScheduledOrder::new(release_at, Order::new(OrderId(id), items))
        })
        .collect()
}
