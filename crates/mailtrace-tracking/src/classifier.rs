// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Open classification: genuine human read vs automated pixel fetch.
//!
//! Mail clients, image proxies, and security scanners all fetch tracking
//! pixels without a human ever opening the message. The classifier weighs
//! three signals -- elapsed time since send, the requesting agent string,
//! and the burst shape of recent fetches -- and vetoes anything that looks
//! automated. It is a pure function over its inputs: the receipt history is
//! passed in as a lookup *result* so the decision logic stays independently
//! testable without a live store.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use mailtrace_core::{Email, MailtraceError, ReadReceipt};

/// Fetches earlier than this after send are treated as client prefetching.
const MIN_HUMAN_DELAY_SECS: i64 = 15;

/// Window over which burst detection considers prior fetches.
const BURST_WINDOW_SECS: i64 = 5 * 60;

/// More fetches than this inside the window reads as a prefetch storm.
const MAX_RECENT_FETCHES: usize = 2;

/// Two fetches closer together than this read as automated re-fetching.
const RAPID_REPEAT_GAP_MS: i64 = 10_000;

/// Substrings (lowercase) identifying automated fetchers: image proxies,
/// link unfurlers, messaging bots, and generic scanner signatures.
const AGENT_DENYLIST: &[&str] = &[
    "googleimageproxy",
    "facebookexternalhit",
    "twitterbot",
    "linkedinbot",
    "slackbot",
    "emailtracker",
    "bot",
    "crawler",
    "spider",
    "prefetch",
    "scanner",
    "security",
];

/// Decide whether a pixel fetch counts as a genuine human open.
///
/// Rules are evaluated in order and the first veto wins:
///
/// 1. no usable `sent_at` -> not an open (no elapsed-time evidence);
/// 2. fetched under 15s after send -> prefetch;
/// 3. denylisted agent substring (case-insensitive) -> automated;
/// 4. burst analysis over the trailing 5-minute window: more than 2 recent
///    fetches, or the two earliest under 10s apart -> automated.
///
/// A failed history lookup allows the open: a broken safety check must not
/// penalize legitimate readers. Note the asymmetry with rule 1, which fails
/// toward "not an open".
pub fn is_genuine_open(
    email: &Email,
    user_agent: &str,
    now: DateTime<Utc>,
    history: Result<Vec<ReadReceipt>, MailtraceError>,
) -> bool {
    let Some(sent_at) = email.sent_at.as_deref().and_then(parse_timestamp) else {
        return false;
    };

    if (now - sent_at).num_seconds() < MIN_HUMAN_DELAY_SECS {
        return false;
    }

    let agent = user_agent.to_lowercase();
    if AGENT_DENYLIST.iter().any(|sig| agent.contains(sig)) {
        return false;
    }

    let receipts = match history {
        Ok(receipts) => receipts,
        Err(e) => {
            warn!(error = %e, email_id = %email.id, "receipt history unavailable, allowing open");
            return true;
        }
    };

    let window_start = now - Duration::seconds(BURST_WINDOW_SECS);
    let mut recent: Vec<DateTime<Utc>> = receipts
        .iter()
        .filter_map(|r| parse_timestamp(&r.fetched_at))
        .filter(|t| *t > window_start)
        .collect();

    if recent.len() > MAX_RECENT_FETCHES {
        return false;
    }

    if recent.len() >= 2 {
        recent.sort();
        let gap = (recent[1] - recent[0]).num_milliseconds();
        if gap < RAPID_REPEAT_GAP_MS {
            return false;
        }
    }

    true
}

/// Parse an ISO 8601 timestamp; unparseable values yield `None` and are
/// treated as outside every window.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
