//! Submission guard for board posts and comments.
//!
//! Every candidate submission passes three checks in a fixed order, and the
//! first failure decides the rejection reason:
//!
//! 1. sliding-window rate limit for the actor and submission kind
//! 2. profanity deny-list
//! 3. spam patterns (character runs, repeated words)
//!
//! Only accepted submissions are recorded in the actor's history.

pub mod content;
pub mod rate_limit;

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

pub use content::{DEFAULT_DENY_LIST, contains_profanity, is_spam_pattern};
pub use rate_limit::{RateLimit, prune_and_check};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionKind {
    Post,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("at most {max_count} submissions per {window_secs}s")]
    RateLimited { window_secs: i64, max_count: usize },
    #[error("contains a denied word")]
    Profanity,
    #[error("repetitive spam pattern")]
    SpamPattern,
}

type HistoryKey = (String, SubmissionKind);

pub struct SubmissionGuard {
    post_limit: RateLimit,
    comment_limit: RateLimit,
    deny_list: Vec<String>,
    /// Accepted-submission timestamps per (actor, kind). Process lifetime only.
    history: Mutex<HashMap<HistoryKey, Vec<DateTime<Utc>>>>,
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new(RateLimit::new(30, 3), RateLimit::new(15, 5))
    }
}

impl SubmissionGuard {
    pub fn new(post_limit: RateLimit, comment_limit: RateLimit) -> Self {
        Self {
            post_limit,
            comment_limit,
            deny_list: Vec::new(),
            history: Mutex::new(HashMap::new()),
        }
        .with_deny_list(DEFAULT_DENY_LIST.iter().copied())
    }

    /// Replaces the deny-list. Entries are stored lowercased.
    pub fn with_deny_list<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.deny_list = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        self
    }

    pub fn limit(&self, kind: SubmissionKind) -> RateLimit {
        match kind {
            SubmissionKind::Post => self.post_limit,
            SubmissionKind::Comment => self.comment_limit,
        }
    }

    /// Runs all checks for one submission made of one or more text fields
    /// (e.g. title and body), each checked on its own. On success `now` is
    /// appended to the actor's history. The whole check runs under one lock,
    /// so concurrent submissions by the same actor cannot overrun the limit.
    pub fn check(
        &self,
        actor: &str,
        kind: SubmissionKind,
        texts: &[&str],
        now: DateTime<Utc>,
    ) -> Result<(), Rejection> {
        let limit = self.limit(kind);
        let key = (actor.to_string(), kind);
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        let entries = history.entry(key.clone()).or_default();

        let verdict = if prune_and_check(entries, &limit, now) {
            debug!(actor, ?kind, recent = entries.len(), "submission rate limited");
            Err(Rejection::RateLimited {
                window_secs: limit.window_secs(),
                max_count: limit.max_count,
            })
        } else if texts.iter().any(|t| contains_profanity(t, self.deny_list.as_slice())) {
            Err(Rejection::Profanity)
        } else if texts.iter().any(|t| is_spam_pattern(t)) {
            Err(Rejection::SpamPattern)
        } else {
            entries.push(now);
            Ok(())
        };

        // Actors with nothing left in their window are not kept around
        let emptied = entries.is_empty();
        if emptied {
            history.remove(&key);
        }
        verdict
    }

    /// Gives back the slot taken by an accepted submission at `at` that was
    /// never stored (e.g. its post vanished or the write failed).
    pub fn release(&self, actor: &str, kind: SubmissionKind, at: DateTime<Utc>) {
        let key = (actor.to_string(), kind);
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        let Some(entries) = history.get_mut(&key) else {
            return;
        };
        if let Some(pos) = entries.iter().rposition(|t| *t == at) {
            entries.remove(pos);
        }
        let emptied = entries.is_empty();
        if emptied {
            history.remove(&key);
        }
    }

    /// Number of accepted submissions currently inside the actor's window,
    /// as of the last check.
    pub fn recent_count(&self, actor: &str, kind: SubmissionKind) -> usize {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history
            .get(&(actor.to_string(), kind))
            .map_or(0, Vec::len)
    }
}
