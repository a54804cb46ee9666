//! Shared message primitives for CLI and future UIs.
//!
//! [`MessageLog`] is the persistent combat log. [`Notifications`] holds
//! transient toasts that dismiss themselves after a fixed lifetime.
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Severity level for UI messages produced from client events.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Snapshot of a single message entry.
#[derive(Clone, Debug)]
pub struct MessageEntry {
    pub text: String,
    pub level: MessageLevel,
    pub created_at: Instant,
}

impl MessageEntry {
    pub fn new(text: impl Into<String>, level: MessageLevel, created_at: Instant) -> Self {
        Self {
            text: text.into(),
            level,
            created_at,
        }
    }
}

/// Circular buffer of messages displayed to the player.
#[derive(Clone, Debug)]
pub struct MessageLog {
    entries: VecDeque<MessageEntry>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        let bounded_capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(bounded_capacity),
            capacity: bounded_capacity,
        }
    }

    pub fn push(&mut self, entry: MessageEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn push_text(&mut self, message: impl Into<String>) {
        self.push(MessageEntry::new(message, MessageLevel::Info, Instant::now()));
    }

    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &MessageEntry> {
        self.entries.iter().rev().take(limit)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Auto-dismissing notifications.
#[derive(Clone, Debug)]
pub struct Notifications {
    log: MessageLog,
    ttl: Duration,
    /// Total pushed since creation.
    issued: u64,
}

impl Notifications {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            log: MessageLog::new(capacity),
            ttl,
            issued: 0,
        }
    }

    pub fn push(&mut self, text: impl Into<String>, level: MessageLevel, now: Instant) {
        self.log.push(MessageEntry::new(text, level, now));
        self.issued += 1;
    }

    /// Cursor for [`Notifications::unseen`].
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Retained notifications pushed after the `seen` cursor, oldest first.
    pub fn unseen(&self, seen: u64) -> impl Iterator<Item = &MessageEntry> {
        let first_retained = self.issued - self.log.len() as u64;
        let skip = seen.saturating_sub(first_retained) as usize;
        self.log.iter().skip(skip)
    }

    fn is_live(&self, entry: &MessageEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.created_at) < self.ttl
    }

    /// Notifications still visible at `now`, oldest first.
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &MessageEntry> {
        self.log.iter().filter(move |entry| self.is_live(entry, now))
    }

    /// Drop expired notifications; returns how many were dismissed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.log.entries.len();
        let ttl = self.ttl;
        self.log
            .entries
            .retain(|entry| now.saturating_duration_since(entry.created_at) < ttl);
        before - self.log.entries.len()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_drops_oldest_past_capacity() {
        let mut log = MessageLog::new(2);
        log.push_text("one");
        log.push_text("two");
        log.push_text("three");

        let texts: Vec<_> = log.iter().map(|entry| entry.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(log.recent(1).next().unwrap().text, "three");
    }

    #[test]
    fn notifications_expire_after_ttl() {
        let start = Instant::now();
        let mut notifications = Notifications::new(8, Duration::from_millis(5000));
        notifications.push("Game created", MessageLevel::Success, start);
        notifications.push(
            "Transaction confirmed",
            MessageLevel::Success,
            start + Duration::from_millis(3000),
        );

        assert_eq!(notifications.active(start + Duration::from_millis(4999)).count(), 2);
        assert_eq!(notifications.active(start + Duration::from_millis(5000)).count(), 1);

        assert_eq!(notifications.prune(start + Duration::from_millis(9000)), 2);
        assert_eq!(notifications.active(start).count(), 0);
    }

    #[test]
    fn unseen_follows_cursor_across_pruning() {
        let start = Instant::now();
        let mut notifications = Notifications::new(8, Duration::from_millis(100));
        notifications.push("first", MessageLevel::Info, start);
        let seen = notifications.issued();

        notifications.prune(start + Duration::from_millis(200));
        notifications.push("second", MessageLevel::Info, start + Duration::from_millis(200));
        notifications.push("third", MessageLevel::Info, start + Duration::from_millis(200));

        let unseen: Vec<_> = notifications.unseen(seen).map(|e| e.text.as_str()).collect();
        assert_eq!(unseen, vec!["second", "third"]);
        assert_eq!(notifications.unseen(notifications.issued()).count(), 0);
    }
}
