// src/ingest/dedup.rs
use std::collections::{HashSet, VecDeque};

use crate::ingest::types::Action;

pub const PROCESSED_MAX: usize = 1000;
pub const PROCESSED_KEEP: usize = 500;

/// Transaction ids already delivered, bounded in memory.
///
/// Once more than `max` ids are held, the oldest insertions are dropped until
/// `keep` remain. Insertion order is tracked by the queue; the set answers lookups.
#[derive(Debug, Clone)]
pub struct ProcessedSet {
    ids: HashSet<String>,
    order: VecDeque<String>,
    max: usize,
    keep: usize,
}

impl Default for ProcessedSet {
    fn default() -> Self {
        Self::with_limits(PROCESSED_MAX, PROCESSED_KEEP)
    }
}

impl ProcessedSet {
    pub fn with_limits(max: usize, keep: usize) -> Self {
        let keep = keep.min(max);
        Self {
            ids: HashSet::with_capacity(max + 1),
            order: VecDeque::with_capacity(max + 1),
            max,
            keep,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns false if the id was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if !self.ids.insert(id.to_string()) {
            return false;
        }
        self.order.push_back(id.to_string());
        if self.order.len() > self.max {
            self.prune();
        }
        true
    }

    fn prune(&mut self) {
        let excess = self.order.len().saturating_sub(self.keep);
        for old in self.order.drain(..excess) {
            self.ids.remove(&old);
        }
        tracing::debug!(target: "ingest", dropped = excess, kept = self.order.len(), "pruned processed set");
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Processed ids, the query cursor and the startup guard.
#[derive(Debug, Clone)]
pub struct DedupCursor {
    processed: ProcessedSet,
    cursor: Option<String>,
    startup_guard: String,
}

impl DedupCursor {
    /// `startup_guard` must use the zero-padded ISO-8601 layout of provider
    /// timestamps; admission compares the strings lexicographically.
    pub fn new(startup_guard: String) -> Self {
        Self {
            processed: ProcessedSet::default(),
            cursor: None,
            startup_guard,
        }
    }

    /// True when the action is new and should be classified. Records it as processed.
    pub fn admit(&mut self, action: &Action) -> bool {
        if self.processed.contains(&action.transaction_id) {
            return false;
        }
        if !is_sortable_timestamp(&action.timestamp)
            || action.timestamp.as_str() < self.startup_guard.as_str()
        {
            return false;
        }
        self.processed.insert(&action.transaction_id)
    }

    /// Move the cursor forward to `newest_seen`. Never moves it back, and
    /// ignores anything that is not a zero-padded ISO-8601 timestamp.
    pub fn advance(&mut self, newest_seen: &str) {
        if !is_sortable_timestamp(newest_seen) {
            return;
        }
        match &self.cursor {
            Some(cur) if cur.as_str() >= newest_seen => {}
            _ => self.cursor = Some(newest_seen.to_string()),
        }
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn startup_guard(&self) -> &str {
        &self.startup_guard
    }

    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }
}

/// `YYYY-MM-DDTHH:MM:SS` prefix, all digits zero-padded. Only these compare
/// correctly as plain strings.
pub fn is_sortable_timestamp(ts: &str) -> bool {
    const SHAPE: &[u8; 19] = b"dddd-dd-ddTdd:dd:dd";
    let b = ts.as_bytes();
    b.len() >= SHAPE.len()
        && SHAPE.iter().zip(b).all(|(&want, &got)| match want {
            b'd' => got.is_ascii_digit(),
            sep => got == sep,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn action(id: &str, ts: &str) -> Action {
        Action {
            transaction_id: id.into(),
            timestamp: ts.into(),
            contract_actor: "farmforhoney".into(),
            action_name: "claim".into(),
            payload: Map::new(),
        }
    }

    const GUARD: &str = "2025-06-01T12:00:00.000000Z";

    #[test]
    fn same_id_admitted_once() {
        let mut d = DedupCursor::new(GUARD.into());
        let a = action("t1", "2025-06-01T12:00:05.000");
        assert!(d.admit(&a));
        assert!(!d.admit(&a));
        assert_eq!(d.processed().len(), 1);
    }

    #[test]
    fn actions_before_guard_are_dropped_and_not_recorded() {
        let mut d = DedupCursor::new(GUARD.into());
        assert!(!d.admit(&action("old", "2025-06-01T11:59:59.500")));
        assert!(!d.admit(&action("blank", "")));
        assert!(d.processed().is_empty());
    }

    #[test]
    fn malformed_timestamps_neither_admit_nor_move_cursor() {
        let mut d = DedupCursor::new(GUARD.into());
        assert!(!d.admit(&action("bad", "unknown")));
        assert!(!d.admit(&action("bad2", "2025-6-1T12:00:05")));
        assert!(d.processed().is_empty());

        d.advance("unknown");
        assert_eq!(d.cursor(), None);
        d.advance("2025-06-01T12:00:05.000");
        d.advance("zzzz");
        assert_eq!(d.cursor(), Some("2025-06-01T12:00:05.000"));
    }

    #[test]
    fn timestamp_shape() {
        assert!(is_sortable_timestamp("2025-06-01T12:00:05"));
        assert!(is_sortable_timestamp("2025-06-01T12:00:05.000"));
        assert!(is_sortable_timestamp(GUARD));
        assert!(!is_sortable_timestamp(""));
        assert!(!is_sortable_timestamp("2025-06-01 12:00:05"));
        assert!(!is_sortable_timestamp("2025-06-01T12:00"));
    }

    #[test]
    fn cursor_never_regresses() {
        let mut d = DedupCursor::new(GUARD.into());
        assert_eq!(d.cursor(), None);
        d.advance("2025-06-01T12:00:10.000");
        d.advance("2025-06-01T12:00:05.000");
        d.advance("");
        assert_eq!(d.cursor(), Some("2025-06-01T12:00:10.000"));
        d.advance("2025-06-01T12:00:11.000");
        assert_eq!(d.cursor(), Some("2025-06-01T12:00:11.000"));
    }

    #[test]
    fn prunes_to_most_recent_after_overflow() {
        let mut s = ProcessedSet::default();
        for i in 0..1000 {
            s.insert(&format!("id{i}"));
        }
        assert_eq!(s.len(), 1000);
        s.insert("id1000");
        assert!(s.len() <= 500);
        assert_eq!(s.len(), 500);
        // Oldest gone, newest kept.
        assert!(!s.contains("id0"));
        assert!(!s.contains("id500"));
        assert!(s.contains("id501"));
        assert!(s.contains("id1000"));
    }

    #[test]
    fn reinsert_is_rejected() {
        let mut s = ProcessedSet::with_limits(4, 2);
        assert!(s.insert("a"));
        assert!(!s.insert("a"));
        assert_eq!(s.len(), 1);
    }
}
