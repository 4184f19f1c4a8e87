/// Bounded chat transcript
use std::collections::VecDeque;

use crate::domain::message::TranscriptEntry;

/// Smallest accepted transcript capacity
pub const MIN_TRANSCRIPT_CAPACITY: usize = 5;
/// Largest accepted transcript capacity
pub const MAX_TRANSCRIPT_CAPACITY: usize = 15;

/// Ordered chat lines visible in the recording, oldest evicted first.
///
/// Only chat entries are kept; reactions have their own display slot.
#[derive(Debug, Clone)]
pub struct Transcript {
    entries: VecDeque<TranscriptEntry>,
    capacity: usize,
}

impl Transcript {
    /// Capacity is clamped to the supported range
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(MIN_TRANSCRIPT_CAPACITY, MAX_TRANSCRIPT_CAPACITY);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a chat entry, returning the evicted entry if the buffer was full.
    ///
    /// Reaction entries are not kept.
    pub fn push(&mut self, entry: TranscriptEntry) -> Option<TranscriptEntry> {
        if entry.line().is_none() {
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Lines in arrival order
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().filter_map(TranscriptEntry::line).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(MAX_TRANSCRIPT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_clamped() {
        assert_eq!(Transcript::new(0).capacity(), MIN_TRANSCRIPT_CAPACITY);
        assert_eq!(Transcript::new(8).capacity(), 8);
        assert_eq!(Transcript::new(100).capacity(), MAX_TRANSCRIPT_CAPACITY);
    }

    #[test]
    fn test_keeps_last_k_in_order() {
        for n in 0usize..25 {
            let mut transcript = Transcript::new(7);
            for i in 0..n {
                transcript.push(TranscriptEntry::chat("Bob", format!("m{}", i)));
            }

            let expected: Vec<String> = (n.saturating_sub(7)..n)
                .map(|i| format!("Bob: m{}", i))
                .collect();
            assert_eq!(transcript.lines(), expected, "after {} messages", n);
        }
    }

    #[test]
    fn test_push_reports_eviction() {
        let mut transcript = Transcript::new(5);
        for i in 0..5 {
            assert!(transcript.push(TranscriptEntry::chat("A", i.to_string())).is_none());
        }
        let evicted = transcript.push(TranscriptEntry::chat("A", "5")).unwrap();
        assert_eq!(evicted.line().as_deref(), Some("A: 0"));
        assert_eq!(transcript.len(), 5);
    }

    #[test]
    fn test_reactions_not_kept() {
        let mut transcript = Transcript::new(5);
        assert!(transcript.push(TranscriptEntry::reaction("👍")).is_none());
        assert!(transcript.is_empty());
    }
}
