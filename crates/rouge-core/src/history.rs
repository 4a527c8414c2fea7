//! Bounded linear undo/redo history of [`StyleState`] snapshots.

use serde::{Deserialize, Serialize};

use crate::style::StyleState;

/// A stored snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub style: StyleState,
    /// Unix time in milliseconds when the snapshot was taken.
    pub timestamp_ms: u64,
}

impl HistoryEntry {
    fn now(style: StyleState) -> Self {
        Self {
            style,
            timestamp_ms: unix_millis(),
        }
    }
}

/// Borrowed view of one entry for listing.
#[derive(Debug, Clone, Copy)]
pub struct EntryView<'a> {
    pub index: usize,
    pub entry: &'a HistoryEntry,
    pub is_current: bool,
}

/// Result of [`History::undo`] / [`History::redo`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistoryStep<'a> {
    /// The cursor moved; this is the state to restore.
    Moved(&'a StyleState),
    /// Already at the oldest (undo) or newest (redo) entry.
    AtBoundary,
}

impl<'a> HistoryStep<'a> {
    #[must_use]
    pub const fn state(self) -> Option<&'a StyleState> {
        match self {
            Self::Moved(s) => Some(s),
            Self::AtBoundary => None,
        }
    }
}

/// Linear history with a cursor.
///
/// `entries[position]` is always the current state. Committing after an
/// undo discards everything past the cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    position: usize,
    max_entries: usize,
}

impl History {
    /// Start a history holding `initial` as its only entry.
    ///
    /// `max_entries` is clamped to at least 1.
    #[must_use]
    pub fn new(initial: StyleState, max_entries: usize) -> Self {
        Self {
            entries: vec![HistoryEntry::now(initial)],
            position: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// Record `style` as the newest entry.
    pub fn commit(&mut self, style: StyleState) {
        self.entries.truncate(self.position + 1);
        self.entries.push(HistoryEntry::now(style));
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
        self.position = self.entries.len() - 1;
        tracing::debug!(position = self.position, len = self.entries.len(), "history commit");
    }

    pub fn undo(&mut self) -> HistoryStep<'_> {
        if self.position == 0 {
            return HistoryStep::AtBoundary;
        }
        self.position -= 1;
        HistoryStep::Moved(&self.entries[self.position].style)
    }

    pub fn redo(&mut self) -> HistoryStep<'_> {
        if self.position + 1 >= self.entries.len() {
            return HistoryStep::AtBoundary;
        }
        self.position += 1;
        HistoryStep::Moved(&self.entries[self.position].style)
    }

    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.position > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.position + 1 < self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: a history holds at least its initial entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// The entry under the cursor.
    #[must_use]
    pub fn current(&self) -> &StyleState {
        &self.entries[self.position].style
    }

    /// Every entry, oldest first, flagged with whether it is current.
    pub fn entries(&self) -> impl Iterator<Item = EntryView<'_>> {
        self.entries.iter().enumerate().map(|(index, entry)| EntryView {
            index,
            entry,
            is_current: index == self.position,
        })
    }

    /// Drop all entries and start over from `current`.
    pub fn clear(&mut self, current: StyleState) {
        self.entries.clear();
        self.entries.push(HistoryEntry::now(current));
        self.position = 0;
    }
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
#[must_use]
pub fn unix_millis() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
