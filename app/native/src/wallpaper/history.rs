//! Preview history.
//!
//! A bounded list of fetched-but-not-applied photos with browser-style
//! back/forward navigation. Appending after stepping back discards the
//! entries ahead of the cursor, and the oldest entry is evicted once the
//! list is full.

use image::DynamicImage;

use crate::unsplash::Photo;

/// Number of previews kept when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// A candidate wallpaper.
#[derive(Debug, Clone)]
pub struct PreviewEntry {
    pub photo: Photo,
    pub thumbnail: DynamicImage,
}

/// Outcome of [`PreviewHistory::move_forward`].
#[derive(Debug, PartialEq, Eq)]
pub enum Forward<'a, T> {
    /// The cursor advanced onto this entry.
    Entry(&'a T),
    /// The cursor is at the newest entry; a new preview has to be fetched.
    NeedsFetch,
}

/// Bounded linear history with a cursor.
///
/// The cursor always points at a valid index unless the history is empty.
/// Not synchronized; owned by a single control task.
#[derive(Debug, Clone)]
pub struct PreviewHistory<T = PreviewEntry> {
    entries: Vec<T>,
    cursor: Option<usize>,
    capacity: usize,
}

impl<T> Default for PreviewHistory<T> {
    fn default() -> Self { Self::new(DEFAULT_HISTORY_CAPACITY) }
}

impl<T> PreviewHistory<T> {
    /// Creates an empty history that holds at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            cursor: None,
            capacity,
        }
    }

    /// Appends an entry and moves the cursor onto it.
    pub fn append(&mut self, entry: T) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }

        self.entries.push(entry);

        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }

        self.cursor = Some(self.entries.len() - 1);
    }

    /// Steps back one entry. Returns `None` at the oldest entry.
    pub fn move_back(&mut self) -> Option<&T> {
        let cursor = self.cursor?;
        if cursor == 0 {
            return None;
        }
        self.cursor = Some(cursor - 1);
        self.entries.get(cursor - 1)
    }

    /// Steps forward one entry, or reports that the tail has been reached.
    pub fn move_forward(&mut self) -> Forward<'_, T> {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.entries.len() => {
                self.cursor = Some(cursor + 1);
                self.entries.get(cursor + 1).map_or(Forward::NeedsFetch, Forward::Entry)
            }
            _ => Forward::NeedsFetch,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&T> { self.cursor.and_then(|c| self.entries.get(c)) }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    #[must_use]
    pub const fn cursor(&self) -> Option<usize> { self.cursor }

    #[must_use]
    pub const fn capacity(&self) -> usize { self.capacity }

    /// Returns whether the cursor sits on the newest entry.
    #[must_use]
    pub fn at_tail(&self) -> bool { self.cursor.is_none_or(|c| c + 1 == self.entries.len()) }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// Changes the capacity, evicting the oldest entries if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
            self.cursor = self.cursor.map(|c| c.saturating_sub(excess));
        }
    }

    /// Iterates entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> { self.entries.iter() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(values: &[u32]) -> PreviewHistory<u32> {
        let mut history = PreviewHistory::new(DEFAULT_HISTORY_CAPACITY);
        for v in values {
            history.append(*v);
        }
        history
    }

    fn contents(history: &PreviewHistory<u32>) -> Vec<u32> { history.iter().copied().collect() }

    // ========================================================================
    // append tests
    // ========================================================================

    #[test]
    fn test_new_history_is_empty() {
        let history: PreviewHistory<u32> = PreviewHistory::default();
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
        assert_eq!(history.current(), None);
        assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_append_moves_cursor_to_last() {
        let history = filled(&[1, 2, 3]);
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), Some(2));
        assert_eq!(history.current(), Some(&3));
    }

    #[test]
    fn test_append_when_full_drops_oldest() {
        let values: Vec<u32> = (0..10).collect();
        let mut history = filled(&values);
        assert_eq!(history.len(), 10);

        history.append(10);

        assert_eq!(history.len(), 10, "Length is capped at capacity");
        assert_eq!(contents(&history)[0], 1, "Index 0 was evicted");
        assert_eq!(history.cursor(), Some(9));
        assert_eq!(history.current(), Some(&10));
    }

    #[test]
    fn test_append_after_moving_back_discards_forward_entries() {
        let mut history = filled(&[1, 2, 3, 4]);
        history.move_back();
        history.move_back();
        assert_eq!(history.current(), Some(&2));

        history.append(9);

        assert_eq!(contents(&history), vec![1, 2, 9]);
        assert_eq!(history.cursor(), Some(2));
    }

    #[test]
    fn test_zero_capacity_keeps_one_entry() {
        let mut history = PreviewHistory::new(0);
        history.append(1);
        history.append(2);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), Some(&2));
    }

    // ========================================================================
    // Navigation tests
    // ========================================================================

    #[test]
    fn test_move_back_at_start_is_noop() {
        let mut history = filled(&[1]);
        assert_eq!(history.move_back(), None);
        assert_eq!(history.cursor(), Some(0));

        let mut empty: PreviewHistory<u32> = PreviewHistory::default();
        assert_eq!(empty.move_back(), None);
        assert_eq!(empty.cursor(), None);
    }

    #[test]
    fn test_move_back_returns_previous_entry() {
        let mut history = filled(&[1, 2, 3]);
        assert_eq!(history.move_back(), Some(&2));
        assert_eq!(history.move_back(), Some(&1));
        assert_eq!(history.move_back(), None);
    }

    #[test]
    fn test_move_forward_at_tail_needs_fetch() {
        let mut history = filled(&[1, 2]);
        assert_eq!(history.move_forward(), Forward::NeedsFetch);
        assert_eq!(history.cursor(), Some(1), "Cursor never auto-advances past the tail");

        let mut empty: PreviewHistory<u32> = PreviewHistory::default();
        assert_eq!(empty.move_forward(), Forward::NeedsFetch);
    }

    #[test]
    fn test_move_forward_after_back() {
        let mut history = filled(&[1, 2, 3]);
        history.move_back();
        history.move_back();
        assert!(!history.at_tail());

        assert_eq!(history.move_forward(), Forward::Entry(&2));
        assert_eq!(history.move_forward(), Forward::Entry(&3));
        assert!(history.at_tail());
        assert_eq!(history.move_forward(), Forward::NeedsFetch);
    }

    // ========================================================================
    // Maintenance tests
    // ========================================================================

    #[test]
    fn test_clear_resets_cursor() {
        let mut history = filled(&[1, 2]);
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
    }

    #[test]
    fn test_set_capacity_evicts_and_shifts_cursor() {
        let mut history = filled(&[1, 2, 3, 4, 5]);
        history.move_back();
        assert_eq!(history.current(), Some(&4));

        history.set_capacity(3);

        assert_eq!(contents(&history), vec![3, 4, 5]);
        assert_eq!(history.current(), Some(&4));
    }
}
