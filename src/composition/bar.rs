// Copyright (c) 2024 Mike Tsao

use super::NoteGroup;
use crate::error::SequencerError;
use serde::{Deserialize, Serialize};

/// One timed [NoteGroup] within a [Bar].
///
/// Positions and lengths are fractions of a whole bar. A `denominator` of 4
/// means the group lasts a quarter of a bar, 8 an eighth, and so on.
/// Denominators don't need to be whole numbers; 8/3 is a dotted quarter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BarEntry {
    /// Where the group starts.
    pub onset: f64,
    /// The reciprocal of the group's length.
    pub denominator: f64,
    /// What plays.
    pub notes: NoteGroup,
}
impl BarEntry {
    /// Creates a [BarEntry].
    pub fn new(onset: f64, denominator: f64, notes: impl Into<NoteGroup>) -> Self {
        Self {
            onset,
            denominator,
            notes: notes.into(),
        }
    }

    /// The group's length, in bars.
    pub fn duration(&self) -> f64 {
        1.0 / self.denominator
    }

    /// Where the group stops.
    pub fn end(&self) -> f64 {
        self.onset + self.duration()
    }

    /// Whether `tick` falls within the group's window. Both ends count.
    pub fn is_sounding_at(&self, tick: f64) -> bool {
        self.onset <= tick && tick <= self.end()
    }

    /// Whether the group's window has closed by `tick`.
    pub fn has_ended_by(&self, tick: f64) -> bool {
        self.end() <= tick
    }
}

fn is_valid_denominator(denominator: f64) -> bool {
    denominator.is_finite() && denominator > 0.0
}

/// A [Bar] is an ordered list of [BarEntry]s.
///
/// Entries play in the order they were added, not sorted by onset, so add
/// them in onset order. [Bar::place_notes()] does that for you by keeping a
/// running position. [Bar::push_entry()] accepts anything, including entries
/// that overlap or leave gaps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Bar {
    entries: Vec<BarEntry>,
    length: f64,
    current_beat: f64,
}
impl Default for Bar {
    fn default() -> Self {
        Self::new_with_meter(4, 4)
    }
}
impl Bar {
    /// Creates an empty bar whose length matches the given meter: 4/4 is one
    /// whole bar, 3/4 is three quarters of one.
    pub fn new_with_meter(top: usize, bottom: usize) -> Self {
        let length = if bottom == 0 {
            0.0
        } else {
            top as f64 / bottom as f64
        };
        Self::new_with_length(length)
    }

    /// Creates an empty bar with the given length, in whole bars.
    pub fn new_with_length(length: f64) -> Self {
        Self {
            entries: Vec::default(),
            length,
            current_beat: 0.0,
        }
    }

    /// The bar's length, in whole bars.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Where [Bar::place_notes()] will put the next group.
    pub fn current_beat(&self) -> f64 {
        self.current_beat
    }

    /// Appends a group at the current beat and moves the current beat past
    /// it. Returns false, leaving the bar unchanged, if the group doesn't fit
    /// or the denominator isn't a positive number. A bar of length zero
    /// accepts everything.
    pub fn place_notes(&mut self, notes: impl Into<NoteGroup>, denominator: f64) -> bool {
        if !is_valid_denominator(denominator) {
            return false;
        }
        let duration = 1.0 / denominator;
        if self.length != 0.0 && self.current_beat + duration > self.length {
            return false;
        }
        self.entries
            .push(BarEntry::new(self.current_beat, denominator, notes));
        self.current_beat += duration;
        true
    }

    /// Appends a rest at the current beat. See [Bar::place_notes()].
    pub fn place_rest(&mut self, denominator: f64) -> bool {
        self.place_notes(NoteGroup::rest(), denominator)
    }

    /// Appends an entry exactly as given. The current beat doesn't move.
    pub fn push_entry(&mut self, entry: BarEntry) -> Result<(), SequencerError> {
        if !is_valid_denominator(entry.denominator) {
            return Err(SequencerError::InvalidDuration(entry.denominator));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Whether [Bar::place_notes()] has filled the bar.
    pub fn is_full(&self) -> bool {
        self.length != 0.0 && self.current_beat >= self.length
    }

    /// Removes every entry and rewinds the current beat.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_beat = 0.0;
    }

    /// The entry at `index`, in insertion order.
    pub fn get(&self, index: usize) -> Option<&BarEntry> {
        self.entries.get(index)
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bar has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the entries in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, BarEntry> {
        self.entries.iter()
    }

    /// The entries, in insertion order.
    pub fn entries(&self) -> &[BarEntry] {
        &self.entries
    }
}
impl<'a> IntoIterator for &'a Bar {
    type Item = &'a BarEntry;
    type IntoIter = core::slice::Iter<'a, BarEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Note;
    use float_cmp::approx_eq;

    #[test]
    fn bar_defaults_to_common_time() {
        let bar = Bar::default();
        assert!(approx_eq!(f64, bar.length(), 1.0));
        assert!(bar.is_empty());
        assert!(!bar.is_full());

        assert!(approx_eq!(f64, Bar::new_with_meter(3, 4).length(), 0.75));
        assert!(approx_eq!(f64, Bar::new_with_meter(6, 8).length(), 0.75));
    }

    #[test]
    fn placing_notes_advances_the_beat() {
        let mut bar = Bar::default();
        assert!(bar.place_notes(Note::new(48), 4.0));
        assert!(bar.place_notes(Note::new(52), 4.0));
        assert!(bar.place_rest(4.0));
        assert!(bar.place_notes(vec![Note::new(55), Note::new(60)], 8.0));
        assert!(approx_eq!(f64, bar.current_beat(), 0.875));
        assert!(!bar.is_full());

        assert!(
            !bar.place_notes(Note::new(48), 4.0),
            "a quarter note shouldn't fit in the last eighth"
        );
        assert!(bar.place_notes(Note::new(48), 8.0));
        assert!(bar.is_full());

        let onsets: Vec<f64> = bar.iter().map(|e| e.onset).collect();
        assert_eq!(onsets, vec![0.0, 0.25, 0.5, 0.75, 0.875]);
        assert!(bar.get(2).unwrap().notes.is_empty());
    }

    #[test]
    fn zero_length_bar_accepts_everything() {
        let mut bar = Bar::new_with_length(0.0);
        for _ in 0..10 {
            assert!(bar.place_notes(Note::new(48), 1.0));
        }
        assert_eq!(bar.len(), 10);
        assert!(!bar.is_full());
    }

    #[test]
    fn bad_denominators_are_rejected() {
        let mut bar = Bar::default();
        assert!(!bar.place_notes(Note::new(48), 0.0));
        assert!(!bar.place_notes(Note::new(48), -4.0));
        assert!(!bar.place_notes(Note::new(48), f64::NAN));
        assert_eq!(
            bar.push_entry(BarEntry::new(0.0, 0.0, Note::new(48))),
            Err(SequencerError::InvalidDuration(0.0))
        );
        assert!(bar.is_empty());
    }

    #[test]
    fn pushed_entries_may_overlap() {
        let mut bar = Bar::default();
        assert!(bar.push_entry(BarEntry::new(0.0, 1.0, Note::new(36))).is_ok());
        assert!(bar.push_entry(BarEntry::new(0.5, 2.0, Note::new(48))).is_ok());
        assert!(bar.push_entry(BarEntry::new(0.75, 2.0, Note::new(50))).is_ok());
        assert_eq!(bar.len(), 3);
        assert!(approx_eq!(f64, bar.current_beat(), 0.0));
        assert!(approx_eq!(f64, bar.get(2).unwrap().end(), 1.25));
    }

    #[test]
    fn entry_windows_include_both_ends() {
        let e = BarEntry::new(0.25, 4.0, Note::new(48));
        assert!(approx_eq!(f64, e.duration(), 0.25));
        assert!(!e.is_sounding_at(0.2));
        assert!(e.is_sounding_at(0.25));
        assert!(e.is_sounding_at(0.4));
        assert!(e.is_sounding_at(0.5));
        assert!(!e.is_sounding_at(0.51));

        assert!(!e.has_ended_by(0.49));
        assert!(e.has_ended_by(0.5));
    }
}
