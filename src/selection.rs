// SPDX-License-Identifier: GPL-3.0-only

//! Photo selection
//!
//! The user picks exactly `count` of the captured photos. Picks are kept in
//! the order they were made; that order becomes the slot order in the strip.

use crate::errors::SelectionError;
use tracing::debug;

/// Outcome of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Selection is already full; nothing changed
    Rejected,
}

/// Ordered subset of captured photo indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSelection {
    required: usize,
    available: usize,
    selected: Vec<usize>,
}

impl PhotoSelection {
    /// Empty selection of `required` photos out of `available`
    pub fn new(required: usize, available: usize) -> Self {
        Self {
            required,
            available,
            selected: Vec::with_capacity(required),
        }
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn available(&self) -> usize {
        self.available
    }

    /// Selected indices in pick order
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= self.required
    }

    pub fn contains(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// 1-based pick number shown on a selected thumbnail
    pub fn position(&self, index: usize) -> Option<usize> {
        self.selected.iter().position(|&i| i == index).map(|p| p + 1)
    }

    /// Unselected photos are dimmed once the selection is full
    pub fn is_dimmed(&self, index: usize) -> bool {
        self.is_full() && !self.contains(index)
    }

    /// Select or deselect a photo.
    ///
    /// Deselecting always succeeds. Selecting a new photo is rejected while the
    /// selection is full.
    pub fn toggle(&mut self, index: usize) -> Result<ToggleOutcome, SelectionError> {
        if index >= self.available {
            return Err(SelectionError::OutOfRange {
                index,
                available: self.available,
            });
        }

        if let Some(position) = self.selected.iter().position(|&i| i == index) {
            self.selected.remove(position);
            debug!(index, selected = self.selected.len(), "Photo deselected");
            return Ok(ToggleOutcome::Removed);
        }

        if self.is_full() {
            debug!(index, "Selection full, pick ignored");
            return Ok(ToggleOutcome::Rejected);
        }

        self.selected.push(index);
        debug!(index, selected = self.selected.len(), "Photo selected");
        Ok(ToggleOutcome::Added)
    }

    /// The "next" button: the ordered picks once exactly `required` are chosen
    pub fn confirm(&self) -> Result<&[usize], SelectionError> {
        if self.selected.len() < self.required {
            return Err(SelectionError::Incomplete {
                required: self.required,
                selected: self.selected.len(),
            });
        }
        Ok(&self.selected)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
