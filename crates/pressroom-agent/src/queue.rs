// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Circular view over the publications awaiting approval.
//!
//! The item list is always recomputed from storage; only the pointer lives
//! here. After a resync the pointer stays on the same publication if it is
//! still queued, otherwise it is clamped to the wraparound position of its old
//! index.

use pressroom_core::{PressroomError, PublicationId};

#[derive(Debug, Default, Clone)]
pub struct ApprovalQueue {
    items: Vec<PublicationId>,
    current: usize,
}

impl ApprovalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the item list with a fresh read from storage.
    pub fn resync(&mut self, items: Vec<PublicationId>) {
        let previous = self.current_id().cloned();
        self.items = items;
        self.current = match previous.and_then(|id| self.position(&id)) {
            Some(i) => i,
            None if self.items.is_empty() => 0,
            None => self.current % self.items.len(),
        };
    }

    /// Point at `id` if it is queued. Returns whether it was found.
    pub fn focus(&mut self, id: &PublicationId) -> bool {
        match self.position(id) {
            Some(i) => {
                self.current = i;
                true
            }
            None => false,
        }
    }

    fn position(&self, id: &PublicationId) -> Option<usize> {
        self.items.iter().position(|item| item == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[PublicationId] {
        &self.items
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_id(&self) -> Option<&PublicationId> {
        self.items.get(self.current)
    }

    pub fn next(&mut self) -> Option<&PublicationId> {
        if !self.items.is_empty() {
            self.current = (self.current + 1) % self.items.len();
        }
        self.current_id()
    }

    pub fn previous(&mut self) -> Option<&PublicationId> {
        if !self.items.is_empty() {
            self.current = (self.current + self.items.len() - 1) % self.items.len();
        }
        self.current_id()
    }

    pub fn select(&mut self, index: usize) -> Result<&PublicationId, PressroomError> {
        if index >= self.items.len() {
            return Err(PressroomError::InvalidCommand(format!(
                "no publication at index {index}, queue holds {}",
                self.items.len()
            )));
        }
        self.current = index;
        Ok(&self.items[index])
    }
}
