//! Step checklists (handle building, painting).
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecklistError {
    #[error("checklist has no item '{0}'")]
    UnknownItem(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl ChecklistItem {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            done: false,
        }
    }
}

/// Ordered checklist; stored as a bare JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Checklist {
    items: Vec<ChecklistItem>,
}

/// Which of the two workshop checklists an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistKind {
    Handle,
    Color,
}

impl Checklist {
    #[must_use]
    pub const fn new(items: Vec<ChecklistItem>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Complete iff every item is done; an empty checklist is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.items.iter().all(|item| item.done)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.done).count()
    }

    /// Mark one item done or undone.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::UnknownItem` if no item has this id.
    pub fn set_done(&mut self, id: &str, done: bool) -> Result<(), ChecklistError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| ChecklistError::UnknownItem(id.to_string()))?;
        item.done = done;
        Ok(())
    }

    /// Mark every item undone.
    pub fn reset(&mut self) {
        for item in &mut self.items {
            item.done = false;
        }
    }
}
