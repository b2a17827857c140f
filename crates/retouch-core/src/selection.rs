//! The single active selection and its change notifications.

use crate::outline::{Outline, SelectionOutline};

/// What happened to the active selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Created,
    Replaced,
    Cleared,
}

/// Notification emitted whenever the active outline changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEvent {
    pub kind: SelectionChange,
    pub has_selection: bool,
}

/// Holds at most one committed selection outline.
///
/// Events are queued and must be drained with [`SelectionStore::poll_events`].
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    active: Option<SelectionOutline>,
    events: Vec<SelectionEvent>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the active outline.
    pub fn set(&mut self, outline: SelectionOutline) {
        let kind = if self.active.is_some() {
            SelectionChange::Replaced
        } else {
            SelectionChange::Created
        };
        log::info!("Selection {:?}: {:?}", kind, outline.shape.scene_bounds());
        self.active = Some(outline);
        self.events.push(SelectionEvent {
            kind,
            has_selection: true,
        });
    }

    /// Set a bare outline with the committed overlay style.
    pub fn set_shape(&mut self, shape: Outline) {
        self.set(SelectionOutline::new(shape));
    }

    pub fn outline(&self) -> Option<&SelectionOutline> {
        self.active.as_ref()
    }

    pub fn shape(&self) -> Option<&Outline> {
        self.active.as_ref().map(|s| &s.shape)
    }

    pub fn has_selection(&self) -> bool {
        self.active.is_some()
    }

    /// Remove the active outline. Returns whether there was one; only then is
    /// a `Cleared` event emitted.
    pub fn clear(&mut self) -> bool {
        if self.active.take().is_none() {
            return false;
        }
        log::info!("Selection cleared");
        self.events.push(SelectionEvent {
            kind: SelectionChange::Cleared,
            has_selection: false,
        });
        true
    }

    /// Drain queued events.
    pub fn poll_events(&mut self) -> Vec<SelectionEvent> {
        std::mem::take(&mut self.events)
    }
}
