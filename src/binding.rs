//! Shortcut bindings: named actions keyed by [`Shortcut`].
//!
//! A [`BindingProfile`] lets grabbers decide what an event means without
//! hard-coding shortcut comparisons, and lets the mapping come from config.
use serde::{Deserialize, Serialize};

use crate::event::{Event, Gesture};
use crate::shortcut::Shortcut;

/// Maps one shortcut to a named action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub shortcut: Shortcut,
    pub action: String,
}

impl Binding {
    pub fn new(shortcut: Shortcut, action: impl Into<String>) -> Self {
        Self {
            shortcut,
            action: action.into(),
        }
    }
}

/// Serializable, ordered set of bindings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingProfile {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

impl BindingProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn bind(mut self, shortcut: Shortcut, action: impl Into<String>) -> Self {
        self.bindings.push(Binding::new(shortcut, action));
        self
    }

    /// Action of the first binding matching `shortcut`.
    pub fn action_for(&self, shortcut: &Shortcut) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.shortcut.matches(shortcut))
            .map(|b| b.action.as_str())
    }

    /// Action bound to the event's shortcut.
    pub fn resolve(&self, event: &Event) -> Option<&str> {
        self.action_for(&event.shortcut())
    }
}
