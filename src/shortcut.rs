//! Shortcuts: the structural keys events are bound by.
//!
//! A shortcut is derived from an event (see [`Gesture::shortcut`](crate::Gesture::shortcut))
//! and compared against the shortcuts an application binds behavior to. Matching
//! is plain structural equality: same specialization, every field equal. There
//! are no wildcards and no partial matches.
//!
//! ```
//! use bias::{Modifiers, Shortcut};
//!
//! let drag = Shortcut::new(Modifiers::empty(), 1);
//! assert!(drag.matches(&Shortcut::new(Modifiers::empty(), 1)));
//! assert!(!drag.matches(&Shortcut::new(Modifiers::SHIFT, 1)));
//! assert!(!drag.matches(&Shortcut::tap(Modifiers::empty(), 1, 1)));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::{EventId, Modifiers, NO_ID};

/// Structural key `(id, modifiers[, extra])` derived from an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shortcut {
    /// Motion and other plain events.
    Basic {
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        id: EventId,
    },
    /// Key events; `key` is set for character keys, `virtual_key` for key codes.
    Key {
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        virtual_key: EventId,
        #[serde(default)]
        key: Option<char>,
    },
    /// Tap events; `count` is the number of consecutive taps (at least 1).
    Tap {
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        id: EventId,
        #[serde(default = "one")]
        count: u32,
    },
}

fn one() -> u32 {
    1
}

impl Shortcut {
    pub fn new(modifiers: Modifiers, id: EventId) -> Self {
        Shortcut::Basic { modifiers, id }
    }

    /// Character key shortcut.
    pub fn key(key: char) -> Self {
        Shortcut::Key {
            modifiers: Modifiers::empty(),
            virtual_key: NO_ID,
            key: Some(key),
        }
    }

    /// Virtual key shortcut.
    pub fn virtual_key(modifiers: Modifiers, virtual_key: EventId) -> Self {
        Shortcut::Key {
            modifiers,
            virtual_key,
            key: None,
        }
    }

    /// Tap shortcut. A `count` of zero is treated as a single tap.
    pub fn tap(modifiers: Modifiers, id: EventId, count: u32) -> Self {
        Shortcut::Tap {
            modifiers,
            id,
            count: count.max(1),
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match *self {
            Shortcut::Basic { modifiers, .. }
            | Shortcut::Key { modifiers, .. }
            | Shortcut::Tap { modifiers, .. } => modifiers,
        }
    }

    pub fn id(&self) -> EventId {
        match *self {
            Shortcut::Basic { id, .. } | Shortcut::Tap { id, .. } => id,
            Shortcut::Key { virtual_key, .. } => virtual_key,
        }
    }

    /// `true` iff both shortcuts are the same kind and all fields are equal.
    #[inline]
    pub fn matches(&self, other: &Shortcut) -> bool {
        self == other
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = self.modifiers();
        if !modifiers.is_empty() {
            write!(f, "{modifiers}+")?;
        }
        match *self {
            Shortcut::Basic { id, .. } => write!(f, "#{id}"),
            Shortcut::Key { key: Some(key), .. } => write!(f, "'{key}'"),
            Shortcut::Key { virtual_key, .. } => write!(f, "vk{virtual_key}"),
            Shortcut::Tap { id, count, .. } => write!(f, "#{id}x{count}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_requires_same_kind_and_fields() {
        let basic = Shortcut::new(Modifiers::CTRL, 4);
        assert!(basic.matches(&Shortcut::new(Modifiers::CTRL, 4)));
        assert!(!basic.matches(&Shortcut::new(Modifiers::CTRL, 2)));
        assert!(!basic.matches(&Shortcut::new(Modifiers::CTRL | Modifiers::SHIFT, 4)));
        assert!(!basic.matches(&Shortcut::virtual_key(Modifiers::CTRL, 4)));
        assert!(!basic.matches(&Shortcut::tap(Modifiers::CTRL, 4, 1)));
    }

    #[test]
    fn tap_count_is_at_least_one() {
        assert_eq!(Shortcut::tap(Modifiers::empty(), 1, 0), Shortcut::tap(Modifiers::empty(), 1, 1));
        assert!(!Shortcut::tap(Modifiers::empty(), 1, 2).matches(&Shortcut::tap(Modifiers::empty(), 1, 1)));
    }

    #[test]
    fn character_and_virtual_keys_differ() {
        assert!(Shortcut::key('a').matches(&Shortcut::key('a')));
        assert!(!Shortcut::key('a').matches(&Shortcut::key('b')));
        assert!(!Shortcut::key('a').matches(&Shortcut::virtual_key(Modifiers::empty(), NO_ID)));
    }

    #[test]
    fn display() {
        assert_eq!(Shortcut::new(Modifiers::CTRL, 4).to_string(), "CTRL+#4");
        assert_eq!(Shortcut::key('z').to_string(), "'z'");
        assert_eq!(Shortcut::tap(Modifiers::empty(), 1, 2).to_string(), "#1x2");
    }

    #[test]
    fn deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            shortcut: Shortcut,
        }
        let parsed: Wrapper = toml::from_str(
            r#"
            [shortcut]
            kind = "tap"
            modifiers = "SHIFT"
            id = 1
            count = 2
            "#,
        )
        .unwrap();
        assert_eq!(parsed.shortcut, Shortcut::tap(Modifiers::SHIFT, 1, 2));
    }
}
