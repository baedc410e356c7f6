//! Events and the state every event shares.
//!
//! An agent normalizes raw samples into one of a small set of gesture events
//! ([`Event`]): key presses, taps, and relative or absolute motion with 1, 2, 3
//! or 6 degrees of freedom (see [`crate::motion`]).
//!
//! ## Gesture boundaries
//! Every event carries two one-shot flags. [`Gesture::fire`] marks the start of a
//! gesture and [`Gesture::flush`] marks its end. They are mutually exclusive and
//! are never set in place: both return a flagged copy, so an event that already
//! sits in the dispatch queue cannot be altered by later processing. Asking an
//! already flagged event for another transition returns it unchanged and logs a
//! warning.
//!
//! ## Shortcuts
//! [`Gesture::shortcut`] derives the structural key `(id, modifiers[, extra])`
//! used to bind an event to application behavior. See [`crate::shortcut`].

use std::fmt;
use std::time::Instant;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::motion::{MotionEvent1, MotionEvent2, MotionEvent3, MotionEvent6};
use crate::shortcut::Shortcut;

/// Gesture identifier (button code, virtual key, agent-defined id).
pub type EventId = i32;

/// The "no gesture id" value, e.g. a pointer moving with no button held.
pub const NO_ID: EventId = 0;

bitflags! {
    /// Modifier key mask carried by every event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Modifiers: u32 {
        const SHIFT = 0b1;
        const CTRL = 0b10;
        const META = 0b100;
        const ALT = 0b1000;
        const ALT_GRAPH = 0b10000;
    }
}

impl fmt::Display for Modifiers {
    /// Renders the mask as `ALT+SHIFT+CTRL+META+ALT_GRAPH` (present keys only).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const ORDER: [(Modifiers, &str); 5] = [
            (Modifiers::ALT, "ALT"),
            (Modifiers::SHIFT, "SHIFT"),
            (Modifiers::CTRL, "CTRL"),
            (Modifiers::META, "META"),
            (Modifiers::ALT_GRAPH, "ALT_GRAPH"),
        ];
        let mut first = true;
        for (flag, name) in ORDER {
            if self.contains(flag) {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// State shared by every event: modifiers, id, capture time and the
/// fired/flushed gesture flags.
#[derive(Clone, Debug, PartialEq)]
pub struct EventCore {
    modifiers: Modifiers,
    id: EventId,
    timestamp: Instant,
    fired: bool,
    flushed: bool,
}

impl EventCore {
    /// Creates a core stamped with the current monotonic time.
    pub fn new(modifiers: Modifiers, id: EventId) -> Self {
        Self {
            modifiers,
            id,
            timestamp: Instant::now(),
            fired: false,
            flushed: false,
        }
    }

    /// Overrides the capture time. Hosts replaying recorded input use this.
    pub fn at(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[inline]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[inline]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    #[inline]
    pub fn fired(&self) -> bool {
        self.fired
    }

    #[inline]
    pub fn flushed(&self) -> bool {
        self.flushed
    }

    pub(crate) fn mark_fired(&mut self) {
        if self.check_unflagged("fire") {
            self.fired = true;
        }
    }

    pub(crate) fn mark_flushed(&mut self) {
        if self.check_unflagged("flush") {
            self.flushed = true;
        }
    }

    fn check_unflagged(&self, transition: &str) -> bool {
        if self.fired || self.flushed {
            let state = if self.fired { "fired" } else { "flushed" };
            warn!(id = self.id, transition, "event already {state}; transition ignored");
            return false;
        }
        true
    }
}

impl Default for EventCore {
    fn default() -> Self {
        Self::new(Modifiers::empty(), NO_ID)
    }
}

/// Behavior shared by all event types, including the [`Event`] variant itself.
pub trait Gesture: Clone {
    /// Shared event state.
    fn core(&self) -> &EventCore;

    #[doc(hidden)]
    fn core_mut(&mut self) -> &mut EventCore;

    /// Structural key used for binding matches.
    fn shortcut(&self) -> Shortcut {
        Shortcut::new(self.modifiers(), self.id())
    }

    /// `true` for motion samples that carry no motion and no gesture boundary.
    fn is_null(&self) -> bool {
        false
    }

    fn modifiers(&self) -> Modifiers {
        self.core().modifiers()
    }

    fn id(&self) -> EventId {
        self.core().id()
    }

    fn timestamp(&self) -> Instant {
        self.core().timestamp()
    }

    fn fired(&self) -> bool {
        self.core().fired()
    }

    fn flushed(&self) -> bool {
        self.core().flushed()
    }

    /// Returns a copy marked as the start of a gesture.
    ///
    /// If the event is already fired or flushed the copy is identical to `self`.
    fn fire(&self) -> Self {
        let mut event = self.clone();
        event.core_mut().mark_fired();
        event
    }

    /// Returns a copy marked as the end of a gesture.
    ///
    /// If the event is already fired or flushed the copy is identical to `self`.
    fn flush(&self) -> Self {
        let mut event = self.clone();
        event.core_mut().mark_flushed();
        event
    }
}

/// Keyboard event: either a printable character or a virtual key code.
///
/// A virtual key is stored as the event id.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyEvent {
    core: EventCore,
    key: Option<char>,
}

impl KeyEvent {
    pub fn new(core: EventCore, key: Option<char>) -> Self {
        Self { core, key }
    }

    /// Character key without modifiers.
    pub fn from_char(key: char) -> Self {
        Self::new(EventCore::default(), Some(key))
    }

    /// Virtual key with modifiers.
    pub fn from_virtual_key(modifiers: Modifiers, virtual_key: EventId) -> Self {
        Self::new(EventCore::new(modifiers, virtual_key), None)
    }

    pub fn key(&self) -> Option<char> {
        self.key
    }

    pub fn virtual_key(&self) -> EventId {
        self.core.id()
    }
}

impl Gesture for KeyEvent {
    fn core(&self) -> &EventCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EventCore {
        &mut self.core
    }

    fn shortcut(&self) -> Shortcut {
        Shortcut::Key {
            modifiers: self.core.modifiers(),
            virtual_key: self.core.id(),
            key: self.key,
        }
    }
}

/// Tap (click) at a position, with the number of consecutive taps.
#[derive(Clone, Debug, PartialEq)]
pub struct TapEvent {
    core: EventCore,
    x: f32,
    y: f32,
    count: u32,
}

impl TapEvent {
    pub fn new(core: EventCore, x: f32, y: f32, count: u32) -> Self {
        Self { core, x, y, count }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Gesture for TapEvent {
    fn core(&self) -> &EventCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EventCore {
        &mut self.core
    }

    fn shortcut(&self) -> Shortcut {
        Shortcut::tap(self.core.modifiers(), self.core.id(), self.count)
    }
}

/// Any event an agent can route.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Key(KeyEvent),
    Tap(TapEvent),
    Motion1(MotionEvent1),
    Motion2(MotionEvent2),
    Motion3(MotionEvent3),
    Motion6(MotionEvent6),
}

macro_rules! each_variant {
    ($event:expr, $inner:ident => $body:expr) => {
        match $event {
            Event::Key($inner) => $body,
            Event::Tap($inner) => $body,
            Event::Motion1($inner) => $body,
            Event::Motion2($inner) => $body,
            Event::Motion3($inner) => $body,
            Event::Motion6($inner) => $body,
        }
    };
}

impl Event {
    /// `true` for the motion variants.
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Event::Motion1(_) | Event::Motion2(_) | Event::Motion3(_) | Event::Motion6(_)
        )
    }
}

impl Gesture for Event {
    fn core(&self) -> &EventCore {
        each_variant!(self, e => e.core())
    }

    fn core_mut(&mut self) -> &mut EventCore {
        each_variant!(self, e => e.core_mut())
    }

    fn shortcut(&self) -> Shortcut {
        each_variant!(self, e => e.shortcut())
    }

    fn is_null(&self) -> bool {
        each_variant!(self, e => e.is_null())
    }
}

impl From<KeyEvent> for Event {
    fn from(event: KeyEvent) -> Self {
        Event::Key(event)
    }
}

impl From<TapEvent> for Event {
    fn from(event: TapEvent) -> Self {
        Event::Tap(event)
    }
}

impl From<MotionEvent1> for Event {
    fn from(event: MotionEvent1) -> Self {
        Event::Motion1(event)
    }
}

impl From<MotionEvent2> for Event {
    fn from(event: MotionEvent2) -> Self {
        Event::Motion2(event)
    }
}

impl From<MotionEvent3> for Event {
    fn from(event: MotionEvent3) -> Self {
        Event::Motion3(event)
    }
}

impl From<MotionEvent6> for Event {
    fn from(event: MotionEvent6) -> Self {
        Event::Motion6(event)
    }
}
