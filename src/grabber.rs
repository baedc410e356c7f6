//! Grabbers: application objects that claim input and react to it.
//!
//! A grabber answers two questions:
//! - [`Grabber::track`]: "is this event mine?" Evaluated while an agent polls.
//!   It must be a pure predicate.
//! - [`Grabber::interact`]: the reaction. Never called directly by an agent; it
//!   runs when the input handler drains its queue.
//!
//! Grabbers are shared between the application, the agent pools and queued
//! tuples through [`GrabberHandle`], whose equality is object identity.
//!
//! Implement [`TypedGrabber`] instead of [`Grabber`] to receive each event kind
//! in its own method. For ad-hoc grabbers, [`FnGrabber`] pairs two closures.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::event::{Event, KeyEvent, TapEvent};
use crate::motion::{MotionEvent1, MotionEvent2, MotionEvent3, MotionEvent6};

/// Capability required from every event consumer.
pub trait Grabber {
    /// Claim predicate used during tracking. Must not have side effects.
    fn track(&self, event: &Event) -> bool;

    /// Deferred reaction to an event this grabber received.
    fn interact(&mut self, event: &Event);
}

/// Shared, identity-compared reference to a grabber.
///
/// Keep a typed `Rc<RefCell<G>>` to reach your grabber's own state and convert a
/// clone of it into a handle for the agents:
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use bias::{Event, Grabber, GrabberHandle};
///
/// struct Counter(u32);
/// impl Grabber for Counter {
///     fn track(&self, _: &Event) -> bool { true }
///     fn interact(&mut self, _: &Event) { self.0 += 1; }
/// }
///
/// let counter = Rc::new(RefCell::new(Counter(0)));
/// let handle = GrabberHandle::from(counter.clone());
/// assert_eq!(handle, GrabberHandle::from(counter.clone()));
/// ```
#[derive(Clone)]
pub struct GrabberHandle(Rc<RefCell<dyn Grabber>>);

impl GrabberHandle {
    /// Wraps a grabber that the application does not need to reach again.
    pub fn new<G: Grabber + 'static>(grabber: G) -> Self {
        Self(Rc::new(RefCell::new(grabber)))
    }

    /// Evaluates the claim predicate.
    ///
    /// A grabber that is busy reacting (for example one whose `interact` polls
    /// its own agent) does not claim the event.
    pub fn track(&self, event: &Event) -> bool {
        match self.0.try_borrow() {
            Ok(grabber) => grabber.track(event),
            Err(_) => {
                warn!(grabber = ?self, "grabber busy during tracking; event not claimed");
                false
            }
        }
    }

    /// Runs the reaction.
    ///
    /// A grabber already inside its own reaction skips the nested call.
    pub fn interact(&self, event: &Event) {
        match self.0.try_borrow_mut() {
            Ok(mut grabber) => grabber.interact(event),
            Err(_) => warn!(grabber = ?self, "grabber busy; nested interaction skipped"),
        }
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0).cast::<()>()
    }
}

impl<G: Grabber + 'static> From<Rc<RefCell<G>>> for GrabberHandle {
    fn from(grabber: Rc<RefCell<G>>) -> Self {
        Self(grabber)
    }
}

impl PartialEq for GrabberHandle {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for GrabberHandle {}

impl fmt::Debug for GrabberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GrabberHandle({:p})", self.addr())
    }
}

/// Grabber with one tracking and one interaction hook per event kind.
///
/// Every hook defaults to "not mine" / no-op, so implementors only override the
/// kinds they care about. Motion goes through [`TypedGrabber::motion_tracking`]
/// and [`TypedGrabber::motion_interaction`] first, which route to the per-DOF
/// hooks unless overridden to treat every DOF alike. Any `TypedGrabber` is a
/// [`Grabber`].
pub trait TypedGrabber {
    fn key_tracking(&self, _event: &KeyEvent) -> bool {
        false
    }

    fn tap_tracking(&self, _event: &TapEvent) -> bool {
        false
    }

    /// Tracking for any motion event. Routes to the per-DOF hooks.
    fn motion_tracking(&self, event: &Event) -> bool {
        match event {
            Event::Motion1(e) => self.motion1_tracking(e),
            Event::Motion2(e) => self.motion2_tracking(e),
            Event::Motion3(e) => self.motion3_tracking(e),
            Event::Motion6(e) => self.motion6_tracking(e),
            Event::Key(_) | Event::Tap(_) => false,
        }
    }

    fn motion1_tracking(&self, _event: &MotionEvent1) -> bool {
        false
    }

    fn motion2_tracking(&self, _event: &MotionEvent2) -> bool {
        false
    }

    fn motion3_tracking(&self, _event: &MotionEvent3) -> bool {
        false
    }

    fn motion6_tracking(&self, _event: &MotionEvent6) -> bool {
        false
    }

    fn key_interaction(&mut self, _event: &KeyEvent) {}

    fn tap_interaction(&mut self, _event: &TapEvent) {}

    /// Reaction to any motion event. Routes to the per-DOF hooks.
    fn motion_interaction(&mut self, event: &Event) {
        match event {
            Event::Motion1(e) => self.motion1_interaction(e),
            Event::Motion2(e) => self.motion2_interaction(e),
            Event::Motion3(e) => self.motion3_interaction(e),
            Event::Motion6(e) => self.motion6_interaction(e),
            Event::Key(_) | Event::Tap(_) => {}
        }
    }

    fn motion1_interaction(&mut self, _event: &MotionEvent1) {}

    fn motion2_interaction(&mut self, _event: &MotionEvent2) {}

    fn motion3_interaction(&mut self, _event: &MotionEvent3) {}

    fn motion6_interaction(&mut self, _event: &MotionEvent6) {}
}

impl<T: TypedGrabber> Grabber for T {
    fn track(&self, event: &Event) -> bool {
        match event {
            Event::Key(e) => self.key_tracking(e),
            Event::Tap(e) => self.tap_tracking(e),
            _ => self.motion_tracking(event),
        }
    }

    fn interact(&mut self, event: &Event) {
        match event {
            Event::Key(e) => self.key_interaction(e),
            Event::Tap(e) => self.tap_interaction(e),
            _ => self.motion_interaction(event),
        }
    }
}

/// Grabber built from a claim predicate and a reaction closure.
pub struct FnGrabber<T, I> {
    predicate: T,
    reaction: I,
}

impl<T, I> FnGrabber<T, I>
where
    T: Fn(&Event) -> bool,
    I: FnMut(&Event),
{
    pub fn new(predicate: T, reaction: I) -> Self {
        Self {
            predicate,
            reaction,
        }
    }
}

impl<T, I> Grabber for FnGrabber<T, I>
where
    T: Fn(&Event) -> bool,
    I: FnMut(&Event),
{
    fn track(&self, event: &Event) -> bool {
        (self.predicate)(event)
    }

    fn interact(&mut self, event: &Event) {
        (self.reaction)(event)
    }
}
