//! Deferred (event, grabber) bindings.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::event::Event;
use crate::grabber::GrabberHandle;

/// Queue shared between an input handler and the agents built for it.
pub(crate) type TupleQueue = Rc<RefCell<VecDeque<Tuple>>>;

/// An event bound to the grabber that will react to it.
///
/// Created by [`Agent::handle`](crate::Agent::handle), executed exactly once by
/// the input handler's drain and then dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuple {
    event: Event,
    grabber: GrabberHandle,
}

impl Tuple {
    pub fn new(event: Event, grabber: GrabberHandle) -> Self {
        Self { event, grabber }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn grabber(&self) -> &GrabberHandle {
        &self.grabber
    }

    /// Runs the grabber's reaction, consuming the tuple.
    pub fn interact(self) {
        self.grabber.interact(&self.event);
    }
}
