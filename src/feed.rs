//! Per-tick event sources for agents.
//!
//! Once per tick the input handler asks every agent's [`Feed`] for at most one
//! tracking event and at most one handling event. A dedicated tracking or
//! handling event wins over the generic one; the generic event is pulled once
//! and may serve both purposes.
//!
//! Hosts that receive input through callbacks can instead call
//! [`Agent::poll`](crate::Agent::poll) and [`Agent::handle`](crate::Agent::handle)
//! directly; the work is still deferred to the next queue drain.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::event::Event;

/// Source of events pulled by the input handler every tick.
pub trait Feed {
    /// Generic event, used for tracking and handling unless a dedicated one exists.
    fn feed(&mut self) -> Option<Event>;

    /// Event used only for tracking.
    fn tracking_feed(&mut self) -> Option<Event> {
        None
    }

    /// Event used only for handling.
    fn handling_feed(&mut self) -> Option<Event> {
        None
    }
}

impl<F: FnMut() -> Option<Event>> Feed for F {
    fn feed(&mut self) -> Option<Event> {
        self()
    }
}

/// The events an agent consumes in one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedSample {
    pub tracking: Option<Event>,
    pub handling: Option<Event>,
}

/// Pulls one tick worth of events, applying tracking/handling precedence.
pub(crate) fn sample(feed: &mut dyn Feed) -> FeedSample {
    let generic = feed.feed();
    let tracking = feed.tracking_feed().or_else(|| generic.clone());
    let handling = feed.handling_feed().or(generic);
    FeedSample { tracking, handling }
}

#[derive(Default)]
struct Queues {
    generic: VecDeque<Event>,
    tracking: VecDeque<Event>,
    handling: VecDeque<Event>,
}

/// Injectable feed: the host pushes events, each tick pops one per queue.
///
/// Clones share the same queues, so keep one clone to push into and hand the
/// other to the agent.
#[derive(Clone, Default)]
pub struct SampleFeed {
    queues: Rc<RefCell<Queues>>,
}

impl SampleFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an event for both tracking and handling.
    pub fn push(&self, event: impl Into<Event>) {
        self.queues.borrow_mut().generic.push_back(event.into());
    }

    pub fn push_tracking(&self, event: impl Into<Event>) {
        self.queues.borrow_mut().tracking.push_back(event.into());
    }

    pub fn push_handling(&self, event: impl Into<Event>) {
        self.queues.borrow_mut().handling.push_back(event.into());
    }

    /// Number of events still waiting in all queues.
    pub fn pending(&self) -> usize {
        let queues = self.queues.borrow();
        queues.generic.len() + queues.tracking.len() + queues.handling.len()
    }
}

impl Feed for SampleFeed {
    fn feed(&mut self) -> Option<Event> {
        self.queues.borrow_mut().generic.pop_front()
    }

    fn tracking_feed(&mut self) -> Option<Event> {
        self.queues.borrow_mut().tracking.pop_front()
    }

    fn handling_feed(&mut self) -> Option<Event> {
        self.queues.borrow_mut().handling.pop_front()
    }
}
