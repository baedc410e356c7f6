//! Agents: per-device routers that decide which grabber owns input.
//!
//! An agent keeps a pool of grabbers plus two distinguished members:
//! - the **default grabber**, which receives input whenever nothing is tracked;
//! - the **tracked grabber**, recomputed by every [`Agent::poll`].
//!
//! ## Tracking priority
//! `poll` offers the event to candidates in this order and stops at the first
//! one whose [`Grabber::track`](crate::Grabber::track) accepts it:
//! 1. the default grabber (singleton targets such as a keyboard focus stay sticky);
//! 2. the currently tracked grabber (an engaged gesture is not stolen by pool order);
//! 3. the remaining pool members, in insertion order.
//!
//! If nobody accepts, nothing is tracked.
//!
//! ## Deferred handling
//! [`Agent::handle`] never calls a grabber. It binds the event to the current
//! input grabber (tracked, else default) in a [`Tuple`] and appends it to the
//! input handler's queue, which is drained once per tick.
//!
//! Pools must not be mutated from inside a grabber's `track` while the agent
//! is polling.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::config::AgentConfig;
use crate::error::{BiasError, Result};
use crate::event::{Event, EventId, Gesture};
use crate::feed::{self, Feed, FeedSample};
use crate::grabber::GrabberHandle;
use crate::handler::InputHandler;
use crate::tuple::{Tuple, TupleQueue};

/// Shared reference to an agent, as held by the input handler.
pub type AgentRef = Rc<RefCell<Agent>>;

pub struct Agent {
    name: String,
    pool: Vec<GrabberHandle>,
    tracked: Option<GrabberHandle>,
    default: Option<GrabberHandle>,
    tracking: bool,
    sensitivities: [f32; 6],
    ids: BTreeMap<String, EventId>,
    feed: Option<Box<dyn Feed>>,
    queue: TupleQueue,
    registered: bool,
}

impl Agent {
    /// Creates an agent that enqueues into `handler`'s queue.
    ///
    /// The agent is inert until registered with
    /// [`InputHandler::register_agent`]; [`InputHandler::add_agent`] does both.
    pub fn new(config: AgentConfig, handler: &InputHandler) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: config.name,
            pool: Vec::new(),
            tracked: None,
            default: None,
            tracking: config.tracking,
            sensitivities: config.sensitivities,
            ids: config.ids,
            feed: None,
            queue: Rc::clone(handler.queue()),
            registered: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Named gesture id from the agent's config.
    pub fn event_id(&self, name: &str) -> Option<EventId> {
        self.ids.get(name).copied()
    }

    pub fn sensitivities(&self) -> &[f32; 6] {
        &self.sensitivities
    }

    pub fn set_sensitivities(&mut self, sensitivities: [f32; 6]) -> Result<()> {
        if let Some(axis) = sensitivities.iter().position(|s| !s.is_finite()) {
            warn!(agent = %self.name, axis, "rejected non-finite sensitivity");
            return Err(BiasError::InvalidSensitivities {
                agent: self.name.clone(),
                axis,
            });
        }
        self.sensitivities = sensitivities;
        Ok(())
    }

    /// Installs the source the input handler pulls from every tick.
    pub fn set_feed(&mut self, feed: impl Feed + 'static) {
        self.feed = Some(Box::new(feed));
    }

    pub fn clear_feed(&mut self) {
        self.feed = None;
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub(crate) fn set_registered(&mut self, registered: bool) {
        self.registered = registered;
    }

    pub(crate) fn enqueues_into(&self, queue: &TupleQueue) -> bool {
        Rc::ptr_eq(&self.queue, queue)
    }

    // ---------------------------------------------------------------------
    // Grabber pool
    // ---------------------------------------------------------------------

    /// Adds a grabber to the pool. Duplicates are rejected.
    pub fn add_grabber(&mut self, grabber: GrabberHandle) -> Result<()> {
        if self.has_grabber(&grabber) {
            warn!(agent = %self.name, "grabber already in pool");
            return Err(BiasError::DuplicateGrabber {
                agent: self.name.clone(),
            });
        }
        self.pool.push(grabber);
        Ok(())
    }

    /// Removes a grabber, first clearing it as default or tracked grabber.
    ///
    /// Returns `false` if it was not in the pool.
    pub fn remove_grabber(&mut self, grabber: &GrabberHandle) -> bool {
        if self.default.as_ref() == Some(grabber) {
            self.default = None;
        }
        if self.tracked.as_ref() == Some(grabber) {
            self.tracked = None;
        }
        let before = self.pool.len();
        self.pool.retain(|g| g != grabber);
        before != self.pool.len()
    }

    /// Empties the pool along with the default and tracked grabbers.
    pub fn remove_grabbers(&mut self) {
        self.default = None;
        self.tracked = None;
        self.pool.clear();
    }

    pub fn grabbers(&self) -> &[GrabberHandle] {
        &self.pool
    }

    pub fn has_grabber(&self, grabber: &GrabberHandle) -> bool {
        self.pool.contains(grabber)
    }

    // ---------------------------------------------------------------------
    // Tracking state
    // ---------------------------------------------------------------------

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Enables or disables tracking. Disabling forgets the tracked grabber.
    pub fn set_tracking(&mut self, enabled: bool) {
        self.tracking = enabled;
        if !enabled {
            self.tracked = None;
        }
    }

    pub fn enable_tracking(&mut self) {
        self.set_tracking(true);
    }

    pub fn disable_tracking(&mut self) {
        self.set_tracking(false);
    }

    pub fn toggle_tracking(&mut self) {
        self.set_tracking(!self.tracking);
    }

    pub fn tracked_grabber(&self) -> Option<&GrabberHandle> {
        self.tracked.as_ref()
    }

    pub fn reset_tracked_grabber(&mut self) {
        self.tracked = None;
    }

    pub fn default_grabber(&self) -> Option<&GrabberHandle> {
        self.default.as_ref()
    }

    /// Sets (or with `None`, clears) the default grabber.
    ///
    /// The grabber must already be in the pool; otherwise the default is left
    /// unchanged.
    pub fn set_default_grabber(&mut self, grabber: Option<&GrabberHandle>) -> Result<()> {
        match grabber {
            None => {
                self.default = None;
                Ok(())
            }
            Some(g) if self.has_grabber(g) => {
                self.default = Some(g.clone());
                Ok(())
            }
            Some(_) => {
                warn!(agent = %self.name, "default grabber must be added to the agent first");
                Err(BiasError::GrabberNotInPool {
                    agent: self.name.clone(),
                })
            }
        }
    }

    /// Toggles the default between two grabbers.
    ///
    /// If `first` is not the default it becomes the default (falling back to
    /// `second` if `first` is not in the pool); otherwise `second` does.
    pub fn shift_default_grabber(
        &mut self,
        first: &GrabberHandle,
        second: &GrabberHandle,
    ) -> Result<()> {
        if self.default.as_ref() != Some(first) && self.has_grabber(first) {
            self.set_default_grabber(Some(first))
        } else {
            self.set_default_grabber(Some(second))
        }
    }

    /// Grabber that handled events are bound to: tracked, else default.
    pub fn input_grabber(&self) -> Option<&GrabberHandle> {
        self.tracked.as_ref().or(self.default.as_ref())
    }

    pub fn is_input_grabber(&self, grabber: &GrabberHandle) -> bool {
        self.input_grabber() == Some(grabber)
    }

    // ---------------------------------------------------------------------
    // Poll / handle
    // ---------------------------------------------------------------------

    /// Recomputes the tracked grabber for `event` and returns it.
    ///
    /// Does nothing (returning the current tracked grabber) if the agent is not
    /// registered or tracking is disabled.
    pub fn poll(&mut self, event: &Event) -> Option<GrabberHandle> {
        if !self.registered {
            warn!(agent = %self.name, "poll on unregistered agent ignored");
            return self.tracked.clone();
        }
        if !self.tracking {
            return self.tracked.clone();
        }

        if let Some(default) = &self.default {
            if default.track(event) {
                self.tracked = Some(default.clone());
                return self.tracked.clone();
            }
        }

        let previous = self.tracked.take();
        let engaged = previous
            .as_ref()
            .is_some_and(|g| self.default.as_ref() != Some(g) && g.track(event));
        if engaged {
            self.tracked = previous;
            return self.tracked.clone();
        }

        let default = self.default.as_ref();
        self.tracked = self
            .pool
            .iter()
            .filter(|g| Some(*g) != default && Some(*g) != previous.as_ref())
            .find(|g| g.track(event))
            .cloned();
        trace!(agent = %self.name, tracked = self.tracked.is_some(), "poll");
        self.tracked.clone()
    }

    /// Queues `event` for the current input grabber.
    ///
    /// Returns `false`, queuing nothing, if the agent is not registered, the
    /// event is motion without movement or gesture boundary, or there is no
    /// input grabber. Absolute motion is scaled by the agent's sensitivities.
    pub fn handle(&mut self, event: impl Into<Event>) -> bool {
        let mut event = event.into();
        if !self.registered {
            warn!(agent = %self.name, "handle on unregistered agent ignored");
            return false;
        }
        if event.is_motion() && event.is_null() && !event.flushed() {
            trace!(agent = %self.name, id = event.id(), "null motion dropped");
            return false;
        }
        event.modulate(&self.sensitivities);

        let Some(grabber) = self.input_grabber().cloned() else {
            trace!(agent = %self.name, id = event.id(), "no input grabber");
            return false;
        };
        debug!(agent = %self.name, shortcut = %event.shortcut(), "event queued");
        self.queue.borrow_mut().push_back(Tuple::new(event, grabber));
        true
    }

    /// Phase 1 of a tick: pull the feed, poll, then handle.
    pub(crate) fn tick(&mut self) {
        let Some(feed) = self.feed.as_deref_mut() else {
            return;
        };
        let FeedSample { tracking, handling } = feed::sample(feed);
        if let Some(event) = tracking {
            self.poll(&event);
        }
        if let Some(event) = handling {
            self.handle(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventCore, KeyEvent, Modifiers};
    use crate::grabber::FnGrabber;
    use crate::motion::{MotionEvent1, MotionEvent2};
    use std::cell::Cell;

    fn grabber(accepts: impl Fn(&Event) -> bool + 'static) -> GrabberHandle {
        GrabberHandle::new(FnGrabber::new(accepts, |_: &Event| {}))
    }

    fn always() -> GrabberHandle {
        grabber(|_| true)
    }

    fn never() -> GrabberHandle {
        grabber(|_| false)
    }

    fn registered(handler: &mut InputHandler) -> AgentRef {
        handler.add_agent(AgentConfig::new("test")).unwrap()
    }

    fn motion(dx: f32) -> Event {
        MotionEvent2::absolute(EventCore::default(), dx, 0.0).into()
    }

    #[test]
    fn pool_membership() {
        let handler = InputHandler::new();
        let mut agent = Agent::new(AgentConfig::new("a"), &handler).unwrap();
        let g = always();

        assert!(agent.add_grabber(g.clone()).is_ok());
        assert!(agent.has_grabber(&g));
        assert!(matches!(
            agent.add_grabber(g.clone()),
            Err(BiasError::DuplicateGrabber { .. })
        ));
        assert_eq!(agent.grabbers().len(), 1);

        assert!(agent.remove_grabber(&g));
        assert!(!agent.has_grabber(&g));
        assert!(!agent.remove_grabber(&g));
    }

    #[test]
    fn default_must_be_in_pool() {
        let handler = InputHandler::new();
        let mut agent = Agent::new(AgentConfig::new("a"), &handler).unwrap();
        let member = always();
        let outsider = always();
        agent.add_grabber(member.clone()).unwrap();

        agent.set_default_grabber(Some(&member)).unwrap();
        assert!(matches!(
            agent.set_default_grabber(Some(&outsider)),
            Err(BiasError::GrabberNotInPool { .. })
        ));
        assert_eq!(agent.default_grabber(), Some(&member));

        agent.set_default_grabber(None).unwrap();
        assert!(agent.default_grabber().is_none());
    }

    #[test]
    fn removing_grabber_clears_default_and_tracked() {
        let mut handler = InputHandler::new();
        let agent = registered(&mut handler);
        let mut agent = agent.borrow_mut();
        let g = always();
        agent.add_grabber(g.clone()).unwrap();
        agent.set_default_grabber(Some(&g)).unwrap();
        agent.poll(&motion(1.0));
        assert_eq!(agent.tracked_grabber(), Some(&g));

        agent.remove_grabber(&g);
        assert!(agent.default_grabber().is_none());
        assert!(agent.tracked_grabber().is_none());
        assert!(agent.input_grabber().is_none());
    }

    #[test]
    fn disabling_tracking_forgets_tracked_grabber() {
        let mut handler = InputHandler::new();
        let agent = registered(&mut handler);
        let mut agent = agent.borrow_mut();
        let g = always();
        agent.add_grabber(g.clone()).unwrap();
        agent.poll(&motion(1.0));
        assert_eq!(agent.tracked_grabber(), Some(&g));

        agent.disable_tracking();
        assert!(agent.tracked_grabber().is_none());
        assert_eq!(agent.poll(&motion(1.0)), None);

        agent.toggle_tracking();
        assert!(agent.is_tracking());
        assert_eq!(agent.poll(&motion(1.0)), Some(g));
    }

    #[test]
    fn poll_prefers_default_then_tracked_then_pool() {
        let mut handler = InputHandler::new();
        let agent = registered(&mut handler);
        let mut agent = agent.borrow_mut();

        let default_accepts = Rc::new(Cell::new(true));
        let tracked_accepts = Rc::new(Cell::new(true));
        let flag = default_accepts.clone();
        let d = grabber(move |_| flag.get());
        let flag = tracked_accepts.clone();
        let t = grabber(move |_| flag.get());
        let x = always();

        // Without a default the pool scan picks `t`, the first member.
        agent.add_grabber(t.clone()).unwrap();
        agent.add_grabber(x.clone()).unwrap();
        agent.add_grabber(d.clone()).unwrap();
        assert_eq!(agent.poll(&motion(1.0)), Some(t.clone()));

        agent.set_default_grabber(Some(&d)).unwrap();
        assert_eq!(agent.poll(&motion(1.0)), Some(d.clone()));

        // Re-engage `t`, then only `t` accepts.
        default_accepts.set(false);
        agent.reset_tracked_grabber();
        assert_eq!(agent.poll(&motion(1.0)), Some(t.clone()));
        assert_eq!(agent.poll(&motion(1.0)), Some(t.clone()));

        // Neither default nor tracked accepts: the pool scan finds `x`.
        tracked_accepts.set(false);
        assert_eq!(agent.poll(&motion(1.0)), Some(x.clone()));
    }

    #[test]
    fn poll_keeps_engaged_grabber_over_earlier_pool_members() {
        let mut handler = InputHandler::new();
        let agent = registered(&mut handler);
        let mut agent = agent.borrow_mut();

        let first_accepts = Rc::new(Cell::new(false));
        let flag = first_accepts.clone();
        let first = grabber(move |_| flag.get());
        let second = always();
        agent.add_grabber(first.clone()).unwrap();
        agent.add_grabber(second.clone()).unwrap();

        assert_eq!(agent.poll(&motion(1.0)), Some(second.clone()));
        first_accepts.set(true);
        assert_eq!(agent.poll(&motion(1.0)), Some(second));
    }

    #[test]
    fn poll_with_no_taker_tracks_nothing() {
        let mut handler = InputHandler::new();
        let agent = registered(&mut handler);
        let mut agent = agent.borrow_mut();
        agent.add_grabber(never()).unwrap();
        agent.add_grabber(never()).unwrap();
        assert_eq!(agent.poll(&motion(1.0)), None);
        assert!(agent.tracked_grabber().is_none());
    }

    #[test]
    fn unregistered_agent_neither_polls_nor_handles() {
        let handler = InputHandler::new();
        let mut agent = Agent::new(AgentConfig::new("loose"), &handler).unwrap();
        let g = always();
        agent.add_grabber(g.clone()).unwrap();
        agent.set_default_grabber(Some(&g)).unwrap();

        assert_eq!(agent.poll(&motion(1.0)), None);
        assert!(!agent.handle(motion(1.0)));
        assert_eq!(handler.queue_len(), 0);
    }

    #[test]
    fn handle_defers_to_queue() {
        let mut handler = InputHandler::new();
        let agent = registered(&mut handler);
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let g = GrabberHandle::new(FnGrabber::new(
            |_: &Event| true,
            move |_: &Event| counter.set(counter.get() + 1),
        ));
        {
            let mut agent = agent.borrow_mut();
            agent.add_grabber(g.clone()).unwrap();
            agent.set_default_grabber(Some(&g)).unwrap();
            assert!(agent.handle(KeyEvent::from_char('a')));
        }
        assert_eq!(calls.get(), 0);
        assert_eq!(handler.queue_len(), 1);
    }

    #[test]
    fn handle_drops_null_motion_but_keeps_boundaries() {
        let mut handler = InputHandler::new();
        let agent = registered(&mut handler);
        let mut agent = agent.borrow_mut();
        let g = always();
        agent.add_grabber(g.clone()).unwrap();
        agent.set_default_grabber(Some(&g)).unwrap();

        let still = MotionEvent2::absolute(EventCore::default(), 0.0, 0.0);
        assert!(!agent.handle(still.clone()));
        assert!(agent.handle(still.fire()));
        assert!(agent.handle(still.flush()));
        assert_eq!(handler.queue_len(), 2);
    }

    #[test]
    fn handle_without_input_grabber_queues_nothing() {
        let mut handler = InputHandler::new();
        let agent = registered(&mut handler);
        agent.borrow_mut().add_grabber(always()).unwrap();
        assert!(!agent.borrow_mut().handle(motion(1.0)));
        assert_eq!(handler.queue_len(), 0);
    }

    #[test]
    fn handle_scales_absolute_motion() {
        let mut handler = InputHandler::new();
        let agent = handler
            .add_agent(AgentConfig::new("wheel").with_sensitivities([3.0, 1.0, 1.0, 1.0, 1.0, 1.0]))
            .unwrap();
        let seen = Rc::new(Cell::new(0.0));
        let sink = seen.clone();
        let g = GrabberHandle::new(FnGrabber::new(
            |_: &Event| true,
            move |event: &Event| {
                if let Event::Motion1(e) = event {
                    sink.set(e.dx());
                }
            },
        ));
        {
            let mut agent = agent.borrow_mut();
            agent.add_grabber(g.clone()).unwrap();
            agent.set_default_grabber(Some(&g)).unwrap();
            agent.handle(MotionEvent1::absolute(EventCore::new(Modifiers::empty(), 10), 2.0));
        }
        handler.handle();
        assert_eq!(seen.get(), 6.0);
    }

    #[test]
    fn shift_default_toggles_between_two() {
        let handler = InputHandler::new();
        let mut agent = Agent::new(AgentConfig::new("a"), &handler).unwrap();
        let drag = always();
        let pick = always();
        agent.add_grabber(drag.clone()).unwrap();
        agent.add_grabber(pick.clone()).unwrap();

        agent.shift_default_grabber(&drag, &pick).unwrap();
        assert_eq!(agent.default_grabber(), Some(&drag));
        agent.shift_default_grabber(&drag, &pick).unwrap();
        assert_eq!(agent.default_grabber(), Some(&pick));
        agent.shift_default_grabber(&drag, &pick).unwrap();
        assert_eq!(agent.default_grabber(), Some(&drag));

        // `first` outside the pool falls back to `second`.
        let outsider = always();
        agent.set_default_grabber(None).unwrap();
        agent.shift_default_grabber(&outsider, &pick).unwrap();
        assert_eq!(agent.default_grabber(), Some(&pick));
    }

    #[test]
    fn event_ids_come_from_config() {
        let handler = InputHandler::new();
        let agent = Agent::new(AgentConfig::pointer("mouse"), &handler).unwrap();
        assert_eq!(agent.event_id("left"), Some(1));
        assert_eq!(agent.event_id("wheel"), Some(10));
        assert_eq!(agent.event_id("pen"), None);
    }
}
