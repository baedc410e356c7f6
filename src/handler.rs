//! The per-tick driver.
//!
//! An [`InputHandler`] owns the tuple queue and the registered agents. The host
//! calls [`InputHandler::handle`] once per frame:
//!
//! 1. every registered agent, in registration order, pulls its feed, polls
//!    with the tracking event and handles the handling event;
//! 2. the queue is drained in FIFO order, running each tuple's reaction.
//!
//! Phase 1 finishes for all agents before phase 2 starts, so every agent
//! contributes to a tick before any grabber reacts, and nothing produced in a
//! tick is left for the next one.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::agent::{Agent, AgentRef};
use crate::config::{AgentConfig, BiasConfig};
use crate::error::{BiasError, Result};
use crate::grabber::GrabberHandle;
use crate::tuple::{Tuple, TupleQueue};

#[derive(Default)]
pub struct InputHandler {
    agents: Vec<AgentRef>,
    queue: TupleQueue,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a handler with one registered agent per configured entry.
    pub fn from_config(config: &BiasConfig) -> Result<Self> {
        let mut handler = Self::new();
        for agent in &config.agents {
            handler.add_agent(agent.clone())?;
        }
        info!(agents = handler.agents.len(), "input handler configured");
        Ok(handler)
    }

    pub(crate) fn queue(&self) -> &TupleQueue {
        &self.queue
    }

    // ---------------------------------------------------------------------
    // Agents
    // ---------------------------------------------------------------------

    /// Creates an agent for this handler and registers it.
    pub fn add_agent(&mut self, config: AgentConfig) -> Result<AgentRef> {
        let agent = Rc::new(RefCell::new(Agent::new(config, self)?));
        self.register_agent(&agent)?;
        Ok(agent)
    }

    pub fn register_agent(&mut self, agent: &AgentRef) -> Result<()> {
        let mut inner = agent.borrow_mut();
        if !inner.enqueues_into(&self.queue) {
            warn!(agent = %inner.name(), "agent belongs to another input handler");
            return Err(BiasError::ForeignAgent(inner.name().to_string()));
        }
        if self.is_agent_registered(agent) {
            warn!(agent = %inner.name(), "agent already registered");
            return Err(BiasError::AgentAlreadyRegistered(inner.name().to_string()));
        }
        inner.set_registered(true);
        debug!(agent = %inner.name(), "agent registered");
        drop(inner);
        self.agents.push(Rc::clone(agent));
        Ok(())
    }

    /// Unregisters an agent. Its tuples already in the queue still run.
    pub fn unregister_agent(&mut self, agent: &AgentRef) -> bool {
        let before = self.agents.len();
        self.agents.retain(|a| !Rc::ptr_eq(a, agent));
        if before == self.agents.len() {
            return false;
        }
        agent.borrow_mut().set_registered(false);
        debug!(agent = %agent.borrow().name(), "agent unregistered");
        true
    }

    pub fn unregister_agents(&mut self) {
        for agent in self.agents.drain(..) {
            agent.borrow_mut().set_registered(false);
        }
    }

    pub fn is_agent_registered(&self, agent: &AgentRef) -> bool {
        self.agents.iter().any(|a| Rc::ptr_eq(a, agent))
    }

    /// Registered agents in registration order.
    pub fn agents(&self) -> &[AgentRef] {
        &self.agents
    }

    pub fn agent(&self, name: &str) -> Option<AgentRef> {
        self.agents
            .iter()
            .find(|a| a.borrow().name() == name)
            .cloned()
    }

    // ---------------------------------------------------------------------
    // Tick
    // ---------------------------------------------------------------------

    /// Runs one tick: every agent consumes its feed, then the queue is drained.
    pub fn handle(&mut self) {
        for agent in &self.agents {
            agent.borrow_mut().tick();
        }

        let mut drained = 0usize;
        loop {
            // The queue borrow must end before the reaction runs.
            let next = self.queue.borrow_mut().pop_front();
            let Some(tuple) = next else {
                break;
            };
            tuple.interact();
            drained += 1;
        }
        if drained > 0 {
            debug!(drained, "tick");
        }
    }

    // ---------------------------------------------------------------------
    // Queue
    // ---------------------------------------------------------------------

    /// Appends a tuple to run on the next drain.
    pub fn enqueue(&self, tuple: Tuple) {
        self.queue.borrow_mut().push_back(tuple);
    }

    /// Removes the first queued tuple equal to `tuple`.
    pub fn remove_tuple(&self, tuple: &Tuple) -> bool {
        let mut queue = self.queue.borrow_mut();
        match queue.iter().position(|t| t == tuple) {
            Some(index) => queue.remove(index).is_some(),
            None => false,
        }
    }

    pub fn clear_queue(&self) {
        self.queue.borrow_mut().clear();
    }

    pub fn queue_len(&self) -> usize {
        self.queue.borrow().len()
    }

    // ---------------------------------------------------------------------
    // Fan-out over registered agents
    // ---------------------------------------------------------------------

    /// Adds the grabber to every registered agent that does not have it yet.
    pub fn add_grabber(&self, grabber: &GrabberHandle) {
        for agent in &self.agents {
            let mut agent = agent.borrow_mut();
            if !agent.has_grabber(grabber) {
                let _ = agent.add_grabber(grabber.clone());
            }
        }
    }

    /// Removes the grabber from every registered agent; `true` if any had it.
    pub fn remove_grabber(&self, grabber: &GrabberHandle) -> bool {
        self.agents
            .iter()
            .fold(false, |removed, a| a.borrow_mut().remove_grabber(grabber) | removed)
    }

    pub fn remove_grabbers(&self) {
        for agent in &self.agents {
            agent.borrow_mut().remove_grabbers();
        }
    }

    /// Sets the default grabber on every registered agent whose pool has it.
    /// `None` clears every default.
    pub fn set_default_grabber(&self, grabber: Option<&GrabberHandle>) {
        for agent in &self.agents {
            let mut agent = agent.borrow_mut();
            if grabber.map_or(true, |g| agent.has_grabber(g)) {
                let _ = agent.set_default_grabber(grabber);
            }
        }
    }

    /// Shifts the default on every registered agent holding either grabber.
    pub fn shift_default_grabber(&self, first: &GrabberHandle, second: &GrabberHandle) {
        for agent in &self.agents {
            let mut agent = agent.borrow_mut();
            if agent.has_grabber(first) || agent.has_grabber(second) {
                let _ = agent.shift_default_grabber(first, second);
            }
        }
    }

    pub fn reset_tracked_grabber(&self) {
        for agent in &self.agents {
            agent.borrow_mut().reset_tracked_grabber();
        }
    }

    /// `true` if any registered agent has the grabber in its pool.
    pub fn has_grabber(&self, grabber: &GrabberHandle) -> bool {
        self.agents.iter().any(|a| a.borrow().has_grabber(grabber))
    }

    /// `true` if the grabber is the input grabber of any registered agent.
    pub fn is_input_grabber(&self, grabber: &GrabberHandle) -> bool {
        self.agents.iter().any(|a| a.borrow().is_input_grabber(grabber))
    }
}
