//! Input abstraction for interactive applications.
//!
//! Raw input is normalized into [`Event`]s (keys, taps and motion with 1, 2, 3
//! or 6 degrees of freedom). An [`Agent`] decides which [`Grabber`] owns each
//! event and queues the pair as a [`Tuple`]; the [`InputHandler`] runs every
//! queued reaction once per tick.
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//! use bias::{AgentConfig, Event, EventCore, Grabber, GrabberHandle, InputHandler, MotionEvent2, SampleFeed};
//!
//! #[derive(Default)]
//! struct Knob { turned: f32 }
//!
//! impl Grabber for Knob {
//!     fn track(&self, event: &Event) -> bool { event.is_motion() }
//!     fn interact(&mut self, event: &Event) {
//!         if let Event::Motion2(e) = event { self.turned += e.dx(); }
//!     }
//! }
//!
//! let mut handler = InputHandler::new();
//! let mouse = handler.add_agent(AgentConfig::pointer("mouse")).unwrap();
//! let feed = SampleFeed::new();
//! mouse.borrow_mut().set_feed(feed.clone());
//!
//! let knob = Rc::new(RefCell::new(Knob::default()));
//! mouse.borrow_mut().add_grabber(GrabberHandle::from(knob.clone())).unwrap();
//!
//! feed.push(MotionEvent2::absolute(EventCore::default(), 4.0, 0.0));
//! handler.handle();
//! assert_eq!(knob.borrow().turned, 4.0);
//! ```

pub mod agent;
pub mod binding;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod grabber;
pub mod handler;
pub mod logger;
pub mod motion;
pub mod shortcut;
pub mod tuple;

pub use agent::{Agent, AgentRef};
pub use binding::{Binding, BindingProfile};
pub use config::{AgentConfig, BiasConfig};
pub use error::{BiasError, Result};
pub use event::{Event, EventCore, EventId, Gesture, KeyEvent, Modifiers, TapEvent, NO_ID};
pub use feed::{Feed, FeedSample, SampleFeed};
pub use grabber::{FnGrabber, Grabber, GrabberHandle, TypedGrabber};
pub use handler::InputHandler;
pub use logger::Traced;
pub use motion::{Kinematics, MotionEvent1, MotionEvent2, MotionEvent3, MotionEvent6, MotionGesture};
pub use shortcut::Shortcut;
pub use tuple::Tuple;
