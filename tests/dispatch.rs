use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use bias::{
    AgentConfig, BiasConfig, Event, EventCore, Gesture, GrabberHandle, InputHandler, KeyEvent,
    Modifiers, MotionEvent2, SampleFeed, Shortcut, Traced, TypedGrabber,
};

/// Records the x coordinate of every motion it reacts to.
struct Region {
    accepts: fn(f32) -> bool,
    hits: Vec<f32>,
}

impl Region {
    fn shared(accepts: fn(f32) -> bool) -> Rc<RefCell<Region>> {
        Rc::new(RefCell::new(Region {
            accepts,
            hits: Vec::new(),
        }))
    }
}

impl TypedGrabber for Region {
    fn motion2_tracking(&self, event: &MotionEvent2) -> bool {
        (self.accepts)(event.x())
    }

    fn motion2_interaction(&mut self, event: &MotionEvent2) {
        self.hits.push(event.x());
    }
}

fn pointer_at(x: f32, y: f32, previous: Option<&MotionEvent2>) -> MotionEvent2 {
    MotionEvent2::relative(EventCore::new(Modifiers::empty(), 0), x, y, previous)
}

#[test]
fn pointer_moves_between_regions() {
    let mut handler = InputHandler::new();
    let mouse = handler.add_agent(AgentConfig::pointer("mouse")).unwrap();
    let feed = SampleFeed::new();
    mouse.borrow_mut().set_feed(feed.clone());

    let left = Region::shared(|x| x < 50.0);
    let right = Region::shared(|x| x >= 50.0);
    let left_handle = GrabberHandle::from(left.clone());
    let right_handle = GrabberHandle::from(right.clone());
    mouse.borrow_mut().add_grabber(left_handle.clone()).unwrap();
    mouse.borrow_mut().add_grabber(right_handle.clone()).unwrap();

    // A gesture's first sample has no predecessor; firing it keeps it from
    // being dropped as idle motion.
    let first = pointer_at(10.0, 0.0, None).fire();
    feed.push(first.clone());
    handler.handle();
    assert_eq!(left.borrow().hits, vec![10.0]);
    assert!(right.borrow().hits.is_empty());
    assert_eq!(handler.queue_len(), 0);
    assert_eq!(mouse.borrow().tracked_grabber(), Some(&left_handle));

    feed.push(pointer_at(90.0, 0.0, Some(&first)));
    handler.handle();
    assert_eq!(left.borrow().hits, vec![10.0]);
    assert_eq!(right.borrow().hits, vec![90.0]);
    assert!(mouse.borrow().is_input_grabber(&right_handle));

    // Nothing fed: no reaction, no carry-over.
    handler.handle();
    assert_eq!(right.borrow().hits.len(), 1);
}

#[test]
fn dedicated_tracking_feed_steers_generic_handling() {
    let mut handler = InputHandler::new();
    let mouse = handler.add_agent(AgentConfig::pointer("mouse")).unwrap();
    let feed = SampleFeed::new();
    mouse.borrow_mut().set_feed(feed.clone());

    let left = Region::shared(|x| x < 50.0);
    let right = Region::shared(|x| x >= 50.0);
    mouse.borrow_mut().add_grabber(GrabberHandle::from(left.clone())).unwrap();
    mouse.borrow_mut().add_grabber(GrabberHandle::from(right.clone())).unwrap();

    // Tracking sees x = 90, so the generic x = 10 sample goes to `right`.
    feed.push_tracking(pointer_at(90.0, 0.0, None));
    feed.push(pointer_at(10.0, 0.0, None).fire());
    handler.handle();
    assert!(left.borrow().hits.is_empty());
    assert_eq!(right.borrow().hits, vec![10.0]);
}

#[test]
fn idle_relative_motion_produces_no_work() {
    let mut handler = InputHandler::new();
    let mouse = handler.add_agent(AgentConfig::pointer("mouse")).unwrap();
    let left = Region::shared(|_| true);
    let handle = GrabberHandle::from(left.clone());
    mouse.borrow_mut().add_grabber(handle.clone()).unwrap();
    mouse.borrow_mut().set_default_grabber(Some(&handle)).unwrap();

    let t0 = Instant::now();
    let first = MotionEvent2::relative(EventCore::default().at(t0), 5.0, 5.0, None);
    let still = MotionEvent2::relative(
        EventCore::default().at(t0 + Duration::from_millis(16)),
        5.0,
        5.0,
        Some(&first),
    );
    assert!(still.is_null());
    assert!(!mouse.borrow_mut().handle(still.clone()));
    assert!(mouse.borrow_mut().handle(still.flush()));

    handler.handle();
    assert_eq!(left.borrow().hits, vec![5.0]);
}

#[test]
fn configured_handler_resolves_bound_actions() {
    let config = BiasConfig::from_toml_str(
        r#"
        [[agents]]
        name = "keyboard"

        [[profiles]]
        name = "editor"

        [[profiles.bindings]]
        action = "undo"
        shortcut = { kind = "key", modifiers = "CTRL", virtual_key = 90 }
        "#,
    )
    .unwrap();
    let mut handler = InputHandler::from_config(&config).unwrap();
    let profile = config.profile("editor").unwrap().clone();

    let actions = Rc::new(RefCell::new(Vec::new()));
    let sink = actions.clone();
    let editor = GrabberHandle::new(Traced::new(
        "editor",
        bias::FnGrabber::new(
            |event: &Event| matches!(event, Event::Key(_)),
            move |event: &Event| {
                if let Some(action) = profile.resolve(event) {
                    sink.borrow_mut().push(action.to_string());
                }
            },
        ),
    ));

    let keyboard = handler.agent("keyboard").unwrap();
    keyboard.borrow_mut().add_grabber(editor.clone()).unwrap();
    keyboard.borrow_mut().set_default_grabber(Some(&editor)).unwrap();

    let undo = KeyEvent::from_virtual_key(Modifiers::CTRL, 90);
    assert_eq!(undo.shortcut(), Shortcut::virtual_key(Modifiers::CTRL, 90));
    keyboard.borrow_mut().handle(undo);
    keyboard.borrow_mut().handle(KeyEvent::from_char('z'));
    handler.handle();

    assert_eq!(*actions.borrow(), vec!["undo".to_string()]);
}

#[test]
fn unregistered_agent_is_inert() {
    let mut handler = InputHandler::new();
    let mouse = handler.add_agent(AgentConfig::pointer("mouse")).unwrap();
    let region = Region::shared(|_| true);
    let handle = GrabberHandle::from(region.clone());
    mouse.borrow_mut().add_grabber(handle.clone()).unwrap();
    mouse.borrow_mut().set_default_grabber(Some(&handle)).unwrap();

    assert!(handler.unregister_agent(&mouse));
    assert!(!mouse.borrow_mut().handle(pointer_at(1.0, 1.0, None)));
    assert_eq!(mouse.borrow_mut().poll(&pointer_at(1.0, 1.0, None).into()), None);
    handler.handle();
    assert!(region.borrow().hits.is_empty());
}
