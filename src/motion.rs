//! Motion events with 1, 2, 3 or 6 degrees of freedom.
//!
//! ## Relative vs absolute
//! - **Relative** events are built from a current position and the previous event
//!   of the same gesture ([`MotionEvent2::relative`] etc.). Deltas are the axis
//!   differences, `distance` is the Euclidean norm of the delta vector, `delay` is
//!   the time since the previous event and `speed = distance / delay` (per
//!   millisecond; `distance` itself when the delay is zero). A predecessor with a
//!   different id contributes nothing: the event stays relative with zero deltas.
//! - **Absolute** events carry explicit deltas only ([`MotionEvent2::absolute`]).
//!   Distance, speed and delay stay zero.
//!
//! ## Reduction
//! Any event can be reduced to fewer axes: 6 → 3 (translation or rotation),
//! 3 → 2 (drops `z`), 2 → 1 (keeps `x` or `y`). A relative source is rebuilt from
//! its previous and current coordinates so the reduced deltas are consistent; an
//! absolute source just carries the selected deltas over. In both cases the
//! reduced event keeps the source's `delay`, `distance` and `speed` verbatim:
//! timing is shared across reductions, geometry is not. Modifiers, id, timestamp
//! and the fired/flushed flags carry over unchanged.
//!
//! The 6-DOF distance treats the rotational axes as three more Euclidean
//! dimensions, without unit normalization.

use std::time::Duration;

use crate::event::{Event, EventCore, Gesture};

/// Timing and distance bookkeeping of a motion event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Kinematics {
    delay: Duration,
    distance: f32,
    speed: f32,
    relative: bool,
}

impl Kinematics {
    /// Relative bookkeeping with nothing measured yet.
    fn unmeasured() -> Self {
        Self {
            relative: true,
            ..Self::default()
        }
    }

    fn between(current: &EventCore, previous: &EventCore, distance: f32) -> Self {
        let delay = current
            .timestamp()
            .saturating_duration_since(previous.timestamp());
        Self {
            delay,
            distance,
            speed: speed(distance, delay),
            relative: true,
        }
    }

    /// Time elapsed since the previous event of the gesture.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Distance per millisecond.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }
}

fn speed(distance: f32, delay: Duration) -> f32 {
    let millis = delay.as_nanos() as f64 / 1_000_000.0;
    if millis == 0.0 {
        distance
    } else {
        (f64::from(distance) / millis) as f32
    }
}

fn euclidean<const N: usize>(a: [f32; N], b: [f32; N]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(p, q)| (q - p) * (q - p))
        .sum::<f32>()
        .sqrt()
}

/// Planar distance between `(x1, y1)` and `(x2, y2)`.
pub fn distance2(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    euclidean([x1, y1], [x2, y2])
}

/// Spatial distance between two points.
pub fn distance3(a: [f32; 3], b: [f32; 3]) -> f32 {
    euclidean(a, b)
}

/// Distance between two `[x, y, z, rx, ry, rz]` poses, rotations included as-is.
pub fn distance6(a: [f32; 6], b: [f32; 6]) -> f32 {
    euclidean(a, b)
}

fn same_gesture<'a, T: Gesture>(core: &EventCore, previous: Option<&'a T>) -> Option<&'a T> {
    previous.filter(|p| p.id() == core.id())
}

/// Accessors shared by the motion event types.
pub trait MotionGesture: Gesture {
    /// Number of axes.
    const DOF: usize;

    fn kinematics(&self) -> &Kinematics;

    /// Scales the deltas of an absolute event by per-axis sensitivities.
    ///
    /// Relative events, and slices shorter than [`Self::DOF`], are left alone.
    fn modulate(&mut self, sensitivities: &[f32]);

    fn delay(&self) -> Duration {
        self.kinematics().delay()
    }

    fn distance(&self) -> f32 {
        self.kinematics().distance()
    }

    fn speed(&self) -> f32 {
        self.kinematics().speed()
    }

    fn is_relative(&self) -> bool {
        self.kinematics().is_relative()
    }

    fn is_absolute(&self) -> bool {
        !self.is_relative()
    }
}

/// One-axis motion (wheels, sliders, a single reduced axis).
#[derive(Clone, Debug, PartialEq)]
pub struct MotionEvent1 {
    core: EventCore,
    kinematics: Kinematics,
    x: f32,
    dx: f32,
}

impl MotionEvent1 {
    pub fn absolute(core: EventCore, dx: f32) -> Self {
        Self {
            core,
            kinematics: Kinematics::default(),
            x: 0.0,
            dx,
        }
    }

    pub fn relative(core: EventCore, x: f32, previous: Option<&MotionEvent1>) -> Self {
        let mut event = Self {
            core,
            kinematics: Kinematics::unmeasured(),
            x,
            dx: 0.0,
        };
        if let Some(previous) = same_gesture(&event.core, previous) {
            event.dx = x - previous.x;
            event.kinematics = Kinematics::between(&event.core, &previous.core, event.dx.abs());
        }
        event
    }

    fn reduced(core: &EventCore, kinematics: &Kinematics, x: f32, dx: f32) -> Self {
        let mut event = if kinematics.is_relative() {
            let previous = Self::relative(core.clone(), x - dx, None);
            Self::relative(core.clone(), x, Some(&previous))
        } else {
            Self::absolute(core.clone(), dx)
        };
        event.kinematics = *kinematics;
        event
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn dx(&self) -> f32 {
        self.dx
    }

    pub fn previous_x(&self) -> f32 {
        self.x - self.dx
    }
}

impl Gesture for MotionEvent1 {
    fn core(&self) -> &EventCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EventCore {
        &mut self.core
    }

    fn is_null(&self) -> bool {
        self.dx == 0.0 && !self.core.fired() && !self.core.flushed()
    }
}

impl MotionGesture for MotionEvent1 {
    const DOF: usize = 1;

    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    fn modulate(&mut self, sensitivities: &[f32]) {
        if self.is_absolute() && sensitivities.len() >= Self::DOF {
            self.dx *= sensitivities[0];
        }
    }
}

/// Two-axis motion (pointers, touch drags).
#[derive(Clone, Debug, PartialEq)]
pub struct MotionEvent2 {
    core: EventCore,
    kinematics: Kinematics,
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
}

impl MotionEvent2 {
    pub fn absolute(core: EventCore, dx: f32, dy: f32) -> Self {
        Self {
            core,
            kinematics: Kinematics::default(),
            x: 0.0,
            y: 0.0,
            dx,
            dy,
        }
    }

    pub fn relative(core: EventCore, x: f32, y: f32, previous: Option<&MotionEvent2>) -> Self {
        let mut event = Self {
            core,
            kinematics: Kinematics::unmeasured(),
            x,
            y,
            dx: 0.0,
            dy: 0.0,
        };
        if let Some(previous) = same_gesture(&event.core, previous) {
            event.dx = x - previous.x;
            event.dy = y - previous.y;
            let distance = distance2(previous.x, previous.y, x, y);
            event.kinematics = Kinematics::between(&event.core, &previous.core, distance);
        }
        event
    }

    fn reduced(core: &EventCore, kinematics: &Kinematics, position: [f32; 2], delta: [f32; 2]) -> Self {
        let [x, y] = position;
        let [dx, dy] = delta;
        let mut event = if kinematics.is_relative() {
            let previous = Self::relative(core.clone(), x - dx, y - dy, None);
            Self::relative(core.clone(), x, y, Some(&previous))
        } else {
            Self::absolute(core.clone(), dx, dy)
        };
        event.kinematics = *kinematics;
        event
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn dx(&self) -> f32 {
        self.dx
    }

    pub fn dy(&self) -> f32 {
        self.dy
    }

    pub fn previous_x(&self) -> f32 {
        self.x - self.dx
    }

    pub fn previous_y(&self) -> f32 {
        self.y - self.dy
    }

    /// Keeps the `x` axis (or `y` when `from_x` is false).
    pub fn event1(&self, from_x: bool) -> MotionEvent1 {
        let (x, dx) = if from_x {
            (self.x, self.dx)
        } else {
            (self.y, self.dy)
        };
        MotionEvent1::reduced(&self.core, &self.kinematics, x, dx)
    }
}

impl Gesture for MotionEvent2 {
    fn core(&self) -> &EventCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EventCore {
        &mut self.core
    }

    fn is_null(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0 && !self.core.fired() && !self.core.flushed()
    }
}

impl MotionGesture for MotionEvent2 {
    const DOF: usize = 2;

    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    fn modulate(&mut self, sensitivities: &[f32]) {
        if self.is_absolute() && sensitivities.len() >= Self::DOF {
            self.dx *= sensitivities[0];
            self.dy *= sensitivities[1];
        }
    }
}

/// Three-axis motion.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionEvent3 {
    core: EventCore,
    kinematics: Kinematics,
    position: [f32; 3],
    delta: [f32; 3],
}

impl MotionEvent3 {
    pub fn absolute(core: EventCore, delta: [f32; 3]) -> Self {
        Self {
            core,
            kinematics: Kinematics::default(),
            position: [0.0; 3],
            delta,
        }
    }

    pub fn relative(core: EventCore, position: [f32; 3], previous: Option<&MotionEvent3>) -> Self {
        let mut event = Self {
            core,
            kinematics: Kinematics::unmeasured(),
            position,
            delta: [0.0; 3],
        };
        if let Some(previous) = same_gesture(&event.core, previous) {
            event.delta = std::array::from_fn(|i| position[i] - previous.position[i]);
            let distance = distance3(previous.position, position);
            event.kinematics = Kinematics::between(&event.core, &previous.core, distance);
        }
        event
    }

    fn reduced(core: &EventCore, kinematics: &Kinematics, position: [f32; 3], delta: [f32; 3]) -> Self {
        let mut event = if kinematics.is_relative() {
            let origin = std::array::from_fn(|i| position[i] - delta[i]);
            let previous = Self::relative(core.clone(), origin, None);
            Self::relative(core.clone(), position, Some(&previous))
        } else {
            Self::absolute(core.clone(), delta)
        };
        event.kinematics = *kinematics;
        event
    }

    pub fn x(&self) -> f32 {
        self.position[0]
    }

    pub fn y(&self) -> f32 {
        self.position[1]
    }

    pub fn z(&self) -> f32 {
        self.position[2]
    }

    pub fn dx(&self) -> f32 {
        self.delta[0]
    }

    pub fn dy(&self) -> f32 {
        self.delta[1]
    }

    pub fn dz(&self) -> f32 {
        self.delta[2]
    }

    pub fn previous_x(&self) -> f32 {
        self.x() - self.dx()
    }

    pub fn previous_y(&self) -> f32 {
        self.y() - self.dy()
    }

    pub fn previous_z(&self) -> f32 {
        self.z() - self.dz()
    }

    /// Drops the `z` axis.
    pub fn event2(&self) -> MotionEvent2 {
        MotionEvent2::reduced(
            &self.core,
            &self.kinematics,
            [self.position[0], self.position[1]],
            [self.delta[0], self.delta[1]],
        )
    }

    pub fn event1(&self, from_x: bool) -> MotionEvent1 {
        self.event2().event1(from_x)
    }
}

impl Gesture for MotionEvent3 {
    fn core(&self) -> &EventCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EventCore {
        &mut self.core
    }

    fn is_null(&self) -> bool {
        self.delta.iter().all(|d| *d == 0.0) && !self.core.fired() && !self.core.flushed()
    }
}

impl MotionGesture for MotionEvent3 {
    const DOF: usize = 3;

    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    fn modulate(&mut self, sensitivities: &[f32]) {
        if self.is_absolute() && sensitivities.len() >= Self::DOF {
            for (d, s) in self.delta.iter_mut().zip(sensitivities) {
                *d *= s;
            }
        }
    }
}

/// Six-axis motion: translation `(x, y, z)` and rotation `(rx, ry, rz)`.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionEvent6 {
    core: EventCore,
    kinematics: Kinematics,
    translation: [f32; 3],
    rotation: [f32; 3],
    d_translation: [f32; 3],
    d_rotation: [f32; 3],
}

impl MotionEvent6 {
    pub fn absolute(core: EventCore, d_translation: [f32; 3], d_rotation: [f32; 3]) -> Self {
        Self {
            core,
            kinematics: Kinematics::default(),
            translation: [0.0; 3],
            rotation: [0.0; 3],
            d_translation,
            d_rotation,
        }
    }

    pub fn relative(
        core: EventCore,
        translation: [f32; 3],
        rotation: [f32; 3],
        previous: Option<&MotionEvent6>,
    ) -> Self {
        let mut event = Self {
            core,
            kinematics: Kinematics::unmeasured(),
            translation,
            rotation,
            d_translation: [0.0; 3],
            d_rotation: [0.0; 3],
        };
        if let Some(previous) = same_gesture(&event.core, previous) {
            event.d_translation = std::array::from_fn(|i| translation[i] - previous.translation[i]);
            event.d_rotation = std::array::from_fn(|i| rotation[i] - previous.rotation[i]);
            let distance = distance6(previous.pose(), event.pose());
            event.kinematics = Kinematics::between(&event.core, &previous.core, distance);
        }
        event
    }

    fn pose(&self) -> [f32; 6] {
        let [x, y, z] = self.translation;
        let [rx, ry, rz] = self.rotation;
        [x, y, z, rx, ry, rz]
    }

    pub fn x(&self) -> f32 {
        self.translation[0]
    }

    pub fn y(&self) -> f32 {
        self.translation[1]
    }

    pub fn z(&self) -> f32 {
        self.translation[2]
    }

    pub fn dx(&self) -> f32 {
        self.d_translation[0]
    }

    pub fn dy(&self) -> f32 {
        self.d_translation[1]
    }

    pub fn dz(&self) -> f32 {
        self.d_translation[2]
    }

    pub fn rx(&self) -> f32 {
        self.rotation[0]
    }

    pub fn ry(&self) -> f32 {
        self.rotation[1]
    }

    pub fn rz(&self) -> f32 {
        self.rotation[2]
    }

    pub fn drx(&self) -> f32 {
        self.d_rotation[0]
    }

    pub fn dry(&self) -> f32 {
        self.d_rotation[1]
    }

    pub fn drz(&self) -> f32 {
        self.d_rotation[2]
    }

    pub fn roll(&self) -> f32 {
        self.rx()
    }

    pub fn pitch(&self) -> f32 {
        self.ry()
    }

    pub fn yaw(&self) -> f32 {
        self.rz()
    }

    pub fn previous_x(&self) -> f32 {
        self.x() - self.dx()
    }

    pub fn previous_y(&self) -> f32 {
        self.y() - self.dy()
    }

    pub fn previous_z(&self) -> f32 {
        self.z() - self.dz()
    }

    pub fn previous_rx(&self) -> f32 {
        self.rx() - self.drx()
    }

    pub fn previous_ry(&self) -> f32 {
        self.ry() - self.dry()
    }

    pub fn previous_rz(&self) -> f32 {
        self.rz() - self.drz()
    }

    /// Keeps the translation triple (or the rotation triple when
    /// `from_translation` is false).
    pub fn event3(&self, from_translation: bool) -> MotionEvent3 {
        let (position, delta) = if from_translation {
            (self.translation, self.d_translation)
        } else {
            (self.rotation, self.d_rotation)
        };
        MotionEvent3::reduced(&self.core, &self.kinematics, position, delta)
    }

    pub fn event2(&self, from_translation: bool) -> MotionEvent2 {
        self.event3(from_translation).event2()
    }

    /// Keeps `x` when `from_x` is true, otherwise the rotation triple's second
    /// axis `ry`. The flag selects the triple and the axis together.
    pub fn event1(&self, from_x: bool) -> MotionEvent1 {
        self.event3(from_x).event2().event1(from_x)
    }
}

impl Gesture for MotionEvent6 {
    fn core(&self) -> &EventCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EventCore {
        &mut self.core
    }

    fn is_null(&self) -> bool {
        self.d_translation.iter().chain(&self.d_rotation).all(|d| *d == 0.0)
            && !self.core.fired()
            && !self.core.flushed()
    }
}

impl MotionGesture for MotionEvent6 {
    const DOF: usize = 6;

    fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    fn modulate(&mut self, sensitivities: &[f32]) {
        if self.is_absolute() && sensitivities.len() >= Self::DOF {
            for (d, s) in self.d_translation.iter_mut().zip(&sensitivities[..3]) {
                *d *= s;
            }
            for (d, s) in self.d_rotation.iter_mut().zip(&sensitivities[3..6]) {
                *d *= s;
            }
        }
    }
}

impl Event {
    /// Timing bookkeeping of motion events; `None` for keys and taps.
    pub fn kinematics(&self) -> Option<&Kinematics> {
        match self {
            Event::Motion1(e) => Some(e.kinematics()),
            Event::Motion2(e) => Some(e.kinematics()),
            Event::Motion3(e) => Some(e.kinematics()),
            Event::Motion6(e) => Some(e.kinematics()),
            Event::Key(_) | Event::Tap(_) => None,
        }
    }

    pub fn is_relative(&self) -> bool {
        self.kinematics().is_some_and(Kinematics::is_relative)
    }

    /// Scales the deltas of an absolute motion event; see [`MotionGesture::modulate`].
    pub fn modulate(&mut self, sensitivities: &[f32]) {
        match self {
            Event::Motion1(e) => e.modulate(sensitivities),
            Event::Motion2(e) => e.modulate(sensitivities),
            Event::Motion3(e) => e.modulate(sensitivities),
            Event::Motion6(e) => e.modulate(sensitivities),
            Event::Key(_) | Event::Tap(_) => {}
        }
    }

    /// Reduces any motion event to one axis.
    ///
    /// `from_x` keeps `x` or `y` for 2- and 3-axis events. For 6-axis events it
    /// also picks the triple: `true` keeps `x`, `false` keeps `ry`.
    pub fn to_motion1(&self, from_x: bool) -> Option<MotionEvent1> {
        match self {
            Event::Motion1(e) => Some(e.clone()),
            Event::Motion2(e) => Some(e.event1(from_x)),
            Event::Motion3(e) => Some(e.event1(from_x)),
            Event::Motion6(e) => Some(e.event1(from_x)),
            Event::Key(_) | Event::Tap(_) => None,
        }
    }

    /// Reduces a 2-, 3- or 6-axis event to two axes.
    pub fn to_motion2(&self, from_x: bool) -> Option<MotionEvent2> {
        match self {
            Event::Motion2(e) => Some(e.clone()),
            Event::Motion3(e) => Some(e.event2()),
            Event::Motion6(e) => Some(e.event2(from_x)),
            _ => None,
        }
    }

    /// Reduces a 3- or 6-axis event to three axes.
    pub fn to_motion3(&self, from_translation: bool) -> Option<MotionEvent3> {
        match self {
            Event::Motion3(e) => Some(e.clone()),
            Event::Motion6(e) => Some(e.event3(from_translation)),
            _ => None,
        }
    }

    pub fn to_motion6(&self) -> Option<MotionEvent6> {
        match self {
            Event::Motion6(e) => Some(e.clone()),
            _ => None,
        }
    }
}
