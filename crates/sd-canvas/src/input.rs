//! Thread-safe capture of pointer and keyboard state.
//!
//! The host delivers [`InputEvent`]s (device pixel coordinates) through an
//! [`EventSender`]. A dedicated delivery thread drains that channel into two
//! independently locked state groups:
//!
//! - **pointer**: position (user coordinates) and button state, always
//!   updated together so a reader never sees a new X with a stale Y;
//! - **keyboard**: FIFO queue of typed characters and the set of held keys.
//!
//! The client thread only reads. Typed characters are consumed by
//! [`InputCapture::next_key_typed`]; every other query is non-consuming.
//!
//! Device → user conversion uses a by-value copy of the client's
//! [`CoordinateMapper`], republished through [`InputCapture::set_mapping`]
//! whenever the viewport changes.

use sd_core::{CoordinateMapper, DrawError};
use std::collections::{HashSet, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

/// Platform key code, as reported by the host's key-pressed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const ENTER: Self = Self(10);
    pub const ESCAPE: Self = Self(27);
    pub const SPACE: Self = Self(32);
    pub const LEFT: Self = Self(37);
    pub const UP: Self = Self(38);
    pub const RIGHT: Self = Self(39);
    pub const DOWN: Self = Self(40);

    /// Code of an ASCII letter or digit key (`'a'` and `'A'` share a code).
    pub fn from_ascii(c: char) -> Option<Self> {
        c.is_ascii_alphanumeric()
            .then(|| Self(u32::from(c.to_ascii_uppercase())))
    }
}

/// A raw event from the host's event source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved or dragged to device pixel `(x, y)`.
    PointerMove { x: f64, y: f64 },
    /// Button pressed at device pixel `(x, y)`.
    PointerDown { x: f64, y: f64 },
    /// Button released. Position is left as last reported.
    PointerUp,
    /// A character was typed.
    KeyTyped(char),
    KeyDown(KeyCode),
    KeyUp(KeyCode),
}

/// Cloneable handle the host's event thread uses to deliver events.
#[derive(Debug, Clone)]
pub struct EventSender(Sender<InputEvent>);

impl EventSender {
    /// Queue an event for delivery. Returns `false` once the delivery thread
    /// has shut down.
    pub fn send(&self, event: InputEvent) -> bool {
        self.0.send(event).is_ok()
    }
}

// ─── State groups ────────────────────────────────────────────────────────

#[derive(Debug)]
struct PointerState {
    mapper: CoordinateMapper,
    x: f64,
    y: f64,
    pressed: bool,
}

#[derive(Debug, Default)]
struct KeyboardState {
    typed: VecDeque<char>,
    held: HashSet<KeyCode>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // State stays consistent even if a holder panicked: every update is a
    // single assignment or collection op.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct InputCapture {
    pointer: Mutex<PointerState>,
    keyboard: Mutex<KeyboardState>,
}

impl InputCapture {
    pub fn new(mapper: CoordinateMapper) -> Self {
        Self {
            pointer: Mutex::new(PointerState {
                mapper,
                x: 0.0,
                y: 0.0,
                pressed: false,
            }),
            keyboard: Mutex::new(KeyboardState::default()),
        }
    }

    /// Publish the client's current viewport for converting later events.
    pub fn set_mapping(&self, mapper: CoordinateMapper) {
        lock(&self.pointer).mapper = mapper;
    }

    /// Fold one event into the captured state.
    pub fn apply(&self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => {
                let mut p = lock(&self.pointer);
                p.x = p.mapper.to_user_x(x);
                p.y = p.mapper.to_user_y(y);
            }
            InputEvent::PointerDown { x, y } => {
                let mut p = lock(&self.pointer);
                p.x = p.mapper.to_user_x(x);
                p.y = p.mapper.to_user_y(y);
                p.pressed = true;
            }
            InputEvent::PointerUp => lock(&self.pointer).pressed = false,
            InputEvent::KeyTyped(c) => lock(&self.keyboard).typed.push_back(c),
            InputEvent::KeyDown(code) => {
                lock(&self.keyboard).held.insert(code);
            }
            InputEvent::KeyUp(code) => {
                lock(&self.keyboard).held.remove(&code);
            }
        }
    }

    /// Start the event-delivery thread and return the sender the host feeds.
    ///
    /// The thread exits once every clone of the sender has been dropped.
    pub fn spawn_delivery(self: &Arc<Self>) -> Result<(EventSender, JoinHandle<()>), DrawError> {
        let (tx, rx) = mpsc::channel();
        let capture = Arc::clone(self);
        let handle = std::thread::Builder::new()
            .name("sd-input".into())
            .spawn(move || capture.deliver(rx))?;
        log::debug!("input delivery thread started");
        Ok((EventSender(tx), handle))
    }

    fn deliver(&self, rx: Receiver<InputEvent>) {
        for event in rx {
            log::trace!("input {event:?}");
            self.apply(event);
        }
        log::debug!("input delivery thread stopped");
    }

    // ─── Pointer queries ─────────────────────────────────────────────────

    pub fn mouse_pressed(&self) -> bool {
        lock(&self.pointer).pressed
    }

    pub fn mouse_x(&self) -> f64 {
        lock(&self.pointer).x
    }

    pub fn mouse_y(&self) -> f64 {
        lock(&self.pointer).y
    }

    /// X and Y read under one lock.
    pub fn mouse_position(&self) -> (f64, f64) {
        let p = lock(&self.pointer);
        (p.x, p.y)
    }

    // ─── Keyboard queries ────────────────────────────────────────────────

    pub fn has_next_key_typed(&self) -> bool {
        !lock(&self.keyboard).typed.is_empty()
    }

    /// Remove and return the oldest typed character.
    ///
    /// Fails with [`DrawError::EmptyQueue`] when nothing is pending; check
    /// [`has_next_key_typed`](Self::has_next_key_typed) first.
    pub fn next_key_typed(&self) -> Result<char, DrawError> {
        lock(&self.keyboard)
            .typed
            .pop_front()
            .ok_or(DrawError::EmptyQueue)
    }

    pub fn is_key_pressed(&self, code: KeyCode) -> bool {
        lock(&self.keyboard).held.contains(&code)
    }
}
