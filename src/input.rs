//! Discrete input events and the hand-off queue
//!
//! Host UI callbacks push from their own thread; the loop thread drains the
//! whole queue once per iteration.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A key as the host reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Space,
    Escape,
    /// Platform key code with no portable meaning
    Other(u32),
}

impl Key {
    /// Map a typed character to a key, folding control characters
    pub fn from_char(c: char) -> Self {
        match c {
            '\n' | '\r' => Key::Enter,
            ' ' => Key::Space,
            '\u{1b}' => Key::Escape,
            c => Key::Char(c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

/// One input event in field coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPress(Key),
    MouseMove { x: i32, y: i32 },
    MouseClick { x: i32, y: i32, button: MouseButton },
}

impl InputEvent {
    /// Pointer position for mouse events
    pub fn pointer(&self) -> Option<(i32, i32)> {
        match *self {
            InputEvent::MouseMove { x, y } | InputEvent::MouseClick { x, y, .. } => Some((x, y)),
            InputEvent::KeyPress(_) => None,
        }
    }
}

/// Thread-safe FIFO of pending input. Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: Arc<Mutex<VecDeque<InputEvent>>>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<InputEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, event: InputEvent) {
        self.lock().push_back(event);
    }

    /// Take everything queued so far, oldest first. Events pushed after the
    /// call wait for the next drain.
    pub fn drain(&self) -> Vec<InputEvent> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
