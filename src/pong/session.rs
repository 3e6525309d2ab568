//! Session phase and the overlay cell shared with timers
//!
//! Timer tasks never touch entities. They write the overlay message or post
//! a request into [`SharedStatus`]; the loop thread takes requests on its
//! next input phase. Every write is tagged with the generation it was
//! scheduled under, so timers from a superseded countdown, or from a game
//! that has shut down, fall silent.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Phase of a Pong session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    WelcomeScreen,
    CountingDown,
    Playing,
    GameOver,
}

/// Requests timers post for the loop thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRequest {
    /// The countdown finished: reset the field and start playing
    BeginPlay,
}

#[derive(Debug, Default)]
struct StatusCell {
    message: Option<String>,
    generation: u64,
    request: Option<SessionRequest>,
    shut_down: bool,
}

/// Overlay message plus pending request, shared between the loop thread and
/// timer tasks
#[derive(Debug, Clone, Default)]
pub struct SharedStatus {
    cell: Arc<Mutex<StatusCell>>,
}

impl SharedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StatusCell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn message(&self) -> Option<String> {
        self.lock().message.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Invalidate every outstanding timer and drop any pending request.
    /// Returns the new generation for timers scheduled from now on.
    pub fn next_generation(&self) -> u64 {
        let mut cell = self.lock();
        cell.generation += 1;
        cell.request = None;
        cell.generation
    }

    /// Set the message from the loop thread
    pub fn set_message(&self, message: Option<&str>) {
        self.lock().message = message.map(str::to_owned);
    }

    /// Set the message from a timer. Returns false, writing nothing, when
    /// the timer's generation is stale.
    pub fn set_message_if_current(&self, generation: u64, message: Option<&str>) -> bool {
        let mut cell = self.lock();
        if cell.shut_down || cell.generation != generation {
            return false;
        }
        cell.message = message.map(str::to_owned);
        true
    }

    /// Post a request from a timer, subject to the same generation check
    pub fn post_if_current(&self, generation: u64, request: SessionRequest) -> bool {
        let mut cell = self.lock();
        if cell.shut_down || cell.generation != generation {
            return false;
        }
        cell.request = Some(request);
        true
    }

    /// Take the pending request, if any
    pub fn take_request(&self) -> Option<SessionRequest> {
        self.lock().request.take()
    }

    /// Silence all timers for good
    pub fn shut_down(&self) {
        let mut cell = self.lock();
        cell.shut_down = true;
        cell.request = None;
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().shut_down
    }
}
