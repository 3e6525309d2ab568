//! Render adapter contract
//!
//! The loop hands a read-only [`Frame`] to a [`Renderer`] once per iteration.
//! Drawing primitives belong to the host; the crate ships a log-only renderer
//! for headless runs.

use crate::entity::Entity;
use crate::world::{EntityId, World};

/// Overlay statistics for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Milliseconds since the previous frame
    pub interval_ms: i64,
    /// Frames drawn so far, this one included
    pub frames: u64,
    /// Live entities
    pub entities: usize,
}

/// Everything a renderer may look at for one frame
pub struct Frame<'a> {
    pub world: &'a World,
    pub message: Option<&'a str>,
    pub stats: FrameStats,
}

impl<'a> Frame<'a> {
    /// Entities that carry an appearance
    pub fn drawables(&self) -> impl Iterator<Item = (EntityId, &'a Entity)> {
        self.world.iter().filter(|(_, entity)| entity.is_drawable())
    }
}

/// Draws frames. Must not mutate game state, and should not block the loop
/// waiting for the frame to reach the screen.
pub trait Renderer {
    fn draw_frame(&mut self, frame: &Frame<'_>);
}

/// Headless renderer that reports overlay changes through `log`
#[derive(Debug, Default)]
pub struct LogRenderer {
    last_message: Option<String>,
    /// Emit a statistics line every this many frames (0 = never)
    stats_every: u64,
}

impl LogRenderer {
    pub fn new(stats_every: u64) -> Self {
        Self {
            last_message: None,
            stats_every,
        }
    }
}

impl Renderer for LogRenderer {
    fn draw_frame(&mut self, frame: &Frame<'_>) {
        if frame.message != self.last_message.as_deref() {
            match frame.message {
                Some(message) => log::info!("overlay: {message}"),
                None => log::info!("overlay cleared"),
            }
            self.last_message = frame.message.map(str::to_owned);
        }

        if self.stats_every > 0 && frame.stats.frames % self.stats_every == 0 {
            log::debug!(
                "Statistics: (interval {}ms, frames: {}, sprites: {})",
                frame.stats.interval_ms,
                frame.stats.frames,
                frame.stats.entities
            );
            for (id, entity) in frame.drawables() {
                log::trace!(
                    "  #{} {} {}",
                    id.raw(),
                    entity.name().unwrap_or("ball"),
                    entity.bounding_rect()
                );
            }
        }
    }
}
