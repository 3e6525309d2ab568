//! Fixed game loop driver
//!
//! One iteration: drain input, let the game react, update every entity,
//! draw, yield. The loop owns the [`World`]; games only see it through the
//! hooks of the [`Game`] trait, always on the loop thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::consts::MIN_YIELD_MS;
use crate::input::{InputEvent, InputQueue};
use crate::render::{Frame, FrameStats, Renderer};
use crate::world::{EntityId, World};

/// Game-specific behaviour plugged into the loop
pub trait Game {
    /// Populate the world. Called once when the loop is built.
    fn initialize(&mut self, world: &mut World);

    /// React to this iteration's input batch, oldest event first
    fn handle_input(&mut self, events: &[InputEvent], elapsed_ms: i64, world: &mut World);

    /// Custom position update for one entity. Return false to let the loop
    /// apply the entity's own motion instead.
    fn update_entity(&mut self, id: EntityId, world: &mut World, elapsed_ms: i64) -> bool;

    /// Overlay text for the current frame
    fn message(&self) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Sleep after each iteration; never less than 1 ms
    pub yield_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            yield_interval: Duration::from_millis(MIN_YIELD_MS),
        }
    }
}

/// Stopped or running, shared with [`LoopHandle`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Cross-thread control of a running loop
#[derive(Debug, Clone)]
pub struct LoopHandle {
    running: Arc<AtomicBool>,
}

impl LoopHandle {
    /// Ask the loop to stop; `start` returns after the current iteration
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn state(&self) -> LoopState {
        if self.running.load(Ordering::SeqCst) {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }
}

pub struct GameLoop<G: Game, R: Renderer> {
    game: G,
    renderer: R,
    world: World,
    input: InputQueue,
    running: Arc<AtomicBool>,
    yield_interval: Duration,
    frames: u64,
}

impl<G: Game, R: Renderer> GameLoop<G, R> {
    pub fn new(mut game: G, renderer: R, config: LoopConfig) -> Self {
        let mut world = World::new();
        game.initialize(&mut world);
        world.flush();

        Self {
            game,
            renderer,
            world,
            input: InputQueue::new(),
            running: Arc::new(AtomicBool::new(false)),
            yield_interval: config
                .yield_interval
                .max(Duration::from_millis(MIN_YIELD_MS)),
            frames: 0,
        }
    }

    /// Queue that host input callbacks push into
    pub fn input(&self) -> InputQueue {
        self.input.clone()
    }

    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            running: self.running.clone(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.handle().state()
    }

    pub fn stop(&self) {
        self.handle().stop();
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run until stopped. Returns immediately if already running.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        log::info!("Game loop started");

        let mut last = Instant::now();
        while self.running.load(Ordering::SeqCst) {
            let now = Instant::now();
            let elapsed_ms = now.duration_since(last).as_millis() as i64;
            self.step(elapsed_ms);
            thread::sleep(self.yield_interval);
            last = now;
        }

        log::info!("Game loop stopped after {} frames", self.frames);
    }

    /// One iteration with an explicit elapsed time
    pub fn step(&mut self, elapsed_ms: i64) {
        let events = self.input.drain();
        self.game.handle_input(&events, elapsed_ms, &mut self.world);

        // Walk a snapshot: hooks may add, remove, or clear entities
        for id in self.world.ids() {
            if !self.world.contains(id) {
                continue;
            }
            if !self.game.update_entity(id, &mut self.world, elapsed_ms) {
                if let Some(entity) = self.world.get_mut(id) {
                    entity.advance(elapsed_ms);
                }
            }
        }
        self.world.flush();

        self.frames += 1;
        let message = self.game.message();
        let frame = Frame {
            world: &self.world,
            message: message.as_deref(),
            stats: FrameStats {
                interval_ms: elapsed_ms,
                frames: self.frames,
                entities: self.world.len(),
            },
        };
        self.renderer.draw_frame(&frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::input::Key;

    /// Moves named entities itself, leaves the rest to the loop
    #[derive(Default)]
    struct Probe {
        seen_batches: Vec<Vec<InputEvent>>,
        custom_updates: usize,
        spawn_on_update: bool,
    }

    impl Game for Probe {
        fn initialize(&mut self, world: &mut World) {
            world.spawn(Entity::new(0, 0, 2, 2).with_motion(0.0, 1000.0));
            world.spawn(Entity::new(50, 50, 2, 2).with_name("fixed"));
        }

        fn handle_input(&mut self, events: &[InputEvent], _elapsed_ms: i64, _world: &mut World) {
            self.seen_batches.push(events.to_vec());
        }

        fn update_entity(&mut self, id: EntityId, world: &mut World, _elapsed_ms: i64) -> bool {
            let named = world.get(id).and_then(|e| e.name()).is_some();
            if named {
                self.custom_updates += 1;
                if self.spawn_on_update {
                    world.remove(id);
                    world.spawn(Entity::new(99, 99, 1, 1));
                }
            }
            named
        }

        fn message(&self) -> Option<String> {
            Some(format!("updates {}", self.custom_updates))
        }
    }

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(Option<String>, FrameStats)>,
    }

    impl Renderer for Recorder {
        fn draw_frame(&mut self, frame: &Frame<'_>) {
            self.frames
                .push((frame.message.map(str::to_owned), frame.stats));
        }
    }

    #[test]
    fn test_step_moves_unhandled_entities_only() {
        let mut game_loop = GameLoop::new(Probe::default(), Recorder::default(), LoopConfig::default());
        game_loop.step(60);

        let positions: Vec<_> = game_loop.world().iter().map(|(_, e)| e.position()).collect();
        // speed 1000 over 60 ms moves one pixel
        assert!(positions.contains(&crate::geometry::Point::new(1, 0)));
        assert!(positions.contains(&crate::geometry::Point::new(50, 50)));
        assert_eq!(game_loop.game().custom_updates, 1);
    }

    #[test]
    fn test_step_drains_input_once() {
        let mut game_loop = GameLoop::new(Probe::default(), Recorder::default(), LoopConfig::default());
        let input = game_loop.input();
        input.push(InputEvent::KeyPress(Key::Enter));
        input.push(InputEvent::MouseMove { x: 3, y: 4 });

        game_loop.step(1);
        game_loop.step(1);

        let batches = &game_loop.game().seen_batches;
        assert_eq!(batches.len(), 2);
        assert_eq!(
            batches[0],
            vec![
                InputEvent::KeyPress(Key::Enter),
                InputEvent::MouseMove { x: 3, y: 4 }
            ]
        );
        assert!(batches[1].is_empty());
    }

    #[test]
    fn test_step_renders_stats_and_message() {
        let mut game_loop = GameLoop::new(Probe::default(), Recorder::default(), LoopConfig::default());
        game_loop.step(16);
        game_loop.step(17);

        let frames = &game_loop.renderer().frames;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].0.as_deref(), Some("updates 2"));
        assert_eq!(
            frames[1].1,
            FrameStats {
                interval_ms: 17,
                frames: 2,
                entities: 2
            }
        );
    }

    #[test]
    fn test_removal_and_spawn_inside_update_hook() {
        let probe = Probe {
            spawn_on_update: true,
            ..Default::default()
        };
        let mut game_loop = GameLoop::new(probe, Recorder::default(), LoopConfig::default());
        game_loop.step(1);

        // The new entity is not visited in the pass that created it
        assert_eq!(game_loop.game().custom_updates, 1);
        assert_eq!(game_loop.world().len(), 2);
        assert!(
            game_loop
                .world()
                .iter()
                .all(|(_, e)| e.name().is_none())
        );
    }

    #[test]
    fn test_stop_from_another_thread() {
        let mut game_loop = GameLoop::new(Probe::default(), Recorder::default(), LoopConfig::default());
        let handle = game_loop.handle();
        assert_eq!(handle.state(), LoopState::Stopped);

        let stopper = thread::spawn(move || {
            while handle.state() != LoopState::Running {
                thread::sleep(Duration::from_millis(1));
            }
            thread::sleep(Duration::from_millis(20));
            handle.stop();
        });

        game_loop.start();
        stopper.join().unwrap();
        assert_eq!(game_loop.state(), LoopState::Stopped);
        assert!(game_loop.frames() > 0);
    }
}
