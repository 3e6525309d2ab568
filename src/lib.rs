//! Arcade Pong - a small real-time 2D engine with a Pong game on top
//!
//! Core modules:
//! - `geometry`: integer points and rectangles
//! - `entity`: moving, sized objects with bounce and collision
//! - `world`: entity arena owned by the loop
//! - `engine`: the game loop and the `Game` hook trait
//! - `input`: input events and the cross-thread queue
//! - `render`: render adapter contract
//! - `timer`: delayed and periodic tasks
//! - `pong`: Pong rules, session phases, and configuration

pub mod engine;
pub mod entity;
pub mod geometry;
pub mod input;
pub mod pong;
pub mod render;
pub mod timer;
pub mod world;

pub use engine::{Game, GameLoop, LoopConfig, LoopHandle, LoopState};
pub use entity::{Appearance, Entity, Rgb};
pub use geometry::{Point, Rectangle};
pub use input::{InputEvent, InputQueue, Key, MouseButton};
pub use pong::{ConfigError, PongConfig, PongGame, SessionState};
pub use render::{Frame, FrameStats, LogRenderer, Renderer};
pub use timer::{ManualScheduler, Scheduler, TaskControl, ThreadScheduler, TimerHandle};
pub use world::{EntityId, World};

/// Game configuration constants
pub mod consts {
    /// Motion speeds are pixels per frame at 60 fps; elapsed milliseconds are
    /// divided by this before scaling
    pub const MOTION_TIME_SCALE: f32 = 60.0 / 1000.0;
    /// Minimum sleep between loop iterations
    pub const MIN_YIELD_MS: u64 = 1;

    /// Play field
    pub const FIELD_WIDTH: i32 = 800;
    pub const FIELD_HEIGHT: i32 = 600;

    /// Paddles
    pub const PADDLE_WIDTH: i32 = 15;
    pub const PADDLE_HEIGHT: i32 = 70;
    pub const PADDLE_MARGIN: i32 = 20;
    pub const PLAYER_NAME: &str = "PLAYER";
    pub const COMPUTER_NAME: &str = "COMPUTER";

    /// Balls
    pub const BALL_WIDTH: i32 = 25;
    pub const BALL_HEIGHT: i32 = 25;
    pub const BALL_MIN_SPEED: u32 = 1;
    pub const BALL_MAX_SPEED: u32 = 5;
    /// Keeps spawned balls off near-horizontal and near-vertical paths
    pub const AXIS_CLEARANCE_DEG: f32 = 5.0;

    /// Session timing
    pub const COUNTDOWN_FROM: u32 = 3;
    pub const COUNTDOWN_INTERVAL_MS: u64 = 1500;
    pub const RESTART_PROMPT_DELAY_MS: u64 = 2500;

    /// Overlay text
    pub const MESSAGE_WELCOME: &str = "<ENTER> to START";
    pub const MESSAGE_GAME_OVER: &str = "GAME OVER";
    pub const MESSAGE_RESTART: &str = "<r> to RESTART";
}
