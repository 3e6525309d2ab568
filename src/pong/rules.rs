//! Pong rules engine
//!
//! Welcome → CountingDown → Playing → GameOver, and back to CountingDown on
//! restart. The player defends the left wall with the mouse; the computer
//! paddle on the right tracks whichever ball reaches it and never misses.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::config::{ConfigError, PongConfig};
use super::session::{SessionRequest, SessionState, SharedStatus};
use crate::consts::*;
use crate::engine::Game;
use crate::entity::{Appearance, Entity, Rgb};
use crate::geometry::Rectangle;
use crate::input::{InputEvent, Key, MouseButton};
use crate::timer::{Scheduler, TaskControl, TimerHandle};
use crate::world::{EntityId, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Paddles {
    player: EntityId,
    computer: EntityId,
}

/// True when `angle` (degrees, non-negative) lies within `clearance` of an
/// axis
fn near_axis(angle: f32, clearance: f32) -> bool {
    let offset = angle % 90.0;
    offset < clearance || offset > 90.0 - clearance
}

pub struct PongGame {
    config: PongConfig,
    rng: Pcg32,
    state: SessionState,
    paddles: Option<Paddles>,
    status: SharedStatus,
    scheduler: Arc<dyn Scheduler>,
    timers: Vec<TimerHandle>,
}

impl PongGame {
    /// Validate the configuration and open on the welcome screen
    pub fn new(
        config: PongConfig,
        seed: u64,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let status = SharedStatus::new();
        status.set_message(Some(MESSAGE_WELCOME));
        Ok(Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            state: SessionState::WelcomeScreen,
            paddles: None,
            status,
            scheduler,
            timers: Vec::new(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &PongConfig {
        &self.config
    }

    pub fn player(&self) -> Option<EntityId> {
        self.paddles.map(|p| p.player)
    }

    pub fn computer(&self) -> Option<EntityId> {
        self.paddles.map(|p| p.computer)
    }

    /// Stop every timer this game scheduled; late firings become no-ops
    pub fn shut_down(&mut self) {
        self.status.shut_down();
        self.cancel_timers();
    }

    fn cancel_timers(&mut self) {
        for timer in self.timers.drain(..) {
            timer.cancel();
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            log::info!("Session {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn track(&mut self, timer: TimerHandle) {
        self.timers.retain(|t| !t.is_cancelled());
        self.timers.push(timer);
    }

    /// Show 3, 2, 1 at the configured interval, then ask the loop to begin
    /// play. Restarting supersedes any countdown already running.
    fn start_countdown(&mut self) {
        self.cancel_timers();
        let generation = self.status.next_generation();
        self.set_state(SessionState::CountingDown);

        let status = self.status.clone();
        let mut remaining = COUNTDOWN_FROM;
        let timer = self.scheduler.schedule_at_fixed_rate(
            std::time::Duration::ZERO,
            self.config.countdown_interval(),
            Box::new(move || {
                if remaining > 0 {
                    let text = remaining.to_string();
                    if !status.set_message_if_current(generation, Some(&text)) {
                        return TaskControl::Stop;
                    }
                    remaining -= 1;
                    TaskControl::Continue
                } else {
                    status.post_if_current(generation, SessionRequest::BeginPlay);
                    TaskControl::Stop
                }
            }),
        );
        self.track(timer);
    }

    /// Fresh field: two paddles and one ball
    fn begin_play(&mut self, world: &mut World) {
        self.status.set_message(None);
        world.clear();
        self.initialize(world);
        self.set_state(SessionState::Playing);
    }

    fn enter_game_over(&mut self) {
        self.cancel_timers();
        let generation = self.status.next_generation();
        self.set_state(SessionState::GameOver);
        self.status.set_message(Some(MESSAGE_GAME_OVER));

        let status = self.status.clone();
        let timer = self.scheduler.schedule_once(
            self.config.restart_prompt_delay(),
            Box::new(move || {
                status.set_message_if_current(generation, Some(MESSAGE_RESTART));
            }),
        );
        self.track(timer);
    }

    fn paddle(&self, x: i32, color: Rgb, name: &str) -> Entity {
        Entity::new(
            x,
            self.config.field_height / 2,
            self.config.paddle_width,
            self.config.paddle_height,
        )
        .with_motion(0.0, 1.0)
        .with_name(name)
        .with_appearance(Appearance { color })
    }

    /// A ball at mid-field with random speed, heading, height, and colour
    pub fn new_ball(&mut self) -> Entity {
        let speed = self
            .rng
            .random_range(self.config.min_ball_speed..=self.config.max_ball_speed);
        let angle = loop {
            let angle = self.rng.random_range(0..360) as f32;
            if !near_axis(angle, self.config.axis_clearance_deg) {
                break angle;
            }
        };
        let y = self.rng.random_range(self.config.ball_y_range());
        let color = Rgb::new(self.rng.random(), self.rng.random(), self.rng.random());

        Entity::new(
            self.config.field_width / 2 - self.config.ball_width / 2,
            y,
            self.config.ball_width,
            self.config.ball_height,
        )
        .with_motion(angle, speed as f32)
        .with_appearance(Appearance { color })
    }

    fn spawn_ball(&mut self, world: &mut World) -> EntityId {
        let ball = self.new_ball();
        log::debug!(
            "Ball spawned at {} angle {} speed {}",
            ball.position(),
            ball.angle(),
            ball.speed()
        );
        world.spawn(ball)
    }

    fn move_player(&self, y: i32, world: &mut World) {
        let Some(paddles) = self.paddles else {
            return;
        };
        if let Some(player) = world.get_mut(paddles.player) {
            let x = player.x();
            player.move_to(x, self.config.clamp_paddle_y(y));
        }
    }

    fn on_key(&mut self, key: Key, world: &mut World) {
        match key {
            Key::Char('r') | Key::Char('R') => {
                if matches!(
                    self.state,
                    SessionState::CountingDown | SessionState::GameOver
                ) {
                    self.start_countdown();
                }
            }
            Key::Space => {
                if self.state == SessionState::Playing {
                    self.spawn_ball(world);
                }
            }
            Key::Enter => {
                if self.state == SessionState::WelcomeScreen {
                    self.start_countdown();
                }
            }
            _ => {}
        }
    }

    /// Move one ball and apply walls and paddles to it
    fn update_ball(&mut self, id: EntityId, world: &mut World, elapsed_ms: i64) {
        let field_height = self.config.field_height;
        let half_bar = self.config.paddle_width / 2;

        let player: Option<(i32, Rectangle)> = self
            .paddles
            .and_then(|p| world.get(p.player))
            .map(|e| (e.x(), e.bounding_rect()));
        let computer_x = self.paddles.and_then(|p| world.get(p.computer)).map(|e| e.x());

        let Some(ball) = world.get_mut(id) else {
            return;
        };
        ball.advance(elapsed_ms);

        let half_h = ball.height() / 2;
        let half_w = ball.width() / 2;
        let heading = ball.heading();
        let hits_top = ball.y() - half_h <= 0 && heading.y < 0.0;
        let hits_bottom = ball.y() + half_h + 1 >= field_height && heading.y > 0.0;
        if hits_top || hits_bottom {
            ball.bounce_y();
        }

        if self.state == SessionState::Playing {
            if let Some((player_x, player_rect)) = player {
                let reached = player_x + half_bar >= ball.x() - half_w;
                if reached && ball.heading().x < 0.0 {
                    if ball.bounding_rect().intersects(&player_rect) {
                        ball.bounce_x();
                    } else {
                        log::debug!("Ball missed the player at {}", ball.position());
                        world.remove(id);
                        self.enter_game_over();
                        return;
                    }
                }
            }
        }

        if let Some(computer_x) = computer_x {
            let reached = computer_x - half_bar <= ball.x() + half_w;
            if reached && ball.heading().x > 0.0 {
                ball.bounce_x();
                let target_y = self.config.clamp_paddle_y(ball.y());
                if let Some(computer) = self.paddles.and_then(|p| world.get_mut(p.computer)) {
                    computer.move_to(computer_x, target_y);
                }
            }
        }
    }
}

impl Drop for PongGame {
    fn drop(&mut self) {
        self.shut_down();
    }
}

impl Game for PongGame {
    fn initialize(&mut self, world: &mut World) {
        let player = self.paddle(self.config.player_x(), Rgb::GREEN, PLAYER_NAME);
        let computer = self.paddle(self.config.computer_x(), Rgb::BLUE, COMPUTER_NAME);
        self.paddles = Some(Paddles {
            player: world.spawn(player),
            computer: world.spawn(computer),
        });
        self.spawn_ball(world);
    }

    fn handle_input(&mut self, events: &[InputEvent], _elapsed_ms: i64, world: &mut World) {
        if let Some(SessionRequest::BeginPlay) = self.status.take_request() {
            self.begin_play(world);
        }

        for event in events {
            match *event {
                InputEvent::KeyPress(key) => self.on_key(key, world),
                InputEvent::MouseMove { y, .. } => {
                    if self.state == SessionState::Playing {
                        self.move_player(y, world);
                    }
                }
                InputEvent::MouseClick { y, button, .. } => {
                    if self.state == SessionState::Playing {
                        self.move_player(y, world);
                        if button == MouseButton::Primary {
                            self.spawn_ball(world);
                        }
                    }
                }
            }
        }
    }

    fn update_entity(&mut self, id: EntityId, world: &mut World, elapsed_ms: i64) -> bool {
        // Paddles only move on input or tracking; balls run the full rules
        let is_ball = world.get(id).is_some_and(|e| e.name().is_none());
        if is_ball {
            self.update_ball(id, world, elapsed_ms);
        }
        true
    }

    fn message(&self) -> Option<String> {
        self.status.message()
    }
}
