//! Pong on top of the generic loop
//!
//! - `config`: field, paddle, and ball dimensions plus timing
//! - `session`: phase enum and the overlay cell timers write into
//! - `rules`: the [`Game`](crate::engine::Game) implementation

pub mod config;
pub mod rules;
pub mod session;

pub use config::{ConfigError, PongConfig};
pub use rules::PongGame;
pub use session::{SessionRequest, SessionState, SharedStatus};
