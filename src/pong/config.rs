//! Pong construction parameters
//!
//! Fixed for the life of a game. Loaded from JSON when the host wants to
//! override the defaults; missing keys keep their default values.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Why a configuration was rejected
#[derive(Debug)]
pub enum ConfigError {
    FieldSize { width: i32, height: i32 },
    PaddleSize { width: i32, height: i32 },
    BallSize { width: i32, height: i32 },
    PaddleTallerThanField { paddle: i32, field: i32 },
    BallLargerThanField,
    SpeedRange { min: u32, max: u32 },
    AxisClearance(f32),
    ZeroCountdownInterval,
    Read(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldSize { width, height } => {
                write!(f, "field size must be positive, got {width}x{height}")
            }
            Self::PaddleSize { width, height } => {
                write!(f, "paddle size must be positive, got {width}x{height}")
            }
            Self::BallSize { width, height } => {
                write!(f, "ball size must be positive, got {width}x{height}")
            }
            Self::PaddleTallerThanField { paddle, field } => {
                write!(f, "paddle height {paddle} does not fit in field height {field}")
            }
            Self::BallLargerThanField => write!(f, "ball does not fit in the field"),
            Self::SpeedRange { min, max } => {
                write!(f, "ball speed range {min}..={max} is empty or zero")
            }
            Self::AxisClearance(deg) => {
                write!(f, "axis clearance must be in [0, 45) degrees, got {deg}")
            }
            Self::ZeroCountdownInterval => write!(f, "countdown interval must be non-zero"),
            Self::Read(e) => write!(f, "failed to read config: {e}"),
            Self::Parse(e) => write!(f, "failed to parse config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(e) => Some(e),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Field, paddle, and ball dimensions plus timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongConfig {
    pub field_width: i32,
    pub field_height: i32,
    pub paddle_width: i32,
    pub paddle_height: i32,
    /// Gap between a side wall and the paddle's outer edge
    pub paddle_margin: i32,
    pub ball_width: i32,
    pub ball_height: i32,
    pub min_ball_speed: u32,
    pub max_ball_speed: u32,
    /// Spawn angles closer than this to 0/90/180/270 degrees are resampled
    pub axis_clearance_deg: f32,
    pub countdown_interval_ms: u64,
    pub restart_prompt_delay_ms: u64,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_margin: PADDLE_MARGIN,
            ball_width: BALL_WIDTH,
            ball_height: BALL_HEIGHT,
            min_ball_speed: BALL_MIN_SPEED,
            max_ball_speed: BALL_MAX_SPEED,
            axis_clearance_deg: AXIS_CLEARANCE_DEG,
            countdown_interval_ms: COUNTDOWN_INTERVAL_MS,
            restart_prompt_delay_ms: RESTART_PROMPT_DELAY_MS,
        }
    }
}

impl PongConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject configurations the rules cannot play on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field_width <= 0 || self.field_height <= 0 {
            return Err(ConfigError::FieldSize {
                width: self.field_width,
                height: self.field_height,
            });
        }
        if self.paddle_width <= 0 || self.paddle_height <= 0 {
            return Err(ConfigError::PaddleSize {
                width: self.paddle_width,
                height: self.paddle_height,
            });
        }
        if self.ball_width <= 0 || self.ball_height <= 0 {
            return Err(ConfigError::BallSize {
                width: self.ball_width,
                height: self.ball_height,
            });
        }
        // The clamp range [h/2, field - h/2 - 1] must not be empty
        if self.paddle_height / 2 > self.field_height - self.paddle_height / 2 - 1 {
            return Err(ConfigError::PaddleTallerThanField {
                paddle: self.paddle_height,
                field: self.field_height,
            });
        }
        if self.ball_height / 2 > self.field_height - self.ball_height / 2 - 1
            || self.ball_width >= self.field_width
        {
            return Err(ConfigError::BallLargerThanField);
        }
        if self.max_ball_speed == 0 || self.min_ball_speed > self.max_ball_speed {
            return Err(ConfigError::SpeedRange {
                min: self.min_ball_speed,
                max: self.max_ball_speed,
            });
        }
        if !(0.0..45.0).contains(&self.axis_clearance_deg) {
            return Err(ConfigError::AxisClearance(self.axis_clearance_deg));
        }
        if self.countdown_interval_ms == 0 {
            return Err(ConfigError::ZeroCountdownInterval);
        }
        Ok(())
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn restart_prompt_delay(&self) -> Duration {
        Duration::from_millis(self.restart_prompt_delay_ms)
    }

    /// Keep a paddle centre inside the field
    pub fn clamp_paddle_y(&self, y: i32) -> i32 {
        let half = self.paddle_height / 2;
        y.clamp(half, self.field_height - half - 1)
    }

    /// Centre x of the player's paddle (left side)
    pub fn player_x(&self) -> i32 {
        self.paddle_margin + self.paddle_width / 2
    }

    /// Centre x of the computer's paddle (right side)
    pub fn computer_x(&self) -> i32 {
        self.field_width - self.paddle_margin - self.paddle_width / 2
    }

    /// Range of valid ball centre heights
    pub fn ball_y_range(&self) -> std::ops::RangeInclusive<i32> {
        let half = self.ball_height / 2;
        half..=(self.field_height - half - 1)
    }
}
