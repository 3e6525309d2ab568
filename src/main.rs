//! Arcade Pong headless runner
//!
//! Runs the real loop and timers with a log-only renderer while an
//! autopilot thread plays the host UI: it confirms the welcome screen,
//! sweeps the mouse, launches extra balls, and restarts after a loss.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use arcade_pong::{
    GameLoop, InputEvent, InputQueue, Key, LogRenderer, LoopConfig, LoopHandle, MouseButton,
    PongConfig, PongGame, ThreadScheduler,
};

#[derive(Debug, Parser)]
#[command(name = "arcade-pong", about = "Headless Pong session driven by an autopilot")]
struct Args {
    /// RNG seed for ball spawns
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Stop after this many seconds
    #[arg(long, default_value_t = 15)]
    seconds: u64,

    /// JSON file overriding the default field and timing configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log statistics every N frames (0 disables)
    #[arg(long, default_value_t = 500)]
    stats_every: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match PongConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(2);
            }
        },
        None => PongConfig::default(),
    };

    let game = match PongGame::new(config.clone(), args.seed, Arc::new(ThreadScheduler::new())) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    log::info!("Arcade Pong (headless) starting with seed {}", args.seed);

    let mut game_loop = GameLoop::new(
        game,
        LogRenderer::new(args.stats_every),
        LoopConfig::default(),
    );
    let autopilot = spawn_autopilot(
        game_loop.input(),
        game_loop.handle(),
        config,
        Duration::from_secs(args.seconds),
    );

    game_loop.start();
    game_loop.game_mut().shut_down();

    if autopilot.join().is_err() {
        log::warn!("Autopilot thread panicked");
    }
    log::info!(
        "Finished after {} frames in state {:?}",
        game_loop.frames(),
        game_loop.game().state()
    );
}

/// Feed input the way a window's event callbacks would, then stop the loop
fn spawn_autopilot(
    input: InputQueue,
    handle: LoopHandle,
    config: PongConfig,
    run_for: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let started = Instant::now();
        let field_mid = config.field_height as f32 / 2.0;
        let sweep = field_mid - config.paddle_height as f32;
        let mut tick: u64 = 0;

        thread::sleep(Duration::from_millis(500));
        input.push(InputEvent::KeyPress(Key::Enter));

        while started.elapsed() < run_for {
            thread::sleep(Duration::from_millis(20));
            tick += 1;

            let phase = tick as f32 * 0.05;
            let y = (field_mid + phase.sin() * sweep) as i32;
            input.push(InputEvent::MouseMove { x: 10, y });

            if tick % 150 == 0 {
                input.push(InputEvent::MouseClick {
                    x: 10,
                    y,
                    button: MouseButton::Primary,
                });
            }
            if tick % 250 == 0 {
                // Restarts after a loss; a running countdown starts over
                input.push(InputEvent::KeyPress(Key::Char('r')));
            }
        }

        handle.stop();
    })
}
