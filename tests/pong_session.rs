use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use arcade_pong::consts::*;
use arcade_pong::*;

/// Keeps the overlay history (changes only) and the latest stats
#[derive(Default)]
struct Recorder {
    messages: Vec<Option<String>>,
    last_stats: FrameStats,
}

impl Renderer for Recorder {
    fn draw_frame(&mut self, frame: &Frame<'_>) {
        let message = frame.message.map(str::to_owned);
        if self.messages.last() != Some(&message) {
            self.messages.push(message);
        }
        self.last_stats = frame.stats;
    }
}

fn manual_session(seed: u64) -> (Arc<ManualScheduler>, GameLoop<PongGame, Recorder>) {
    let scheduler = Arc::new(ManualScheduler::new());
    let game = PongGame::new(PongConfig::default(), seed, scheduler.clone()).expect("valid config");
    let game_loop = GameLoop::new(game, Recorder::default(), LoopConfig::default());
    (scheduler, game_loop)
}

fn balls(world: &World) -> Vec<EntityId> {
    world
        .iter()
        .filter(|(_, e)| e.name().is_none())
        .map(|(id, _)| id)
        .collect()
}

fn count_down(scheduler: &ManualScheduler, game_loop: &mut GameLoop<PongGame, Recorder>) {
    let interval = Duration::from_millis(COUNTDOWN_INTERVAL_MS);
    scheduler.advance(Duration::ZERO);
    game_loop.step(1);
    for _ in 0..COUNTDOWN_FROM {
        scheduler.advance(interval);
        game_loop.step(1);
    }
}

#[test]
fn test_full_session_on_manual_clock() {
    let (scheduler, mut game_loop) = manual_session(42);
    let input = game_loop.input();

    game_loop.step(1);
    assert_eq!(game_loop.game().state(), SessionState::WelcomeScreen);
    assert_eq!(game_loop.world().len(), 3);

    input.push(InputEvent::KeyPress(Key::Enter));
    game_loop.step(1);
    assert_eq!(game_loop.game().state(), SessionState::CountingDown);

    count_down(&scheduler, &mut game_loop);
    assert_eq!(game_loop.game().state(), SessionState::Playing);
    assert_eq!(game_loop.world().len(), 3);
    assert_eq!(
        game_loop.renderer().messages,
        vec![
            Some(MESSAGE_WELCOME.to_string()),
            Some("3".to_string()),
            Some("2".to_string()),
            Some("1".to_string()),
            None,
        ]
    );

    // Ten clicks, ten new balls
    let before = balls(game_loop.world());
    for _ in 0..10 {
        input.push(InputEvent::MouseClick {
            x: 10,
            y: 300,
            button: MouseButton::Primary,
        });
    }
    game_loop.step(1);
    let after = balls(game_loop.world());
    let added: Vec<_> = after.iter().filter(|id| !before.contains(id)).collect();
    assert_eq!(added.len(), 10);
    assert_eq!(game_loop.renderer().last_stats.entities, 13);

    let player_id = game_loop.game().player().expect("player paddle");
    let player = game_loop.world().get(player_id).expect("player alive").clone();
    for id in &added {
        let ball = game_loop.world().get(**id).expect("ball alive");
        assert_eq!(ball.collides_with(&player), player.collides_with(ball));
    }

    // Park the paddle at the top and let the balls come to it
    input.push(InputEvent::MouseMove { x: 10, y: 0 });
    let mut steps = 0;
    while game_loop.game().state() == SessionState::Playing && steps < 1_000_000 {
        game_loop.step(1);
        steps += 1;
    }
    assert_eq!(game_loop.game().state(), SessionState::GameOver);
    assert_eq!(balls(game_loop.world()).len(), 10);
    assert_eq!(
        game_loop.renderer().messages.last(),
        Some(&Some(MESSAGE_GAME_OVER.to_string()))
    );

    scheduler.advance(Duration::from_millis(RESTART_PROMPT_DELAY_MS));
    game_loop.step(1);
    assert_eq!(
        game_loop.renderer().messages.last(),
        Some(&Some(MESSAGE_RESTART.to_string()))
    );

    input.push(InputEvent::KeyPress(Key::Char('r')));
    game_loop.step(1);
    assert_eq!(game_loop.game().state(), SessionState::CountingDown);
    count_down(&scheduler, &mut game_loop);
    assert_eq!(game_loop.game().state(), SessionState::Playing);
    assert_eq!(game_loop.world().len(), 3);
}

#[test]
fn test_same_seed_replays_identically() {
    let run = |seed| {
        let (scheduler, mut game_loop) = manual_session(seed);
        game_loop.input().push(InputEvent::KeyPress(Key::Enter));
        game_loop.step(1);
        count_down(&scheduler, &mut game_loop);
        for _ in 0..500 {
            game_loop.step(2);
        }
        game_loop
            .world()
            .iter()
            .map(|(_, e)| (e.position(), e.angle(), e.speed()))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(9), run(9));
}

/// Messages seen by a renderer living on the loop thread
#[derive(Clone, Default)]
struct SharedRecorder {
    messages: Arc<Mutex<Vec<Option<String>>>>,
}

impl Renderer for SharedRecorder {
    fn draw_frame(&mut self, frame: &Frame<'_>) {
        let message = frame.message.map(str::to_owned);
        let mut messages = self.messages.lock().unwrap();
        if messages.last() != Some(&message) {
            messages.push(message);
        }
    }
}

#[test]
fn test_threaded_session_reaches_play() {
    let config = PongConfig {
        countdown_interval_ms: 50,
        restart_prompt_delay_ms: 50,
        ..Default::default()
    };
    let game = PongGame::new(config, 3, Arc::new(ThreadScheduler::new())).expect("valid config");
    let recorder = SharedRecorder::default();
    let seen = recorder.messages.clone();
    let mut game_loop = GameLoop::new(game, recorder, LoopConfig::default());

    let input = game_loop.input();
    let handle = game_loop.handle();
    let host = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        input.push(InputEvent::KeyPress(Key::Enter));
        thread::sleep(Duration::from_millis(600));
        handle.stop();
    });

    let runner = thread::spawn(move || {
        game_loop.start();
        game_loop
    });
    host.join().unwrap();
    let mut game_loop = runner.join().unwrap();
    game_loop.game_mut().shut_down();

    assert_eq!(game_loop.state(), LoopState::Stopped);
    assert_eq!(game_loop.game().state(), SessionState::Playing);
    assert_eq!(game_loop.world().len(), 3);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.first(), Some(&Some(MESSAGE_WELCOME.to_string())));
    assert_eq!(seen.last(), Some(&None));
}
