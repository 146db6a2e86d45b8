//! Terminal runner (default binary).
//!
//! Polls crossterm for key events, feeds held-key state to the game once per
//! 16 ms tick, and renders the software-rasterized board into the terminal.
//! Logs go to a file because the terminal is owned by the UI.

use std::fs::File;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use tetris3d::core::{load_best, save_best, GameState};
use tetris3d::input::map::map_key;
use tetris3d::input::{handle_key_event, should_quit, InputCommand, InputHandler};
use tetris3d::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use tetris3d::types::{GameEvent, GameKey, TICK_MS};
use tetris3d::HostConfig;

/// Longest step fed to the game, so a stall does not teleport the piece.
const MAX_STEP_S: f32 = 0.1;

fn main() -> Result<()> {
    let config = HostConfig::from_env();
    init_logging(&config);
    log::info!("starting with {:?}", config);

    let mut term = TerminalRenderer::new();
    let release_events = term.enter()?;

    let result = run(&mut term, &config, release_events);

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Err(err) = &result {
        log::error!("exited with error: {err:#}");
    }
    result
}

fn init_logging(config: &HostConfig) {
    let file = match File::create(&config.log_path) {
        Ok(file) => file,
        Err(_) => return,
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn seed_from_clock() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

fn run(term: &mut TerminalRenderer, config: &HostConfig, release_events: bool) -> Result<()> {
    let seed = config.seed.unwrap_or_else(seed_from_clock);
    let mut game = GameState::new(config.dims, seed);
    game.set_best(load_best(&config.save_path));
    if config.tutorial {
        game.start_tutorial();
    }

    let mut view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut input = InputHandler::new().with_release_events(release_events);

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    let outcome = loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&game, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let mut timeout = tick_duration.saturating_sub(last_tick.elapsed());
        let mut quit = false;
        while event::poll(timeout)? {
            timeout = Duration::ZERO;
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        if should_quit(key) {
                            quit = true;
                            break;
                        }
                        match handle_key_event(key) {
                            Some(InputCommand::Key(k)) => {
                                input.handle_key_press(k, Instant::now());
                                handle_stopped_game(&mut game, &input, k);
                            }
                            Some(InputCommand::View { dyaw, dpitch }) => {
                                game.rotate_view(dyaw, dpitch);
                            }
                            None => {}
                        }
                    }
                    KeyEventKind::Release => {
                        if let Some(k) = map_key(key.code) {
                            input.handle_key_release(k);
                        }
                    }
                },
                Event::Resize(_, _) => term.invalidate(),
                Event::FocusLost => game.pause(),
                _ => {}
            }
        }
        if quit {
            break Ok(());
        }

        // Tick.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            input.update(last_tick);
            let dt = elapsed.as_secs_f32().min(MAX_STEP_S);
            if !game.update(dt, &input) {
                if let Some(ev) = game.take_event() {
                    log::debug!("game stopped: {ev:?}");
                }
            }
        }
    };

    let best = game.best_including_current();
    if let Err(err) = save_best(&config.save_path, best) {
        log::warn!("could not save best record: {err}");
    }
    outcome
}

/// Keys that restart a paused or finished game; `update` is not running then.
fn handle_stopped_game(game: &mut GameState, input: &InputHandler, key: GameKey) {
    if game.paused() && key == GameKey::Pause {
        game.resume(input);
    } else if game.game_over() && key == GameKey::Reset {
        game.reset();
        game.resume(input);
    } else {
        return;
    }
    if let Some(GameEvent::Resume) = game.take_event() {
        log::debug!("resumed");
    }
}
