use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Instant,
};

use bracket_terminal::prelude::*;
use clap::Parser;
use thicket::{
    GameConfig, InputSource, Key, Outcome, Session, render, scripted_input::ScriptedInput,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "thicket", about = "Wander a seeded forest, collect gold, avoid monsters")]
struct Args {
    /// JSON file overriding the builtin world recipe
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// Replay keys from a file without opening a terminal
    #[arg(long)]
    script: Option<PathBuf>,

    /// Tick limit for scripted runs
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u64,
}

/// Holds the most recent key until the next simulated tick consumes it.
#[derive(Default)]
struct KeyLatch {
    key: Option<Key>,
}

impl KeyLatch {
    fn press(&mut self, key: Key) {
        self.key = Some(key);
    }
}

impl InputSource for KeyLatch {
    fn poll_key(&mut self) -> Key {
        self.key.take().unwrap_or(Key::None)
    }
}

enum Phase {
    Playing,
    Over(String),
}

struct ThicketState {
    config: GameConfig,
    session: Session,
    latch: KeyLatch,
    phase: Phase,
}

impl GameState for ThicketState {
    fn tick(&mut self, ctx: &mut BTerm) {
        match &self.phase {
            Phase::Playing => self.play(ctx),
            Phase::Over(headline) => {
                let headline = headline.clone();
                self.prompt(ctx, &headline);
            }
        }
    }
}

impl ThicketState {
    fn play(&mut self, ctx: &mut BTerm) {
        if let Some(key) = ctx.key.and_then(translate) {
            self.latch.press(key);
        }
        match self.session.pump(&mut self.latch, Instant::now()) {
            Some(Outcome::Quit) => self.phase = Phase::Over("You leave the forest.".to_string()),
            Some(Outcome::Defeat(message)) => self.phase = Phase::Over(message),
            Some(Outcome::Running) | None => {}
        }

        let session = &self.session;
        with_console(ctx, |console| {
            let (width, height) = console.get_char_size();
            let view = render::viewport(width as i32, height as i32);
            console.cls();
            render::draw_scene(console, &session.view(view), &session.hud(), view);
        });
    }

    fn prompt(&mut self, ctx: &mut BTerm, headline: &str) {
        with_console(ctx, |console| {
            console.cls();
            render::draw_prompt(console, headline);
        });
        match ctx.key {
            Some(VirtualKeyCode::R) => {
                let mut config = self.config.clone();
                config.seed = None;
                match Session::new(&config) {
                    Ok(session) => {
                        self.session = session;
                        self.latch = KeyLatch::default();
                        self.phase = Phase::Playing;
                    }
                    Err(err) => {
                        error!(%err, "cannot start a new session");
                        ctx.quit();
                    }
                }
            }
            Some(VirtualKeyCode::Q | VirtualKeyCode::Escape) => ctx.quit(),
            _ => {}
        }
    }
}

/// Lends the active console to `draw`. The backend lock is held throughout,
/// so `draw` must not call back into `BTerm`.
fn with_console(ctx: &BTerm, draw: impl FnOnce(&mut dyn Console)) {
    let mut backend = BACKEND_INTERNAL.lock();
    if let Some(display) = backend.consoles.get_mut(ctx.active_console) {
        draw(display.console.as_mut());
    }
}

fn translate(key: VirtualKeyCode) -> Option<Key> {
    match key {
        VirtualKeyCode::Up | VirtualKeyCode::I | VirtualKeyCode::W => Some(Key::Up),
        VirtualKeyCode::Down | VirtualKeyCode::K | VirtualKeyCode::S => Some(Key::Down),
        VirtualKeyCode::Left | VirtualKeyCode::J | VirtualKeyCode::A => Some(Key::Left),
        VirtualKeyCode::Right | VirtualKeyCode::L | VirtualKeyCode::D => Some(Key::Right),
        VirtualKeyCode::Space | VirtualKeyCode::F => Some(Key::Fire),
        VirtualKeyCode::Q | VirtualKeyCode::Escape => Some(Key::Quit),
        _ => None,
    }
}

fn init_logging(config: &GameConfig) -> BError {
    let file = File::create(&config.log_path)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_script(config: &GameConfig, script: &Path, max_ticks: u64) -> BError {
    let mut input = ScriptedInput::from_file(script)?;
    let mut session = Session::new(config)?;
    let outcome = session.run_headless(&mut input, max_ticks);
    let hud = session.hud();
    info!(ticks = session.ticks(), ?outcome, "scripted run finished");
    println!("seed {} after {} ticks: {}", session.seed(), session.ticks(), hud.status);
    match outcome {
        Outcome::Defeat(message) => println!("{message}"),
        Outcome::Quit | Outcome::Running => println!("quit"),
    }
    Ok(())
}

fn main() -> BError {
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    init_logging(&config)?;

    if let Some(script) = &args.script {
        return run_script(&config, script, args.max_ticks);
    }

    let session = Session::new(&config)?;
    let context = BTermBuilder::simple80x50()
        .with_title(config.world_name.as_str())
        .build()?;
    let state = ThicketState {
        config,
        session,
        latch: KeyLatch::default(),
        phase: Phase::Playing,
    };
    main_loop(context, state)
}
