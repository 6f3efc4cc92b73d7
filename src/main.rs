//! Catch Arcade entry point
//!
//! Headless driver: runs one session of a variant on autopilot with the fixed-step
//! loop and logs what happens.
//!
//! `catch-arcade [variant] [--config <file>] [--seed <n>] [--seconds <n>]`

use std::path::PathBuf;

use catch_arcade::audio::LogFeedback;
use catch_arcade::consts::*;
use catch_arcade::sim::{Action, Game, GameEvent, TickInput};
use catch_arcade::{GameConfig, Variant};

struct Args {
    variant: Variant,
    config: Option<PathBuf>,
    seed: u64,
    seconds: f32,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            config: None,
            seed: rand::random(),
            seconds: 90.0,
        }
    }
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = iter.next().map(PathBuf::from),
            "--seed" => match iter.next().and_then(|s| s.parse().ok()) {
                Some(seed) => args.seed = seed,
                None => log::warn!("--seed expects a number"),
            },
            "--seconds" => match iter.next().and_then(|s| s.parse().ok()) {
                Some(seconds) => args.seconds = seconds,
                None => log::warn!("--seconds expects a number"),
            },
            name => match Variant::from_str(name) {
                Some(variant) => args.variant = variant,
                None => log::warn!("Unknown argument {:?}", name),
            },
        }
    }
    args
}

/// Fixed-step driver around a [`Game`]
struct Runner {
    game: Game,
    accumulator: f32,
    input: TickInput,
}

impl Runner {
    fn new(game: Game) -> Self {
        Self {
            game,
            accumulator: 0.0,
            input: TickInput {
                idle_mode: true,
                ..Default::default()
            },
        }
    }

    /// Feed one frame of wall time
    fn frame(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.game.advance_clock(dt);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.game.tick(&self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }
}

fn main() {
    env_logger::init();
    let args = parse_args();

    let config = GameConfig::load_or_preset(args.config.as_deref(), args.variant);
    if let Err(e) = config.validate() {
        log::error!("Config rejected: {}", e);
        std::process::exit(1);
    }
    log::info!(
        "Catch Arcade: {} for up to {:.0}s (seed {})",
        config.variant.as_str(),
        args.seconds,
        args.seed
    );

    let mut game = Game::new(config, args.seed);
    game.set_feedback(Some(Box::new(LogFeedback)));
    game.subscribe(|event| match event {
        GameEvent::LevelUp { level } => log::info!("Level {}", level),
        GameEvent::TimeExtended { remaining } => log::info!("+time, {}s left", remaining),
        GameEvent::BatchCleared => log::info!("Pile cleared"),
        GameEvent::GameEnded { score, level } => {
            log::info!("Game over: {} points, level {}", score, level)
        }
        other => log::trace!("{:?}", other),
    });
    game.handle_action(Action::Start);

    let mut runner = Runner::new(game);
    let frame_dt = 1.0 / 60.0;
    let mut elapsed = 0.0;
    while elapsed < args.seconds && runner.game.is_playing() {
        runner.frame(frame_dt);
        elapsed += frame_dt;
    }
    if runner.game.is_playing() {
        runner.game.handle_action(Action::Stop);
    }

    match serde_json::to_string_pretty(&runner.game.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}
