#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Mine Squad level headlessly.

mod level_file;
mod report;
mod session;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use mine_squad_core::InputDevice;
use mine_squad_system_behavior::{Behavior, Config as BehaviorConfig};
use mine_squad_system_lifecycle::Lifecycle;
use mine_squad_world::World;

use session::{FrameInput, Session};

/// Mine Squad - defuse a minefield while enemies close in
#[derive(Parser, Debug)]
#[command(name = "mine-squad", author, version, about, long_about = None)]
struct Args {
    /// Level description in TOML
    #[arg(short, long)]
    level: PathBuf,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    ticks: u32,

    /// Per-frame input: U D L R move, B beacon, F fire, . idle
    #[arg(short, long, default_value = "")]
    script: String,

    /// Overrides the seed stored in the level file
    #[arg(long)]
    seed: Option<u64>,

    /// Treat movement input as coming from an analog stick
    #[arg(long)]
    joystick: bool,

    /// Print every event as it happens
    #[arg(long)]
    events: bool,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Entry point for the Mine Squad command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.ticks == 0 {
        bail!("--ticks must be at least 1");
    }

    let inputs = args
        .script
        .chars()
        .filter(|symbol| !symbol.is_whitespace())
        .map(|symbol| {
            FrameInput::from_symbol(symbol)
                .with_context(|| format!("unknown script symbol `{symbol}`"))
        })
        .collect::<Result<Vec<_>>>()?;

    let contents = fs::read_to_string(&args.level)
        .with_context(|| format!("failed to read level file {}", args.level.display()))?;
    let (layout, mut config) = level_file::parse(&contents)
        .with_context(|| format!("invalid level file {}", args.level.display()))?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seed = config.seed;
    let world = World::load(layout, config).context("failed to load level")?;

    let device = if args.joystick {
        InputDevice::Joystick
    } else {
        InputDevice::Keyboard
    };
    let mut session = Session::new(
        world,
        Behavior::new(BehaviorConfig::default().with_seed(seed)),
        Lifecycle::default(),
        device,
    );

    for frame in 0..args.ticks {
        let input = usize::try_from(frame)
            .ok()
            .and_then(|index| inputs.get(index))
            .copied()
            .unwrap_or_default();
        let events = session.frame(input);
        if args.events {
            for event in &events {
                println!("{frame:>6} {event:?}");
            }
        }
        if session.status().is_finished() {
            log::info!("level finished after {} frames", frame + 1);
            break;
        }
    }

    print!("{}", report::render_map(session.world()));
    println!("{}", report::summary(session.world()));
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
