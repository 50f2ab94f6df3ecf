/// Entry point and game loop.
///
/// The main thread owns the terminal: it polls keys, applies commands,
/// drains simulation events and redraws. The enemy, the coins and the
/// freeze timer run on their own threads (see `sim`).

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::Receiver;
use std::thread;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event};
use log::{debug, error, info};

use config::GameConfig;
use sim::event::GameEvent;
use sim::frame::RenderSink;
use sim::level::load_map;
use sim::player;
use sim::world::Outcome;
use sim::Simulation;
use ui::input::command_for;
use ui::renderer::Renderer;

#[derive(Parser, Debug)]
#[command(name = "coinchase", version, about = "Collect every coin before the enemy catches you")]
struct Args {
    /// Map file to play (overrides the config)
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Hide cells the player hasn't been near yet
    #[arg(long)]
    fog: bool,

    /// Config file (default: config.toml next to the binary, then in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

struct Summary {
    outcome: Outcome,
    score: usize,
    max_score: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<Summary> {
    let mut config = GameConfig::load(args.config.as_deref());
    if let Some(map) = &args.map {
        config.map = map.clone();
    }
    if args.fog {
        config.fog.enabled = true;
    }

    let map = load_map(&config.map)
        .with_context(|| format!("cannot start with map {}", config.map.display()))?;
    let (sim, events) = Simulation::new(map, &config);
    info!("fog {}, freeze {:?}", if config.fog.enabled { "on" } else { "off" }, config.timing.freeze());

    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let workers = match sim.spawn_workers() {
        Ok(workers) => workers,
        Err(e) => {
            let _ = renderer.cleanup();
            return Err(e).context("could not start game threads");
        }
    };

    let result = game_loop(&sim, &events, &mut renderer);

    sim.shutdown();
    workers.join();
    if let Err(e) = renderer.cleanup() {
        error!("terminal cleanup failed: {e}");
    }
    result?;

    let (score, max_score) = sim.score();
    Ok(Summary {
        outcome: sim.outcome().unwrap_or(Outcome::Quit),
        score,
        max_score,
    })
}

fn game_loop(
    sim: &Simulation,
    events: &Receiver<GameEvent>,
    renderer: &mut Renderer,
) -> anyhow::Result<()> {
    let poll = sim.timing.input_poll();
    renderer.apply_frame(&sim.snapshot())?;

    loop {
        let mut dirty = false;

        if event::poll(poll)? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(command) = command_for(key) {
                        player::apply(sim, command);
                        dirty = true;
                    }
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }

        for ev in events.try_iter() {
            debug!("{ev:?}");
            dirty = true;
        }

        let frame = sim.snapshot();
        if let Some(outcome) = frame.outcome {
            if outcome == Outcome::Won {
                renderer.clear()?;
                thread::sleep(sim.timing.win_pause());
            }
            return Ok(());
        }
        if dirty {
            renderer.apply_frame(&frame)?;
        }
    }
}

fn print_summary(summary: &Summary) {
    match summary.outcome {
        Outcome::Won => println!("You win!"),
        Outcome::Lost => println!("Game Over"),
        Outcome::Quit => {}
    }
    println!("Score: {}/{}", summary.score, summary.max_score);
}
