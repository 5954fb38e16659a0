mod driver;
mod generator;
mod grid;
mod levels;
mod mover;
mod objects;
mod session;

use clap::Parser;
use driver::{Command, Driver, Handled};
use generator::{Generator, GeneratorConfig};
use levels::Levels;
use session::Session;
use std::io::{self, BufRead};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shove")]
#[command(about = "A crate-pushing grid puzzle", long_about = None)]
struct Args {
    /// Path to a levels file (XSB-style); a random map is generated when omitted
    #[arg(short = 'f', long, value_name = "FILE")]
    level_file: Option<String>,

    /// Level number to load from the levels file (1-indexed)
    #[arg(short, long, default_value = "1")]
    level: usize,

    /// Seed for the random map generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Height of generated maps, border included
    #[arg(long, default_value = "7")]
    height: usize,

    /// Width of generated maps, border included
    #[arg(long, default_value = "10")]
    width: usize,

    /// Number of crates on generated maps
    #[arg(short, long, default_value = "5")]
    crates: usize,

    /// Keys to play instead of reading from stdin (h/j/k/l, w/a/s/d or L/R/U/D; i, z, q)
    #[arg(short, long)]
    moves: Option<String>,
}

fn load_level(path: &str, level: usize) -> Session {
    let levels = match Levels::from_file(path) {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("Error loading levels: {}", e);
            std::process::exit(1);
        }
    };

    if level == 0 {
        eprintln!("Error: level numbers must be at least 1");
        std::process::exit(1);
    }

    match levels.get(level - 1) {
        Some(session) => session.clone(),
        None => {
            eprintln!(
                "Error: level {} not found (file contains {} levels)",
                level,
                levels.len()
            );
            std::process::exit(1);
        }
    }
}

/// Feed one key to the driver and redraw if the state changed.
fn play_key(driver: &mut Driver, key: char) {
    let Some(command) = Command::from_key(key) else {
        return;
    };

    match driver.handle(command) {
        Ok(Handled::Moved) | Ok(Handled::Loaded) => {
            if let Some(session) = driver.session() {
                println!("move {}:\n{}", session.moves(), session);
            }
        }
        Ok(Handled::Rejected) | Ok(Handled::Ignored) | Ok(Handled::Quit) => {}
        Err(e) => eprintln!("Error generating map: {}", e),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = GeneratorConfig {
        height: args.height,
        width: args.width,
        crates: args.crates,
        seed: args.seed,
        ..GeneratorConfig::default()
    };
    let mut generator = match Generator::new(config) {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let session = match &args.level_file {
        Some(path) => load_level(path, args.level),
        None => {
            let state = match generator.generate() {
                Ok(state) => state,
                Err(e) => {
                    eprintln!("Error generating map: {}", e);
                    std::process::exit(1);
                }
            };
            match Session::new(state.grid, state.objects) {
                Ok(session) => session,
                Err(e) => {
                    eprintln!("Error: generated state is invalid: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    println!("Starting position:\n{}", session);
    let mut driver = Driver::new(generator);
    driver.load_session(session);

    match args.moves {
        Some(keys) => {
            for key in keys.chars() {
                if !driver.is_running() {
                    break;
                }
                play_key(&mut driver, key);
            }
        }
        None => {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        eprintln!("Error reading input: {}", e);
                        std::process::exit(1);
                    }
                };
                for key in line.chars() {
                    play_key(&mut driver, key);
                }
                if !driver.is_running() {
                    break;
                }
            }
        }
    }

    if let Some(session) = driver.session() {
        println!("moves: {}", session.moves());
    }
}
