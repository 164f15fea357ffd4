//! Valley World - entry point
//!
//! Seeds a demo town, then drops into a small control loop mirroring the
//! engine's control surface: manual ticks, skips, pause/resume, and the
//! poll-driven autoticker.

use std::io::{self, Write};

use clap::Parser;

use valley_world::core::config::{set_config, WorldConfig};
use valley_world::core::error::Result;
use valley_world::core::types::{BuildingId, CityId, PersonId};
use valley_world::simulation::autotick::TickRate;
use valley_world::world::{demo_world, World};

#[derive(Parser, Debug)]
#[command(name = "valley-world")]
#[command(about = "Layered needs-driven world simulation")]
struct Args {
    /// Seed for the demo population
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Number of persons to seed
    #[arg(long, default_value_t = 24)]
    people: usize,

    /// Autoticker rate to configure at startup (named or milliseconds)
    #[arg(long)]
    rate: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "valley_world=info".into()),
        )
        .init();

    let args = Args::parse();

    if let Some(path) = &args.config {
        let raw = std::fs::read_to_string(path)?;
        let config = WorldConfig::from_toml_str(&raw)?;
        if set_config(config).is_err() {
            tracing::warn!("config was already initialized; ignoring {}", path.display());
        }
    }

    let mut world = demo_world(args.seed, args.people);
    if let Some(rate) = &args.rate {
        world.set_tick_rate(TickRate::parse(rate)?)?;
    }

    tracing::info!(
        people = world.person_count(),
        seed = args.seed,
        "world seeded"
    );

    println!("\n=== VALLEY WORLD ===");
    println!("A layered needs-driven world simulation");
    println!();
    println!("Commands:");
    println!("  tick / t          - Advance one simulated hour");
    println!("  skip <n>          - Advance n hours");
    println!("  toggle            - Pause or resume the world");
    println!("  auto start|stop   - Control the autoticker");
    println!("  auto status       - Show autoticker state");
    println!("  check             - Poll the autoticker against the wall clock");
    println!("  rate <name|ms>    - Set the tick rate");
    println!("  status / s        - World overview");
    println!("  person <id>       - A person's need vector");
    println!("  building <id>     - A building's condition");
    println!("  city <id>         - A city's aggregates");
    println!("  quit / q          - Exit");
    println!();

    loop {
        display_status(&world);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }

        if let Err(err) = handle_command(&mut world, input) {
            println!("error: {err}");
        }
    }

    Ok(())
}

fn handle_command(world: &mut World, input: &str) -> Result<()> {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();

    match command {
        "tick" | "t" => {
            let events = world.tick()?;
            println!("hour {} ({} events)", world.current_hour(), events.len());
        }
        "skip" => {
            let n: u64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1);
            let events = world.skip(n)?;
            println!(
                "advanced {} hours to {} ({} events)",
                n,
                world.current_hour(),
                events.len()
            );
        }
        "toggle" => {
            let running = world.toggle();
            println!("{}", if running { "running" } else { "paused" });
        }
        "auto" => match parts.next() {
            Some("start") => world.start_autoticker()?,
            Some("stop") => world.stop_autoticker()?,
            Some("status") | None => {
                println!("{}", serde_json::to_string_pretty(&world.autoticker_status())?);
            }
            Some(other) => {
                println!("unknown autoticker command '{other}'");
            }
        },
        "check" => {
            let applied = world.check_autotick()?;
            println!("applied {applied} hours");
        }
        "rate" => {
            let rate = parts
                .next()
                .map(TickRate::parse)
                .transpose()?
                .unwrap_or(TickRate::Realtime);
            world.set_tick_rate(rate)?;
            println!("rate set to {} ({}ms)", rate.name(), rate.interval_ms());
        }
        "status" | "s" => {
            let date = world.clock.date();
            println!(
                "hour {} | year {} month {} day {} ({:02}:00){}",
                world.current_hour(),
                date.year,
                date.month,
                date.day_of_month,
                date.hour_of_day,
                if date.in_leap_occurrence {
                    " | leap occurrence"
                } else {
                    ""
                }
            );
            println!(
                "{} living of {} persons, {} events logged",
                world.living_count(),
                world.person_count(),
                world.events.len()
            );
        }
        "person" => {
            let id = parse_id(parts.next())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&world.person_needs(PersonId(id))?)?
            );
        }
        "building" => {
            let id = parse_id(parts.next())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&world.building_status(BuildingId(id))?)?
            );
        }
        "city" => {
            let id = parse_id(parts.next())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&world.city_status(CityId(id))?)?
            );
        }
        other => {
            println!("unknown command '{other}'");
        }
    }

    Ok(())
}

fn parse_id(arg: Option<&str>) -> Result<u32> {
    arg.and_then(|s| s.parse().ok())
        .ok_or_else(|| valley_world::core::error::SimError::Validation("expected a numeric id".into()))
}

fn display_status(world: &World) {
    let date = world.clock.date();
    println!(
        "[hour {} | y{} m{} d{} {:02}:00 | {} alive]",
        world.current_hour(),
        date.year,
        date.month,
        date.day_of_month,
        date.hour_of_day,
        world.living_count()
    );
}
