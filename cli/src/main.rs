use clap::Parser;
use horserace::core::betting::{settle, BetBook, UnbackedPolicy};
use horserace::core::handle_race::{simulate_race, RaceHandle, RealtimeTicker};
use horserace::core::horse::HorsePars;
use horserace::core::odds::{print_odds, win_probabilities};
use horserace::core::race::RacePars;
use horserace::core::stable::{generate_random_stable, Stable};
use horserace::interfaces::race_feed::{RaceMsg, RaceState, ANSI_RESET};
use horserace::post::race_result::{BatchSummary, RaceResult};
use horserace::pre::read_sim_pars::{read_bets, read_race_pars, read_stable, write_stable};
use horserace::pre::sim_opts::SimOpts;
use horserace::pre::validate::{validate_bets, validate_field, validate_race_pars};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Number of horses in a generated stable.
const RANDOM_STABLE_SIZE: usize = 8;

const PROGRESS_BAR_WIDTH: usize = 40;

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // also captures the records of the log facade used by the simulator
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

fn print_race_state(state: &RaceState) {
    println!("--- {:.1}s ---", state.race_time);
    for horse in state.horse_states.iter() {
        let filled = (horse.progress.clamp(0.0, 1.0) * PROGRESS_BAR_WIDTH as f64) as usize;
        println!(
            "{:<20} |{}{}{}{}| {:5.1}%",
            horse.name,
            horse.color.ansi_fg(),
            "#".repeat(filled),
            ANSI_RESET,
            " ".repeat(PROGRESS_BAR_WIDTH - filled),
            horse.progress * 100.0
        );
    }
}

/// Runs the race on its own thread and prints the live feed until the terminal message arrives.
fn run_realtime(
    field: Vec<HorsePars>,
    race_pars: &RacePars,
    realtime_factor: f64,
    seed: u64,
) -> anyhow::Result<RaceResult> {
    let (tx, rx) = flume::unbounded();
    let ticker = RealtimeTicker::new(race_pars.tick_interval_ms, realtime_factor);
    let handle = RaceHandle::start(field, race_pars.to_owned(), ticker, Some(seed), tx);

    let mut t_last_print = f64::NEG_INFINITY;
    for msg in rx.iter() {
        match msg {
            RaceMsg::Event(event) => println!("{:8.2}s  {}", event.time_s, event.message),
            RaceMsg::Progress(state) => {
                if state.race_time >= t_last_print + 1.0 {
                    print_race_state(&state);
                    t_last_print = state.race_time;
                }
            }
            RaceMsg::Finished { .. } | RaceMsg::Stopped(_) => break,
        }
    }

    handle.join()
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();
    init_logging(sim_opts.debug);

    let seed = sim_opts.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);
    info!("Using seed {}", seed);

    // get race parameters
    let race_pars = if let Some(parfile_path) = &sim_opts.parfile_path {
        info!("Reading race parameters from {:?}", parfile_path);
        read_race_pars(parfile_path)?
    } else {
        RacePars::default()
    };
    validate_race_pars(&race_pars)?;

    // get stable and draw the field
    let stable: Stable = if let Some(stable_path) = &sim_opts.stable_path {
        info!("Reading stable from {:?}", stable_path);
        read_stable(stable_path)?
    } else {
        info!("No stable provided, generating {} random horses", RANDOM_STABLE_SIZE);
        generate_random_stable(&mut rng, RANDOM_STABLE_SIZE)
    };

    if let Some(save_path) = &sim_opts.save_stable {
        write_stable(&stable, save_path)?;
        info!("Stable written to {:?}", save_path);
    }

    // collect bets, the horses they back are always entered in the race
    let bets = match &sim_opts.bets_path {
        Some(bets_path) if sim_opts.no_sim_runs <= 1 => {
            let bets = read_bets(bets_path)?;
            validate_bets(&bets, stable.horses())?;
            bets
        }
        _ => Vec::new(),
    };
    let mut backed: Vec<&str> = bets.iter().map(|bet| bet.horse.as_str()).collect();
    backed.sort_unstable();
    backed.dedup();
    if backed.len() > sim_opts.field_size {
        warn!(
            "Bets are placed on {} horses, the field is enlarged beyond {}",
            backed.len(),
            sim_opts.field_size
        );
    }

    let field = stable.select_field_including(&mut rng, sim_opts.field_size, &backed);
    validate_field(&field)?;
    info!(
        "Field: {}",
        field
            .iter()
            .map(|h| h.name.as_str())
            .collect::<Vec<&str>>()
            .join(", ")
    );

    if sim_opts.odds {
        print_odds(&field);
    }

    // EXECUTION -----------------------------------------------------------------------------------
    if sim_opts.no_sim_runs > 1 {
        // BATCH CASE - independent headless races, each with its own generator
        if sim_opts.realtime || sim_opts.bets_path.is_some() {
            warn!("Real-time mode and bets are ignored when running several races");
        }
        let t_start = Instant::now();

        let summary = (0..sim_opts.no_sim_runs as u64)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i + 1));
                simulate_race(&field, &race_pars, &mut rng)
            })
            .fold(BatchSummary::default, |mut summary, result| {
                summary.add(&result);
                summary
            })
            .reduce(BatchSummary::default, BatchSummary::merge);

        info!("Execution time: {}ms", t_start.elapsed().as_millis());
        summary.print();

        println!("RESULT: Estimated vs. observed win share");
        for (name, prob) in win_probabilities(&field) {
            println!(
                "{:<20} {:5.1}% / {:5.1}%",
                name,
                prob * 100.0,
                summary.win_share(&name) * 100.0
            );
        }
        return Ok(());
    }

    let mut book = BetBook::default();
    if !bets.is_empty() {
        validate_bets(&bets, &field)?;
        book.place_all(&bets)?;
        info!("{} bets placed, total pool {}", book.len(), book.total_pool());
    }

    let race_result = if sim_opts.realtime {
        run_realtime(field, &race_pars, sim_opts.realtime_factor, rng.gen())?
    } else {
        let t_start = Instant::now();
        let result = simulate_race(&field, &race_pars, &mut rng);
        info!("Execution time: {}ms", t_start.elapsed().as_millis());
        result
    };

    // POST-PROCESSING -----------------------------------------------------------------------------
    race_result.print_summary()?;

    if let Some(output_path) = &sim_opts.output_path {
        let path = race_result.write_to_file(Some(output_path))?;
        info!("Result written to {}", path);
    }

    if !book.is_empty() {
        let policy = if sim_opts.refund {
            UnbackedPolicy::Refund
        } else {
            UnbackedPolicy::Retain
        };
        settle(race_result.winner.as_deref(), &book, policy).print();
    }

    Ok(())
}
