use crate::core::horse::HorsePars;
use crate::core::race::{Race, RacePars, RaceStatus};
use crate::interfaces::race_feed::{HorseState, RaceMsg, RaceState, MAX_FEED_UPDATE_FREQUENCY};
use crate::post::race_result::RaceResult;
use anyhow::Context;
use flume::Sender;
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, sleep, JoinHandle};
use std::time::{Duration, Instant};

/// Ticker is the clock of the race driver. It is called after every tick that did not end the
/// race, with the instant the tick started.
pub trait Ticker {
    fn wait(&mut self, t_tick_start: Instant);
}

/// InstantTicker never waits, races run as fast as they can be computed.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantTicker;

impl Ticker for InstantTicker {
    fn wait(&mut self, _t_tick_start: Instant) {}
}

/// RealtimeTicker sleeps until the tick interval (divided by the real-time factor) has passed.
#[derive(Debug, Clone, Copy)]
pub struct RealtimeTicker {
    interval: Duration,
}

impl RealtimeTicker {
    pub fn new(tick_interval_ms: u64, realtime_factor: f64) -> RealtimeTicker {
        let factor = if realtime_factor > 0.0 { realtime_factor } else { 1.0 };
        RealtimeTicker {
            interval: Duration::from_secs_f64(tick_interval_ms as f64 / 1000.0 / factor),
        }
    }
}

impl Ticker for RealtimeTicker {
    fn wait(&mut self, t_tick_start: Instant) {
        let elapsed = t_tick_start.elapsed();
        if elapsed < self.interval {
            sleep(self.interval - elapsed);
        } else {
            warn!("Could not keep up with real-time!")
        }
    }
}

/// handle_race runs the race until a winner is declared, the `active` flag is cleared, or the
/// optional tick limit is reached, and returns the results for post-processing. If a sender is
/// inserted, events, progress snapshots and one terminal message are sent through it.
pub fn handle_race<R: Rng, T: Ticker>(
    race: &mut Race,
    rng: &mut R,
    ticker: &mut T,
    active: &AtomicBool,
    tx: Option<&Sender<RaceMsg>>,
) -> anyhow::Result<RaceResult> {
    race.start();
    let mut t_race_update_feed = 0.0;

    while !race.is_over() {
        if !active.load(Ordering::SeqCst) {
            race.stop();
            break;
        }
        if let Some(max_ticks) = race.pars.max_ticks {
            if race.cur_tick >= max_ticks {
                warn!("Race gave up after {} ticks without a winner", race.cur_tick);
                race.stop();
                break;
            }
        }

        let t_start = Instant::now();
        let report = race.simulate_tick(rng);

        if let Some(tx) = tx {
            for event in report.events {
                tx.send(RaceMsg::Event(event))
                    .context("Failed to send race event!")?;
            }

            if report.finished
                || race.race_time() > t_race_update_feed + 1.0 / MAX_FEED_UPDATE_FREQUENCY - 0.001
            {
                tx.send(RaceMsg::Progress(get_race_state(race)))
                    .context("Failed to send race state!")?;
                t_race_update_feed = race.race_time();
            }
        }

        if !race.is_over() {
            ticker.wait(t_start);
        }
    }

    let result = race.get_race_result();

    if let Some(tx) = tx {
        let final_msg = match result.status {
            RaceStatus::Finished => RaceMsg::Finished {
                winner: result.winner.to_owned(),
                result: result.to_owned(),
            },
            _ => RaceMsg::Stopped(result.to_owned()),
        };
        tx.send(final_msg)
            .context("Failed to send final race result!")?;
    }

    Ok(result)
}

fn get_race_state(race: &Race) -> RaceState {
    RaceState {
        tick: race.cur_tick,
        race_time: race.race_time(),
        horse_states: race.horses().iter().map(HorseState::from).collect(),
    }
}

/// simulate_race runs a complete race without waiting between ticks and without a feed.
pub fn simulate_race<R: Rng>(field: &[HorsePars], pars: &RacePars, rng: &mut R) -> RaceResult {
    let mut race = Race::new(field, pars);
    let active = AtomicBool::new(true);

    match handle_race(&mut race, rng, &mut InstantTicker, &active, None) {
        Ok(result) => result,
        // only sending can fail and there is no sender
        Err(_) => race.get_race_result(),
    }
}

/// RaceHandle owns a race running on its own thread.
pub struct RaceHandle {
    active: Arc<AtomicBool>,
    thread: JoinHandle<anyhow::Result<RaceResult>>,
}

impl RaceHandle {
    /// Starts the race loop on a new thread and returns immediately. Events and the outcome are
    /// delivered through `tx`. Without a seed the random generator is seeded from the OS.
    pub fn start<T: Ticker + Send + 'static>(
        field: Vec<HorsePars>,
        pars: RacePars,
        mut ticker: T,
        seed: Option<u64>,
        tx: Sender<RaceMsg>,
    ) -> RaceHandle {
        let active = Arc::new(AtomicBool::new(true));
        let active_thread = Arc::clone(&active);

        let thread = thread::spawn(move || {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut race = Race::new(&field, &pars);
            handle_race(&mut race, &mut rng, &mut ticker, &active_thread, Some(&tx))
        });

        RaceHandle { active, thread }
    }

    /// Cooperative cancellation: the tick in flight completes, no further tick is run.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn join(self) -> anyhow::Result<RaceResult> {
        self.thread
            .join()
            .map_err(|_| anyhow::anyhow!("Race thread panicked!"))?
    }
}
