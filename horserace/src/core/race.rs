use crate::core::horse::{Horse, HorsePars};
use crate::post::race_result::{RaceEvent, RaceResult, Standing};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// * `base_rate` - Progress per tick of a horse with speed 1.0
/// * `p_event` - Probability per horse and tick that an adverse event is rolled
/// * `tick_interval_ms` - (ms) Wall clock interval between two ticks in real-time mode
/// * `floor_progress` - Clamp progress at the start line when an adverse event hits
/// * `tie_break` - How a winner is picked if several horses are past the line when the finish is
/// detected
/// * `max_ticks` - Optional bound after which the race driver gives up
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RacePars {
    pub base_rate: f64,
    pub p_event: f64,
    pub tick_interval_ms: u64,
    pub floor_progress: bool,
    pub tie_break: TieBreak,
    pub max_ticks: Option<u64>,
}

impl Default for RacePars {
    fn default() -> Self {
        RacePars {
            base_rate: 0.001,
            p_event: 0.02,
            tick_interval_ms: 50,
            floor_progress: true,
            tie_break: TieBreak::IterationOrder,
            max_ticks: None,
        }
    }
}

impl RacePars {
    /// Race time in seconds after the given number of ticks.
    pub fn race_time(&self, tick: u64) -> f64 {
        tick as f64 * self.tick_interval_ms as f64 / 1000.0
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First horse in field order wins
    IterationOrder,
    /// Uniform draw among the horses past the line
    Random,
}

impl TieBreak {
    fn resolve<R: Rng>(&self, finishers: &[usize], rng: &mut R) -> usize {
        match self {
            TieBreak::IterationOrder => finishers[0],
            TieBreak::Random => finishers[rng.gen_range(0..finishers.len())],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdverseEvent {
    Wind,
    TrackCondition,
    Collision,
}

pub const ADVERSE_EVENTS: [AdverseEvent; 3] = [
    AdverseEvent::Wind,
    AdverseEvent::TrackCondition,
    AdverseEvent::Collision,
];

impl AdverseEvent {
    pub fn progress_delta(&self) -> f64 {
        match self {
            AdverseEvent::Wind => -0.02,
            AdverseEvent::TrackCondition => -0.015,
            AdverseEvent::Collision => -0.03,
        }
    }

    pub fn narrate(&self, horse_name: &str) -> String {
        match self {
            AdverseEvent::Wind => format!("💨 Wind slowed {}!", horse_name),
            AdverseEvent::TrackCondition => format!("🌧️ Track affected {}!", horse_name),
            AdverseEvent::Collision => format!("🐎 Collision! {} lost speed!", horse_name),
        }
    }
}

impl fmt::Display for AdverseEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AdverseEvent::Wind => write!(f, "wind"),
            AdverseEvent::TrackCondition => write!(f, "track condition"),
            AdverseEvent::Collision => write!(f, "collision"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RaceStatus {
    Ready,
    Running,
    Finished,
    Stopped,
}

/// TickReport contains what happened during a single tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub events: Vec<RaceEvent>,
    pub winner: Option<String>,
    pub finished: bool,
}

#[derive(Debug)]
pub struct Race {
    pub pars: RacePars,
    pub cur_tick: u64,
    status: RaceStatus,
    horses: Vec<Horse>,
    winner: Option<usize>,
    event_log: Vec<RaceEvent>,
}

impl Race {
    pub fn new(field: &[HorsePars], pars: &RacePars) -> Race {
        Race {
            pars: pars.to_owned(),
            cur_tick: 0,
            status: RaceStatus::Ready,
            horses: field.iter().map(Horse::new).collect(),
            winner: None,
            event_log: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // STATE MACHINE -------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn start(&mut self) {
        if self.status == RaceStatus::Ready {
            info!("Race started with {} horses", self.horses.len());
            self.status = RaceStatus::Running;
        }
    }

    /// Cooperative stop. Progress already applied stays as it is.
    pub fn stop(&mut self) {
        if matches!(self.status, RaceStatus::Ready | RaceStatus::Running) {
            info!("Race stopped at tick {}", self.cur_tick);
            self.status = RaceStatus::Stopped;
        }
    }

    /// Puts every horse back to the start line and clears the event log, whatever the previous
    /// outcome was.
    pub fn reset(&mut self) {
        for horse in self.horses.iter_mut() {
            horse.reset();
        }
        self.event_log.clear();
        self.winner = None;
        self.cur_tick = 0;
        self.status = RaceStatus::Ready;
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// The method simulates one tick. The horses are processed in field order: a horse advances
    /// and rolls for an adverse event until the first horse that crossed the line during an
    /// earlier tick is reached. Then the winner is declared among the horses past the line and the
    /// remaining horses are not processed.
    pub fn simulate_tick<R: Rng>(&mut self, rng: &mut R) -> TickReport {
        let mut report = TickReport::default();

        if self.status != RaceStatus::Running {
            report.finished = self.is_over();
            return report;
        }

        if self.horses.is_empty() {
            self.finish(None);
            report.finished = true;
            return report;
        }

        self.cur_tick += 1;

        // horses past the line when the tick starts
        let finishers: Vec<usize> = self
            .horses
            .iter()
            .enumerate()
            .filter(|(_, horse)| horse.has_finished())
            .map(|(i, _)| i)
            .collect();
        let idx_first_finisher = finishers.first().copied().unwrap_or(self.horses.len());

        // progress and adverse events
        let race_time = self.pars.race_time(self.cur_tick);

        for horse in self.horses[..idx_first_finisher].iter_mut() {
            horse.advance(self.pars.base_rate);

            if rng.gen::<f64>() < self.pars.p_event {
                let kind = ADVERSE_EVENTS[rng.gen_range(0..ADVERSE_EVENTS.len())];
                let affected = rng.gen::<f64>() > horse.luck;

                if affected {
                    horse.apply_delta(kind.progress_delta(), self.pars.floor_progress);

                    let event = RaceEvent {
                        tick: self.cur_tick,
                        time_s: race_time,
                        kind,
                        horse: horse.name.to_owned(),
                        delta: kind.progress_delta(),
                        message: kind.narrate(&horse.name),
                    };
                    debug!("{:.2}s: {}", race_time, event.message);
                    report.events.push(event);
                }
            }
        }

        self.event_log.extend(report.events.iter().cloned());

        // finish detection
        if !finishers.is_empty() {
            let idx_winner = self.pars.tie_break.resolve(&finishers, rng);
            self.finish(Some(idx_winner));
            report.winner = Some(self.horses[idx_winner].name.to_owned());
            report.finished = true;
        }

        report
    }

    fn finish(&mut self, idx_winner: Option<usize>) {
        self.winner = idx_winner;
        self.status = RaceStatus::Finished;

        match idx_winner {
            Some(idx) => info!(
                "{} won after {} ticks ({:.2}s)",
                self.horses[idx].name,
                self.cur_tick,
                self.pars.race_time(self.cur_tick)
            ),
            None => info!("Race finished without a winner"),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn status(&self) -> RaceStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, RaceStatus::Finished | RaceStatus::Stopped)
    }

    pub fn winner(&self) -> Option<&Horse> {
        self.winner.map(|idx| &self.horses[idx])
    }

    pub fn horses(&self) -> &[Horse] {
        &self.horses
    }

    pub fn event_log(&self) -> &[RaceEvent] {
        &self.event_log
    }

    pub fn race_time(&self) -> f64 {
        self.pars.race_time(self.cur_tick)
    }

    /// Horse indices ordered by progress, leader first. Equal progress keeps field order.
    pub fn standings(&self) -> Vec<usize> {
        let mut idxs: Vec<usize> = (0..self.horses.len()).collect();
        idxs.sort_by(|&a, &b| {
            self.horses[b]
                .progress()
                .partial_cmp(&self.horses[a].progress())
                .unwrap_or(Ordering::Equal)
        });
        // the winner leads even if another horse is level with it
        if let Some(idx_winner) = self.winner {
            idxs.retain(|&idx| idx != idx_winner);
            idxs.insert(0, idx_winner);
        }
        idxs
    }

    pub fn get_race_result(&self) -> RaceResult {
        RaceResult {
            winner: self.winner().map(|horse| horse.name.to_owned()),
            status: self.status,
            ticks: self.cur_tick,
            race_time: self.race_time(),
            standings: self
                .standings()
                .into_iter()
                .map(|idx| Standing {
                    name: self.horses[idx].name.to_owned(),
                    progress: self.horses[idx].progress(),
                })
                .collect(),
            events: self.event_log.to_owned(),
        }
    }

    #[cfg(test)]
    pub(crate) fn horses_mut(&mut self) -> &mut [Horse] {
        &mut self.horses
    }
}
