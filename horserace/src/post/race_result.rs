use crate::core::race::{AdverseEvent, RaceStatus};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::io::Write as IoWrite;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// RaceEvent is a narrated adverse event as it happened during the race.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RaceEvent {
    pub tick: u64,        // tick in which the event was applied (1-based)
    pub time_s: f64,      // race time in seconds
    pub kind: AdverseEvent,
    pub horse: String,
    pub delta: f64,       // applied progress delta
    pub message: String,
}

/// Standing is one line of the final classification.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Standing {
    pub name: String,
    pub progress: f64,
}

/// RaceResult contains all race information that is required for post-processing the results.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RaceResult {
    pub winner: Option<String>,
    pub status: RaceStatus,
    pub ticks: u64,
    pub race_time: f64,
    pub standings: Vec<Standing>,
    pub events: Vec<RaceEvent>,
}

impl RaceResult {
    fn format_summary(&self) -> Result<String, std::fmt::Error> {
        let mut content = String::new();

        match (&self.winner, self.status) {
            (Some(winner), _) => writeln!(
                &mut content,
                "RESULT: {} won after {} ticks ({:.2}s)",
                winner, self.ticks, self.race_time
            )?,
            (None, RaceStatus::Stopped) => writeln!(
                &mut content,
                "RESULT: Race stopped after {} ticks ({:.2}s), no winner",
                self.ticks, self.race_time
            )?,
            (None, _) => writeln!(&mut content, "RESULT: Race ended without a winner")?,
        }

        writeln!(&mut content, "RESULT: Standings")?;
        for (i, standing) in self.standings.iter().enumerate() {
            writeln!(
                &mut content,
                "{:3}, {:<20} {:6.1}%",
                i + 1,
                standing.name,
                standing.progress * 100.0
            )?;
        }

        writeln!(&mut content, "RESULT: Events ({})", self.events.len())?;
        for event in self.events.iter() {
            writeln!(&mut content, "{:8.2}s, {}", event.time_s, event.message)?;
        }

        Ok(content)
    }

    /// print_summary prints winner, standings and the event log to the console output.
    pub fn print_summary(&self) -> anyhow::Result<()> {
        print!("{}", self.format_summary()?);
        Ok(())
    }

    /// write_to_file writes the summary to a text file. Without a path the file is placed in
    /// output/last_race.txt. Returns the path to the written file.
    pub fn write_to_file(&self, path: Option<&Path>) -> anyhow::Result<String> {
        let content = self.format_summary()?;

        let out_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let out_dir = Path::new("output");
                std::fs::create_dir_all(out_dir).context("Failed to create output directory!")?;
                out_dir.join("last_race.txt")
            }
        };

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&out_path)
            .context(format!("Failed to open result file {}!", out_path.display()))?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        Ok(out_path.to_string_lossy().into_owned())
    }
}

/// BatchSummary aggregates the winners of many independent races on the same field.
#[derive(Debug, Default, Clone)]
pub struct BatchSummary {
    pub no_races: u32,
    pub no_unfinished: u32,
    pub wins: BTreeMap<String, u32>,
}

impl BatchSummary {
    pub fn add(&mut self, result: &RaceResult) {
        self.no_races += 1;
        match &result.winner {
            Some(winner) => *self.wins.entry(winner.to_owned()).or_insert(0) += 1,
            None => self.no_unfinished += 1,
        }
    }

    pub fn merge(mut self, other: BatchSummary) -> BatchSummary {
        self.no_races += other.no_races;
        self.no_unfinished += other.no_unfinished;
        for (name, count) in other.wins {
            *self.wins.entry(name).or_insert(0) += count;
        }
        self
    }

    /// Observed win share of the given horse.
    pub fn win_share(&self, name: &str) -> f64 {
        if self.no_races == 0 {
            return 0.0;
        }
        self.wins.get(name).copied().unwrap_or(0) as f64 / self.no_races as f64
    }

    pub fn print(&self) {
        println!("RESULT: Wins over {} races", self.no_races);
        let mut rows: Vec<(&String, &u32)> = self.wins.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (name, count) in rows {
            println!("{:<20} {:6} ({:5.1}%)", name, count, self.win_share(name) * 100.0);
        }
        if self.no_unfinished > 0 {
            println!("{:<20} {:6}", "(no winner)", self.no_unfinished);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(winner: Option<&str>) -> RaceResult {
        RaceResult {
            winner: winner.map(String::from),
            status: if winner.is_some() {
                RaceStatus::Finished
            } else {
                RaceStatus::Stopped
            },
            ticks: 120,
            race_time: 6.0,
            standings: vec![
                Standing {
                    name: String::from("Comet"),
                    progress: 1.0,
                },
                Standing {
                    name: String::from("Dusty"),
                    progress: 0.52,
                },
            ],
            events: vec![RaceEvent {
                tick: 40,
                time_s: 2.0,
                kind: AdverseEvent::Wind,
                horse: String::from("Dusty"),
                delta: -0.02,
                message: AdverseEvent::Wind.narrate("Dusty"),
            }],
        }
    }

    #[test]
    fn summary_names_winner_and_events() {
        let summary = result(Some("Comet")).format_summary().unwrap();
        assert!(summary.starts_with("RESULT: Comet won after 120 ticks"));
        assert!(summary.contains("Wind slowed Dusty"));
        assert!(summary.contains("  1, Comet"));
    }

    #[test]
    fn summary_of_stopped_race() {
        let summary = result(None).format_summary().unwrap();
        assert!(summary.contains("Race stopped after 120 ticks"));
    }

    #[test]
    fn write_to_explicit_path() {
        let path = std::env::temp_dir()
            .join(format!("horserace_{}_result_test.txt", std::process::id()));
        let written = result(Some("Comet")).write_to_file(Some(&path)).unwrap();
        let content = std::fs::read_to_string(&written).unwrap();
        assert!(content.contains("Comet won"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn batch_summary_counts_wins() {
        let mut a = BatchSummary::default();
        a.add(&result(Some("Comet")));
        a.add(&result(None));
        let mut b = BatchSummary::default();
        b.add(&result(Some("Comet")));
        b.add(&result(Some("Dusty")));

        let total = a.merge(b);

        assert_eq!(total.no_races, 4);
        assert_eq!(total.no_unfinished, 1);
        assert_eq!(total.wins.get("Comet"), Some(&2));
        assert_eq!(total.win_share("Comet"), 0.5);
        assert_eq!(total.win_share("Nobody"), 0.0);
    }
}
