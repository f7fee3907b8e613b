use crate::core::betting::Bet;
use crate::core::race::RacePars;
use crate::core::stable::Stable;
use anyhow::Context;
use std::fs::OpenOptions;
use std::path::Path;

/// read_stable reads the JSON stable file, i.e. `{"horses": [...]}`.
pub fn read_stable(filepath: &Path) -> anyhow::Result<Stable> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!("Failed to open stable file {}!", filepath.display()))?;
    let stable: Stable = serde_json::from_reader(&fh)
        .context(format!("Failed to parse stable file {}!", filepath.display()))?;

    // run the horses through insert so duplicate names collapse
    Ok(Stable::from_horses(stable.horses().to_vec()))
}

/// write_stable writes the stable as pretty-printed JSON.
pub fn write_stable(stable: &Stable, filepath: &Path) -> anyhow::Result<()> {
    let fh = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(filepath)
        .context(format!("Failed to create stable file {}!", filepath.display()))?;
    serde_json::to_writer_pretty(&fh, stable)
        .context(format!("Failed to write stable file {}!", filepath.display()))?;
    Ok(())
}

/// read_race_pars reads the race parameters. Missing fields take their defaults.
pub fn read_race_pars(filepath: &Path) -> anyhow::Result<RacePars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!("Failed to open parameter file {}!", filepath.display()))?;
    let pars = serde_json::from_reader(&fh)
        .context(format!("Failed to parse parameter file {}!", filepath.display()))?;
    Ok(pars)
}

/// read_bets reads a bet sheet in CSV format with the header `bettor,horse,amount`.
pub fn read_bets(filepath: &Path) -> anyhow::Result<Vec<Bet>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(filepath)
        .context(format!("Failed to open bet sheet {}!", filepath.display()))?;

    let mut bets = Vec::new();
    for (i, record) in reader.deserialize::<Bet>().enumerate() {
        let bet = record.context(format!(
            "Failed to parse line {} of bet sheet {}!",
            i + 2,
            filepath.display()
        ))?;
        bets.push(bet);
    }
    Ok(bets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::race::TieBreak;
    use std::io::Write;
    use std::path::PathBuf;

    /// Path in the temp dir that is unique per test and process.
    fn tmp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("horserace_{}_{}", std::process::id(), name))
    }

    fn tmp_file(name: &str, content: &str) -> PathBuf {
        let path = tmp_path(name);
        let mut fh = std::fs::File::create(&path).unwrap();
        fh.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn stable_round_trip_through_file() {
        let path = tmp_file(
            "stable_test.json",
            r##"{"horses": [
                {"name": "Comet", "speed": 1.2, "stamina": 0.3, "luck": 0.8,
                 "experience": 0.1, "color": "#FFA500"},
                {"name": "Dusty", "speed": 1.1},
                {"name": "Comet", "speed": 1.4}
            ]}"##,
        );

        let stable = read_stable(&path).unwrap();
        assert_eq!(stable.len(), 2);
        assert_eq!(stable.get("Comet").map(|h| h.speed), Some(1.4));

        let out = tmp_path("stable_test_out.json");
        write_stable(&stable, &out).unwrap();
        assert_eq!(read_stable(&out).unwrap(), stable);

        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(out);
    }

    #[test]
    fn race_pars_use_defaults() {
        let path = tmp_file(
            "pars_test.json",
            r#"{"p_event": 0.05, "tie_break": "random"}"#,
        );

        let pars = read_race_pars(&path).unwrap();
        assert_eq!(pars.p_event, 0.05);
        assert_eq!(pars.tie_break, TieBreak::Random);
        assert_eq!(pars.base_rate, RacePars::default().base_rate);
        assert_eq!(pars.tick_interval_ms, 50);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn bet_sheet_is_parsed() {
        let path = tmp_file(
            "bets_test.csv",
            "bettor,horse,amount\nAna, Comet, 30\nBen,Dusty,70\n",
        );

        let bets = read_bets(&path).unwrap();
        assert_eq!(bets.len(), 2);
        assert_eq!(bets[0].horse, "Comet");
        assert_eq!(bets[1].amount, 70);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn broken_bet_sheet_names_line() {
        let path = tmp_file(
            "bets_broken_test.csv",
            "bettor,horse,amount\nAna,Comet,thirty\n",
        );

        let err = read_bets(&path).unwrap_err();
        assert!(format!("{}", err).contains("line 2"));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_stable(Path::new("/nonexistent/stable.json")).is_err());
    }
}
