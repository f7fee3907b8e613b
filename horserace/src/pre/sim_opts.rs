use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "horserace",
    about = "A tick-based horse race simulator with pari-mutuel payouts"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing of adverse events
    #[clap(short, long)]
    pub debug: bool,

    /// Run the race in real-time and print the live feed
    #[clap(short = 'g', long)]
    pub realtime: bool,

    /// Refund all stakes if nobody backed the winner (default: the pool is retained)
    #[clap(long)]
    pub refund: bool,

    /// Print the horse stats with estimated win probabilities before the race
    #[clap(long)]
    pub odds: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the stable file (if not set, a random stable is generated)
    #[clap(short, long)]
    pub stable_path: Option<PathBuf>,

    /// Write the stable used for this run to the given path
    #[clap(long)]
    pub save_stable: Option<PathBuf>,

    /// Set path to the bet sheet (CSV with header bettor,horse,amount)
    #[clap(short, long)]
    pub bets_path: Option<PathBuf>,

    /// Set path to the race parameter file (if not set, defaults are used)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set number of races, more than one runs a batch without real-time and bets
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set real-time factor (only relevant in real-time mode)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set maximum number of horses entered in the race
    #[clap(short, long, default_value = "6")]
    pub field_size: usize,

    /// Set seed of the random number generator for reproducible races
    #[clap(long)]
    pub seed: Option<u64>,

    /// Set path of the result file
    #[clap(short, long)]
    pub output_path: Option<PathBuf>,
}
