use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts at map coordinates"
)]
pub struct Cli {
    /// Directory holding the persisted workouts.
    ///
    /// Default: the platform data directory for "mapty".
    #[arg(long, env = "MAPTY_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Log a workout at a map location.
    Add {
        #[command(subcommand)]
        workout: AddCmd,
    },

    /// Print logged workouts, oldest first (default).
    List {
        /// Prefix each row with its id and coordinates.
        #[arg(long)]
        details: bool,
    },

    /// Centre the map on a workout.
    Locate { id: Uuid },

    /// Forget every logged workout.
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum AddCmd {
    Running {
        #[command(flatten)]
        at: Session,

        /// Steps per minute.
        #[arg(long, allow_negative_numbers = true)]
        cadence: f64,
    },
    Cycling {
        #[command(flatten)]
        at: Session,

        /// Metres climbed.
        #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
        elevation: f64,
    },
}

#[derive(Args, Debug)]
pub struct Session {
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,

    /// Kilometres.
    #[arg(long, allow_negative_numbers = true)]
    pub distance: f64,

    /// Minutes.
    #[arg(long, allow_negative_numbers = true)]
    pub duration: f64,
}
