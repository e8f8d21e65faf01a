use crate::types::{Coords, WorkoutType};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "waymark.db";

#[derive(Parser, Debug)]
#[command(
    name = "waymark",
    about = "Log running and cycling workouts at map locations"
)]
pub struct Cli {
    /// SQLite file holding the saved workouts. Created if missing.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DB_PATH, global = true)]
    pub db: PathBuf,

    /// Where the map starts, as LAT,LON.
    ///
    /// Default: the newest saved workout's location.
    #[arg(long, value_name = "LAT,LON", global = true)]
    pub home: Option<Coords>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Log a workout at a spot on the map.
    Add {
        #[arg(long = "type", value_enum)]
        kind: WorkoutType,

        /// Kilometers.
        #[arg(long)]
        distance: String,

        /// Minutes.
        #[arg(long)]
        duration: String,

        /// Steps per minute (running).
        #[arg(long, default_value = "")]
        cadence: String,

        /// Meters climbed (cycling).
        #[arg(long, default_value = "")]
        elevation: String,

        /// Where the workout happened, as LAT,LON.
        #[arg(long, value_name = "LAT,LON")]
        at: Coords,
    },

    /// Print the workout list.
    List {
        /// Print the list as HTML list items.
        #[arg(long)]
        html: bool,
    },

    /// Print the markers placed on the map.
    Markers,

    /// Center the map on a workout from the list.
    Show {
        /// Display id shown by `list`.
        id: usize,
    },
}
