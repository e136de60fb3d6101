use crate::app::DEFAULT_ZOOM;
use crate::types::{FormValues, WorkoutKind};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_STORE_DIR: &str = ".mapty";

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts at map coordinates"
)]
pub struct Cli {
    /// Directory holding the persisted workouts slot.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_STORE_DIR, global = true)]
    pub store: PathBuf,

    /// Zoom level used when the map loads or pans to a workout.
    #[arg(long, default_value_t = DEFAULT_ZOOM, global = true)]
    pub zoom: u8,

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
    /// Print every logged workout, oldest first.
    List,

    /// Log a workout at the given location.
    Log {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        #[command(subcommand)]
        workout: WorkoutArgs,
    },

    /// Overwrite a workout's measurements, optionally switching its kind.
    Edit {
        id: String,

        #[command(subcommand)]
        workout: WorkoutArgs,
    },

    /// Delete a workout.
    Delete { id: String },

    /// Delete every workout.
    Reset,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum WorkoutArgs {
    Running {
        /// km
        #[arg(long, allow_negative_numbers = true)]
        distance: f64,

        /// min
        #[arg(long, allow_negative_numbers = true)]
        duration: f64,

        /// steps/min
        #[arg(long, allow_negative_numbers = true)]
        cadence: f64,
    },
    Cycling {
        /// km
        #[arg(long, allow_negative_numbers = true)]
        distance: f64,

        /// min
        #[arg(long, allow_negative_numbers = true)]
        duration: f64,

        /// Elevation gain in meters; may be negative.
        #[arg(long, allow_negative_numbers = true)]
        elevation: f64,
    },
}

impl WorkoutArgs {
    pub fn form_values(self) -> FormValues {
        match self {
            Self::Running {
                distance,
                duration,
                cadence,
            } => {
                let mut v = FormValues::empty(WorkoutKind::Running);
                v.distance = distance;
                v.duration = duration;
                v.cadence = cadence;
                v
            }
            Self::Cycling {
                distance,
                duration,
                elevation,
            } => {
                let mut v = FormValues::empty(WorkoutKind::Cycling);
                v.distance = distance;
                v.duration = duration;
                v.elevation = elevation;
                v
            }
        }
    }
}
