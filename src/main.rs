#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result, bail};
use clap::Parser;
use mapty::app::{App, WorkoutForm};
use mapty::cli::{self, AddCmd, Cmd};
use mapty::slot::FileSlot;
use mapty::types::Coords;
use mapty::utils;

#[macro_use]
extern crate mapty;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let data_dir = cli.data_dir.unwrap_or_else(utils::default_data_dir);
    dlog!("data_dir={}", data_dir.display());

    let mut app = App::new(FileSlot::new(data_dir));

    match cli.cmd.unwrap_or(Cmd::List { details: false }) {
        Cmd::Add { workout } => {
            let (at, kind, extra) = match workout {
                AddCmd::Running { at, cadence } => (at, "running", cadence),
                AddCmd::Cycling { at, elevation } => (at, "cycling", elevation),
            };

            app.on_map_click(Coords::new(at.lat, at.lng));
            let form = WorkoutForm {
                kind: kind.to_string(),
                distance: at.distance,
                duration: at.duration,
                extra,
            };

            let workout = app.submit(&form).context("adding workout")?;
            println!("{}\t{}", workout.id(), workout.summary_row());
        }
        Cmd::List { details } => {
            let workouts = app.store().workouts();
            if workouts.is_empty() {
                tracing::info!("no workouts logged yet");
            }

            for w in workouts {
                if details {
                    println!("{}\t{}\t{}", w.id(), w.coords(), w.summary_row());
                } else {
                    println!("{}", w.summary_row());
                }
            }
        }
        Cmd::Locate { id } => {
            let Some(view) = app.locate(id).context("locating workout")? else {
                bail!("No workout with id {id}");
            };
            println!("{}\tzoom={}", view.center, view.zoom);
        }
        Cmd::Reset => {
            app.reset().context("resetting workouts")?;
            println!("All workouts removed.");
        }
    }

    Ok(())
}
