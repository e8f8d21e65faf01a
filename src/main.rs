#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use waymark::cli::{self, Cmd};
use waymark::controller::{FixedLocator, Session, WorkoutForm};
use waymark::persistence::{PersistenceAdapter, SqliteKv};
use waymark::present::{self, RecordingMap};
use waymark::utils;

#[macro_use]
extern crate waymark;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let kv = SqliteKv::open(&cli.db)?;
    let mut session: Session<SqliteKv, RecordingMap> = Session::load(PersistenceAdapter::new(kv))
        .with_context(|| format!("Loading workouts from {}", cli.db.display()))?;
    dlog!(
        "db={} workouts={}",
        cli.db.display(),
        session.store().len()
    );

    let home = cli.home.or_else(|| {
        utils::last_known_position(session.store().all().iter().map(|w| &w.coords))
    });

    match cli.cmd {
        Cmd::List { html } => {
            for item in session.list_view() {
                if html {
                    println!("{}", item.to_html());
                } else {
                    println!("{item}");
                }
            }
            Ok(())
        }
        Cmd::Add {
            kind,
            distance,
            duration,
            cadence,
            elevation,
            at,
        } => {
            // The new workout's own spot is a fine map center for a first run.
            let locator = FixedLocator(home.or(Some(at)));
            session.init_map(&locator, RecordingMap::new)?;
            session.map_click(at)?;

            let form = WorkoutForm {
                kind,
                distance,
                duration,
                cadence,
                elevation,
            };
            let id = session.submit(&form)?;
            if let Some(item) = session.list_view().last() {
                println!("{item}");
            }
            dlog!("added id={id}");
            Ok(())
        }
        Cmd::Markers => {
            session.init_map(&FixedLocator(home), RecordingMap::new)?;
            if let Some(map) = session.map() {
                println!("center {} zoom {}", map.center, map.zoom);
                for m in &map.markers {
                    println!("{}\t{}", m.coords, m.popup);
                }
            }
            Ok(())
        }
        Cmd::Show { id } => {
            session.init_map(&FixedLocator(home), RecordingMap::new)?;
            let coords = session.go_to_workout(id)?;
            if let Some(item) = session.list_view().get(id) {
                println!("{item}");
            }
            println!("map centered on {coords} zoom {}", present::WORKOUT_ZOOM);
            Ok(())
        }
    }
}
