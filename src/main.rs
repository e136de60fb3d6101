#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result, bail};
use clap::Parser;
use mapty::app::{App, AppConfig};
use mapty::session::Submission;
use mapty::storage::FileStorage;
use mapty::term::{self, TextForm, TextList, TextMap};
use mapty::types::{Coords, FormField};
use mapty::{cli, utils};

#[macro_use]
extern crate mapty;

type TermApp = App<TextMap, TextList, TextForm, FileStorage>;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let config = AppConfig {
        zoom: cli.zoom,
        ..AppConfig::default()
    };
    let storage = FileStorage::new(&cli.store);
    dlog!("store={} zoom={}", storage.dir().display(), config.zoom);

    let mut app: TermApp = App::start(
        config,
        TextMap::default(),
        TextList::default(),
        TextForm::default(),
        storage,
    )
    .with_context(|| format!("restoring workouts from {}", cli.store.display()))?;

    match cli.cmd {
        cli::Cmd::List => {
            let entries = app.views().list().entries();
            if entries.is_empty() {
                tracing::info!("no workouts logged yet");
            }
            for e in entries {
                println!("{}", term::format_entry(e));
            }
        }
        cli::Cmd::Log { lat, lng, workout } => {
            let here = Coords::new(lat, lng);
            // No position source here: the map centres on the logged point.
            app.position_resolved(Ok(here));
            app.map_clicked(here);
            app.field_focused(FormField::Intensity);

            let submission = app.submit(workout.form_values())?;
            print_outcome(&app, submission)?;
        }
        cli::Cmd::Edit { id, workout } => {
            app.store().find_by_id(&id)?;
            app.edit_requested(&id);
            app.field_focused(FormField::Intensity);

            let submission = app.submit(workout.form_values())?;
            print_outcome(&app, submission)?;
        }
        cli::Cmd::Delete { id } => {
            app.store().find_by_id(&id)?;
            app.delete_requested(&id)?;
            println!("deleted {id}");
        }
        cli::Cmd::Reset => {
            let n = app.store().len();
            app.reset()?;
            println!("deleted {n} workouts");
        }
    }

    Ok(())
}

fn print_outcome(app: &TermApp, submission: Submission) -> Result<()> {
    let id = match submission {
        Submission::Create(w) => w.id().to_string(),
        Submission::Edit { id, .. } => id,
        Submission::Rejected(e) => bail!("{e}"),
        Submission::FocusAdvanced(_) | Submission::Ignored => {
            bail!("form was not submitted")
        }
    };

    let entry = app
        .views()
        .list()
        .entries()
        .iter()
        .find(|e| e.id == id)
        .with_context(|| format!("workout {id} missing from list"))?;
    dlog!("markers_on_map={}", app.views().map().marker_count());
    println!("{}", term::format_entry(entry));
    Ok(())
}
