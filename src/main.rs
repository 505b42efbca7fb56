mod app;
mod config;
mod gesture;
mod keymap;
mod overlay;
mod script;
mod tools;

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use mapscribe_core::intel::{FeedEntry, IntelStore, Location};
use mapscribe_core::{scene_to_records, ShapeId};
use mapscribe_geometry::{LatLng, Point, WebMercatorView};

use app::App;
use config::Config;

/// Map annotation editor with transform gestures and snapshot undo
#[derive(Parser, Debug)]
#[command(name = "mapscribe")]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file (defaults to $XDG_CONFIG_HOME/mapscribe/config.json)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay an interaction script and print the resulting scene as JSON
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Initial zoom level
        #[arg(long, default_value_t = 2.0)]
        zoom: f64,

        /// Initial map centre latitude
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lat: f64,

        /// Initial map centre longitude
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Manage the intel feed
    #[command(subcommand)]
    Feed(FeedCommand),
    /// Manage notes attached to shapes
    #[command(subcommand)]
    Notes(NotesCommand),
}

#[derive(Subcommand, Debug)]
enum FeedCommand {
    /// List entries, newest first
    List {
        /// Only entries on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Add an entry
    Add {
        title: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        country: String,
        #[arg(long, default_value = "")]
        region: String,
        #[arg(long, default_value = "")]
        place: String,
        /// Comma separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long, default_value = "")]
        text: String,
        /// Link the entry to a shape
        #[arg(long)]
        shape: Option<Uuid>,
    },
    /// Remove an entry by id
    Remove { id: Uuid },
}

#[derive(Subcommand, Debug)]
enum NotesCommand {
    /// List notes for a shape
    List { shape: Uuid },
    /// Add a note to a shape
    Add { shape: Uuid, text: String },
    /// Remove a note from a shape
    Remove { shape: Uuid, note: Uuid },
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mapscribe=info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(args.config.as_deref());

    match args.command {
        Command::Replay { script, zoom, lat, lng } => replay(config, script, zoom, LatLng::new(lat, lng)),
        Command::Feed(cmd) => feed(&config, cmd),
        Command::Notes(cmd) => notes(&config, cmd),
    }
}

fn replay(config: Config, path: PathBuf, zoom: f64, center: LatLng) -> Result<()> {
    let steps = script::load(&path)?;
    let intel = IntelStore::load(config.data_dir());
    let mut app = App::new(config, WebMercatorView::default(), intel);
    app.center_on(center, zoom, Point::new(800.0, 800.0));

    script::run(&mut app, &steps)?;

    let records = scene_to_records(&app.scene);
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn feed(config: &Config, cmd: FeedCommand) -> Result<()> {
    let mut store = IntelStore::load(config.data_dir());
    match cmd {
        FeedCommand::List { date } => {
            let entries: Vec<&FeedEntry> = match date {
                Some(date) => store.entries_on(date).collect(),
                None => store.feed().iter().collect(),
            };
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        FeedCommand::Add {
            title,
            date,
            category,
            country,
            region,
            place,
            tags,
            text,
            shape,
        } => {
            let mut entry = FeedEntry::new(date.unwrap_or_else(|| Utc::now().date_naive()), title);
            entry.category = category;
            entry.location = Location { country, region, place };
            entry.tags = tags.into_iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();
            entry.text = text;
            entry.shape_id = shape.map(ShapeId);
            let id = store.add_entry(entry);
            store.save()?;
            tracing::info!(%id, "feed entry added");
            println!("{id}");
        }
        FeedCommand::Remove { id } => {
            if store.remove_entry(id).is_none() {
                bail!("no feed entry {id}");
            }
            store.save()?;
            tracing::info!(%id, "feed entry removed");
        }
    }
    Ok(())
}

fn notes(config: &Config, cmd: NotesCommand) -> Result<()> {
    let mut store = IntelStore::load(config.data_dir());
    match cmd {
        NotesCommand::List { shape } => {
            println!("{}", serde_json::to_string_pretty(store.notes_for(ShapeId(shape)))?);
        }
        NotesCommand::Add { shape, text } => {
            let id = store.add_note(ShapeId(shape), text);
            store.save()?;
            tracing::info!(%id, %shape, "note added");
            println!("{id}");
        }
        NotesCommand::Remove { shape, note } => {
            if !store.remove_note(ShapeId(shape), note) {
                bail!("no note {note} on shape {shape}");
            }
            store.save()?;
            tracing::info!(%note, %shape, "note removed");
        }
    }
    Ok(())
}
