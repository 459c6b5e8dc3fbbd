use crate::util::{parse_datetime, parse_id};
use clap::{Args, Parser, Subcommand};
use eventdeck_core::{
    default_log_level, init_logging, EventFilter, EventStore, EventType, FileBlobStore,
    NoteStore, PersistenceError, StoreConfig,
};
use log::debug;
use std::error::Error;
use std::path::PathBuf;

/// Manage events and notes stored as JSON blobs in a data directory.
#[derive(Debug, Parser)]
#[command(name = "eventdeck", version, about)]
pub struct Cli {
    /// Directory holding the event and note blobs.
    #[arg(long, env = "EVENTDECK_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "EVENTDECK_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Do not insert example events into an empty store.
    #[arg(long, global = true)]
    pub no_seed: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List events by date
    #[command(alias = "ls")]
    List(ListArgs),

    /// Add an event
    Add(AddArgs),

    /// Change fields of an event
    Update(UpdateArgs),

    /// Delete an event
    #[command(alias = "rm")]
    Delete { id: String },

    /// Flip the reminder flag of an event
    Toggle { id: String },

    /// Find events whose title or type contains TEXT
    Search { text: String },

    /// Manage notes
    #[command(subcommand)]
    Note(NoteCommands),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only events of this type
    #[arg(long = "type")]
    pub kind: Option<EventType>,

    /// Only events with a reminder
    #[arg(long)]
    pub reminders: bool,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub title: String,

    /// RFC 3339, `YYYY-MM-DD HH:MM`, `YYYY-MM-DD` or `+Nd`
    #[arg(long)]
    pub date: String,

    #[arg(long = "type", default_value = "other")]
    pub kind: EventType,

    #[arg(long)]
    pub reminder: bool,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub date: Option<String>,

    #[arg(long = "type")]
    pub kind: Option<EventType>,

    #[arg(long)]
    pub reminder: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum NoteCommands {
    /// List notes, newest first
    List,

    /// Add a note
    Add {
        title: String,
        #[arg(default_value = "")]
        content: String,
    },

    /// Replace the title and content of a note
    Update {
        id: String,
        title: String,
        #[arg(default_value = "")]
        content: String,
    },

    /// Delete a note
    Delete { id: String },
}

/// Parses arguments and runs the selected command.
pub fn run() -> Result<(), Box<dyn Error>> {
    Cli::parse().execute()
}

impl Cli {
    pub fn execute(self) -> Result<(), Box<dyn Error>> {
        if let Some(log_dir) = &self.log_dir {
            let level = self.log_level.as_deref().unwrap_or(default_log_level());
            init_logging(level, &log_dir.to_string_lossy())?;
        }

        let data_dir = self
            .data_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("eventdeck"));
        debug!("event=cli_start module=cli data_dir={}", data_dir.display());
        let blob = FileBlobStore::new(data_dir);

        match self.command {
            Commands::Note(command) => run_note(command, blob),
            command => {
                let config = StoreConfig::events().seed_if_empty(!self.no_seed);
                let store = EventStore::open(blob, &config);
                run_event(command, store)
            }
        }
    }
}

fn run_event(
    command: Commands,
    mut store: EventStore<FileBlobStore>,
) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::List(args) => {
            let filter = EventFilter {
                text: String::new(),
                kind: args.kind,
                reminders_only: args.reminders,
            };
            print_events(store.filter(&filter));
        }
        Commands::Search { text } => print_events(store.search(&text)),
        Commands::Add(args) => {
            let date = parse_datetime(&args.date)?;
            let event = store.add(&args.title, date, args.kind, args.reminder)?;
            check_saved(store.last_persistence_error())?;
            println!("{}", event.id());
        }
        Commands::Update(args) => {
            let id = parse_id(&args.id)?;
            let mut event = store
                .get(id)
                .cloned()
                .ok_or_else(|| format!("event not found: {id}"))?;
            if let Some(title) = args.title {
                event.title = title;
            }
            if let Some(date) = args.date {
                event.date = parse_datetime(&date)?;
            }
            if let Some(kind) = args.kind {
                event.kind = kind;
            }
            if let Some(reminder) = args.reminder {
                event.has_reminder = reminder;
            }
            store.update(&event)?;
            check_saved(store.last_persistence_error())?;
        }
        Commands::Delete { id } => {
            let id = parse_id(&id)?;
            if !store.delete_by_id(id) {
                return Err(format!("event not found: {id}").into());
            }
            check_saved(store.last_persistence_error())?;
        }
        Commands::Toggle { id } => {
            let id = parse_id(&id)?;
            let event = store
                .toggle_reminder(id)
                .ok_or_else(|| format!("event not found: {id}"))?;
            check_saved(store.last_persistence_error())?;
            println!("reminder {}", if event.has_reminder { "on" } else { "off" });
        }
        Commands::Note(_) => return Err("note commands run against the note store".into()),
    }
    Ok(())
}

fn run_note(command: NoteCommands, blob: FileBlobStore) -> Result<(), Box<dyn Error>> {
    let mut store = NoteStore::open(blob, &StoreConfig::notes());
    match command {
        NoteCommands::List => {
            for note in store.notes() {
                println!(
                    "{}  {}  {}",
                    note.id(),
                    note.date.format("%Y-%m-%d %H:%M"),
                    note.title
                );
            }
        }
        NoteCommands::Add { title, content } => {
            let note = store.add(&title, &content)?;
            check_saved(store.last_persistence_error())?;
            println!("{}", note.id());
        }
        NoteCommands::Update { id, title, content } => {
            store.update(parse_id(&id)?, &title, &content)?;
            check_saved(store.last_persistence_error())?;
        }
        NoteCommands::Delete { id } => {
            let id = parse_id(&id)?;
            if !store.delete_by_id(id) {
                return Err(format!("note not found: {id}").into());
            }
            check_saved(store.last_persistence_error())?;
        }
    }
    Ok(())
}

fn print_events<'a>(events: impl IntoIterator<Item = &'a eventdeck_core::Event>) {
    for event in events {
        println!(
            "{}  {:<24}  {:<8}  {}  {}",
            event.id(),
            event.formatted_date(),
            event.kind.label(),
            if event.has_reminder { "*" } else { " " },
            event.title
        );
    }
}

fn check_saved(error: Option<&PersistenceError>) -> Result<(), Box<dyn Error>> {
    match error {
        Some(err) => Err(format!("change not saved: {err}").into()),
        None => Ok(()),
    }
}
