//! Command-line front end for the travel journal.
//!
//! # Responsibility
//! - Compose config, logging and the record store at startup.
//! - Translate subcommands into resource requests and print the results.

mod cli;

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use cli::{Command, CommandLine};
use log::info;
use travellist_core::db::open_db;
use travellist_core::resource::parse_order;
use travellist_core::{
    init_logging, share_text, ResourceUri, SqliteTravelTable, StoreConfig, StoreError,
    TravelRecord, TravelResolver, TravelStore, TravelTable, TravelValues,
};

fn main() -> ExitCode {
    let args = CommandLine::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CommandLine) -> Result<(), Box<dyn Error>> {
    let mut config = StoreConfig::from_env();
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(dir) = args.log_dir {
        config.log_dir = Some(dir);
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    if let Some(log_dir) = config.log_dir.as_ref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    info!(
        "event=cli_command module=cli status=start command={}",
        args.command.name()
    );
    let conn = open_db(&config.db_path)?;
    let resolver = TravelResolver::new(TravelStore::new(SqliteTravelTable::try_new(&conn)?));
    execute(&resolver, args.command)
}

fn execute<T: TravelTable>(
    resolver: &TravelResolver<T>,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::List {
            order,
            columns,
            json,
        } => {
            if json || columns.is_some() {
                let mut result =
                    resolver.query("travels", columns.as_deref(), order.as_deref())?;
                let rows = result.collect_rows()?;
                result.close();
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }

            let mut cursor = resolver.store().query(parse_order(order.as_deref())?)?;
            let mut listed = 0usize;
            for record in cursor.records()? {
                println!("{}", list_line(&record?));
                listed += 1;
            }
            cursor.close();
            if listed == 0 {
                println!("No trips yet.");
            } else {
                println!("{listed} trip(s)");
            }
        }
        Command::Show { id } => {
            let record = resolver.store().get_by_id(id)?;
            println!("{}", list_line(&record));
            if let Some(note) = record.note.as_deref() {
                println!("  {note}");
            }
        }
        Command::Add {
            city,
            country,
            year,
            note,
            id,
        } => {
            let values = TravelValues {
                id,
                city: Some(city),
                country: Some(country),
                year: Some(year),
                note,
            };
            let uri = resolver.insert("travels", values)?;
            let record = resolver.store().get_by_id(item_id(uri)?)?;
            println!("Saved trip to {} ({}) as {uri}", record.city, record.year);
        }
        Command::Edit {
            id,
            city,
            country,
            year,
            note,
        } => {
            let uri = ResourceUri::Item(id).to_string();
            let values = TravelValues {
                id: None,
                city,
                country,
                year,
                note,
            };
            resolver.update(&uri, values)?;
            let record = resolver.store().get_by_id(id)?;
            println!("Saved trip to {} ({})", record.city, record.year);
        }
        Command::Delete { id } => {
            let existing = match resolver.store().get_by_id(id) {
                Ok(record) => Some(record),
                Err(StoreError::NotFound(_)) => None,
                Err(err) => return Err(err.into()),
            };
            resolver.delete(&ResourceUri::Item(id).to_string())?;
            match existing {
                Some(record) => println!("Deleted trip to {} ({})", record.city, record.year),
                None => println!("Nothing to delete for id {id}"),
            }
        }
        Command::Share { id } => {
            let record = resolver.store().get_by_id(id)?;
            println!("{}", share_text(&record));
        }
    }
    Ok(())
}

/// `"#<id> <city> (<country>) - Year <year>"`.
fn list_line(record: &TravelRecord) -> String {
    format!(
        "#{} {} ({}) - Year {}",
        record.id, record.city, record.country, record.year
    )
}

fn item_id(uri: ResourceUri) -> Result<i64, Box<dyn Error>> {
    uri.item_id()
        .ok_or_else(|| format!("expected an item address, got `{uri}`").into())
}
