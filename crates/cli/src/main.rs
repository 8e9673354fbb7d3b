//! Pantry Tracker CLI - terminal access to the inventory.
//!
//! # Usage
//!
//! ```bash
//! # Show the current inventory
//! pantry list
//!
//! # Filter by a name substring
//! pantry search rice
//!
//! # Mutate the inventory
//! pantry add "Olive Oil"
//! pantry remove "olive oil"
//! pantry remove-all rice
//!
//! # Assistant features
//! pantry recipe
//! pantry classify photo.jpg
//! ```
//!
//! Configuration comes from the same environment variables as the server
//! (see the `pantry-server` config module docs).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pantry")]
#[command(author, version, about = "Pantry Tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current inventory
    List,
    /// Filter the inventory by a name substring
    Search {
        /// Case-insensitive substring to match against item names
        query: String,
    },
    /// Add one of a named item (creates the record at 1)
    Add {
        /// Item name; normalized before use
        name: String,
    },
    /// Remove one of a named item (deletes the record at 0)
    Remove {
        /// Item name; normalized before use
        name: String,
    },
    /// Delete an item's record regardless of quantity
    RemoveAll {
        /// Item name; normalized before use
        name: String,
    },
    /// Generate a recipe from the current inventory
    Recipe,
    /// Classify a photo and add the item it shows
    Classify {
        /// Path to the image file
        image: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::List => commands::list().await?,
        Commands::Search { query } => commands::search(&query).await?,
        Commands::Add { name } => commands::add(&name).await?,
        Commands::Remove { name } => commands::remove(&name).await?,
        Commands::RemoveAll { name } => commands::remove_all(&name).await?,
        Commands::Recipe => commands::recipe().await?,
        Commands::Classify { image } => commands::classify(&image).await?,
    }

    Ok(())
}
