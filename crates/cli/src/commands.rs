//! Command implementations.
//!
//! Each command builds the inventory service from the environment and calls
//! it directly; there is no running server involved.

use std::path::Path;

use pantry_core::Item;
use pantry_server::completion::CompletionClient;
use pantry_server::config::PantryConfig;
use pantry_server::services::{Classification, InventoryService};
use pantry_server::store::FirestoreClient;

type Service = InventoryService<FirestoreClient, CompletionClient>;
type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Build the inventory service from environment configuration.
fn service() -> Result<Service, Box<dyn std::error::Error>> {
    let config = PantryConfig::from_env()?;
    let store = FirestoreClient::new(&config.firestore);
    let completion = CompletionClient::new(&config.claude);
    Ok(InventoryService::new(store, completion))
}

/// Show the current inventory.
pub async fn list() -> CommandResult {
    let items = service()?.refresh().await?;
    print_items(&items);
    Ok(())
}

/// Show inventory records whose names contain `query`.
pub async fn search(query: &str) -> CommandResult {
    let items = service()?.refresh().await?;
    let matches = pantry_core::search(&items, query);
    print_items(&matches);
    Ok(())
}

/// Add one of a named item.
pub async fn add(name: &str) -> CommandResult {
    let item = service()?.add_one(name).await?;
    println!(
        "Added {} (quantity {})",
        item.name.display_name(),
        item.quantity
    );
    Ok(())
}

/// Remove one of a named item.
pub async fn remove(name: &str) -> CommandResult {
    match service()?.remove_one(name).await? {
        Some(item) => println!(
            "Removed one {} ({} left)",
            item.name.display_name(),
            item.quantity
        ),
        None => println!("Removed {name}"),
    }
    Ok(())
}

/// Delete an item's record regardless of quantity.
pub async fn remove_all(name: &str) -> CommandResult {
    if service()?.remove_all(name).await? {
        println!("Removed {name}");
    } else {
        println!("No such item: {name}");
    }
    Ok(())
}

/// Generate a recipe from the current inventory.
pub async fn recipe() -> CommandResult {
    let recipe = service()?.suggest_recipe().await?;
    println!("{recipe}");
    Ok(())
}

/// Classify a photo and add the item it shows.
pub async fn classify(image: &Path) -> CommandResult {
    let bytes = std::fs::read(image)?;
    let media_type = media_type_for(image);

    match service()?.classify_and_add(&bytes, media_type).await? {
        Classification::Added(item) => println!(
            "Added {} (quantity {})",
            item.name.display_name(),
            item.quantity
        ),
        Classification::NotPantryItem => {
            println!("That doesn't look like a pantry item.");
        }
    }
    Ok(())
}

fn print_items(items: &[Item]) {
    if items.is_empty() {
        println!("(empty)");
        return;
    }
    for item in items {
        println!("{:<32} {}", item.name.display_name(), item.quantity);
    }
}

/// Guess a media type from the file extension. Uploads without a recognized
/// extension are sent as JPEG.
fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}
