//! Genre command handlers

use crate::config::Config;
use crate::db::Store;
use crate::services::{CatalogError, CatalogService, SeaOrmCatalogService};

pub async fn cmd_genre_add(config: &Config, name: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let catalog = SeaOrmCatalogService::new(store, config.catalog.page_size);

    match catalog.create_genre(name).await {
        Ok(genre) => {
            println!("✓ Added genre '{}' (id {})", genre.name, genre.id);
            Ok(())
        }
        Err(CatalogError::Conflict(msg)) => {
            println!("{msg}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn cmd_genre_list(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let genres = store.list_genres().await?;

    if genres.is_empty() {
        println!("No genres yet.");
        println!();
        println!("Add one with: mediashelf genre add \"Drama\"");
        return Ok(());
    }

    println!("Genres ({} total)", genres.len());
    println!("{:-<40}", "");
    for genre in genres {
        println!("{:>5}  {}", genre.id, genre.name);
    }

    Ok(())
}
