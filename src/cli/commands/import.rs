//! Import command handler

use crate::config::Config;
use crate::services::AnimeError;
use crate::state::SharedState;

pub async fn cmd_import(config: Config, title: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    match state
        .anime_service
        .import_by_title(&super::operator(), title)
        .await
    {
        Ok(anime) => {
            println!("✓ Imported '{}' as anime {}", anime.title, anime.id);
            Ok(())
        }
        Err(AnimeError::Conflict(existing)) => {
            println!("'{existing}' is already in the catalog");
            Ok(())
        }
        Err(AnimeError::TitleNotFound(_)) => {
            println!("Kitsu has no anime matching '{title}'");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
