//! List catalog command handler

use crate::config::Config;
use crate::domain::SortBy;
use crate::services::CatalogFilter;
use crate::state::SharedState;

pub async fn cmd_list_anime(
    config: Config,
    title: Option<String>,
    subtype: Option<String>,
    status: Option<String>,
    sort: Option<&str>,
) -> anyhow::Result<()> {
    let sort_by = sort
        .map(str::parse::<SortBy>)
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let state = SharedState::new(config).await?;
    let filter = CatalogFilter {
        title,
        subtype,
        status,
        sort_by,
    }
    .normalized();

    let anime_list = state.anime_service.query(&filter).await?;

    if anime_list.is_empty() {
        println!("No anime in the catalog matches.");
        println!();
        println!("Import one with: kitsudex import \"anime name\"");
        return Ok(());
    }

    println!("Catalog ({} shown)", anime_list.len());
    println!("{:-<70}", "");

    for anime in anime_list {
        let eps = anime
            .episode_count
            .map_or_else(|| "?".to_string(), |e| e.to_string());
        let started = anime
            .start_date
            .map_or_else(|| "?".to_string(), |d| d.to_string());

        println!("{} [{} eps]", anime.title, eps);
        println!(
            "  ID: {} | Type: {} | Status: {} | Started: {}",
            anime.id,
            anime.subtype.as_deref().unwrap_or("?"),
            anime.status.as_deref().unwrap_or("?"),
            started
        );
    }

    Ok(())
}
