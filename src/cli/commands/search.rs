use crate::clients::KitsuClient;
use crate::config::Config;

pub async fn cmd_search_remote(config: &Config, query: &str) -> anyhow::Result<()> {
    println!("Searching Kitsu for: {query}");

    let kitsu = KitsuClient::new(&config.kitsu)?;
    let results = kitsu.search_anime(query).await?;

    if results.is_empty() {
        println!("No anime found matching '{query}'");
        return Ok(());
    }

    println!();
    println!("Search Results:");
    println!("{:-<60}", "");

    for anime in results.iter().take(10) {
        super::print_anime_line(anime);
        println!();
    }

    println!("To import the first match: kitsudex import \"{query}\"");

    Ok(())
}
