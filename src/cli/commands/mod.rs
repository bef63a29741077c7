mod admin;
mod import;
mod init;
mod list;
mod search;

pub use admin::cmd_create_admin;
pub use import::cmd_import;
pub use init::cmd_init;
pub use list::cmd_list_anime;
pub use search::cmd_search_remote;

use crate::domain::{Principal, Role, UserId};

/// The local operator. Shell access to the server implies admin rights.
fn operator() -> Principal {
    Principal {
        user_id: UserId::new(0),
        username: "cli".to_string(),
        role: Role::Admin,
    }
}

fn print_anime_line(anime: &crate::models::AnimeDraft) {
    let eps = anime
        .episode_count
        .map_or_else(|| "? eps".to_string(), |e| format!("{e} eps"));
    let started = anime
        .start_date
        .map_or_else(|| "?".to_string(), |d| d.to_string());

    println!("• {} ({eps})", anime.title);
    println!(
        "  Type: {} | Status: {} | Started: {started}",
        anime.subtype.as_deref().unwrap_or("?"),
        anime.status.as_deref().unwrap_or("?"),
    );
}
