//! Create-admin command handler

use crate::config::Config;
use crate::db::Store;
use crate::domain::Role;
use crate::services::{Registration, SeaOrmAuthService};

pub async fn cmd_create_admin(
    config: &Config,
    registration: Registration,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let auth = SeaOrmAuthService::new(store, config.security.clone());

    let user = auth.create_account(registration, Role::Admin).await?;
    println!("✓ Created admin '{}' (id {})", user.username, user.id);

    Ok(())
}
