pub mod kitsu;

pub use kitsu::{KitsuClient, Season};
