//! Domain primitives shared by the store, the services and the HTTP layer.
//!
//! IDs are newtypes so an anime id can never be passed where a user id is
//! expected. Roles are a closed enum; authorization asks a role for a
//! [`Capability`] instead of comparing names.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an Anime in the catalog.
///
/// # Examples
///
/// ```rust
/// use kitsudex::domain::AnimeId;
///
/// let id = AnimeId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AnimeId(i32);

impl AnimeId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for AnimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AnimeId> for i32 {
    fn from(id: AnimeId) -> Self {
        id.0
    }
}

impl From<i32> for AnimeId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for AnimeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for AnimeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        i32::deserialize(deserializer).map(Self::new)
    }
}

/// Unique identifier for a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        i32::deserialize(deserializer).map(Self::new)
    }
}

/// Derived uniqueness key for a rating: `"{user_id}_{anime_id}"`.
#[must_use]
pub fn user_anime_key(user_id: UserId, anime_id: AnimeId) -> String {
    format!("{user_id}_{anime_id}")
}

/// Something a principal may be allowed to do beyond touching their own data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create, update, import and delete catalog entries.
    ManageCatalog,
    /// Delete comments written by other users.
    ModerateComments,
    /// List, inspect and delete other accounts.
    ManageUsers,
    /// Read the Prometheus metrics endpoint.
    ViewMetrics,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "USER")]
    User,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

impl Role {
    #[must_use]
    pub const fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::User => &[],
            Self::Admin => &[
                Capability::ManageCatalog,
                Capability::ModerateComments,
                Capability::ManageUsers,
                Capability::ViewMetrics,
            ],
        }
    }

    #[must_use]
    pub fn has(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        self.role.has(capability)
    }

    /// True when `owner` is the caller, or the caller's role grants `capability`.
    #[must_use]
    pub fn owns_or_can(&self, owner: UserId, capability: Capability) -> bool {
        self.user_id == owner || self.can(capability)
    }
}

/// A rating value, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RatingValue(u8);

impl RatingValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Returns `None` when `value` is outside `1..=5`.
    #[must_use]
    pub fn new(value: i32) -> Option<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<RatingValue> for i32 {
    fn from(value: RatingValue) -> Self {
        Self::from(value.0)
    }
}

/// Catalog ordering selected by the `sortBy` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Ascending start date
    Oldest,
    /// Descending start date
    Newest,
    /// Ascending episode count
    Lowest,
    /// Descending episode count
    Highest,
}

impl SortBy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oldest => "oldest",
            Self::Newest => "newest",
            Self::Lowest => "lowest",
            Self::Highest => "highest",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oldest" => Ok(Self::Oldest),
            "newest" => Ok(Self::Newest),
            "lowest" => Ok(Self::Lowest),
            "highest" => Ok(Self::Highest),
            other => Err(format!(
                "Unknown sort order '{other}'. Expected one of: oldest, newest, lowest, highest"
            )),
        }
    }
}
