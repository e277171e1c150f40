//! Domain types shared across CourtWatch crates.

pub mod class;
pub mod entity;
pub mod tournament;

pub use class::{Class, Coach, CourseSummary, Registration, RegistrationInfo, Resource, Tenant};
pub use entity::{Entity, EntityKind, TenantRule};
pub use tournament::{Team, Tournament};

use serde::{Deserialize, Deserializer, Serialize};

/// A registered player, as the booking API reports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Player {
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// The booking API sends `null` for empty lists and strings in places;
/// treat those the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
