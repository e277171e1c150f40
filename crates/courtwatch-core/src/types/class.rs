//! Academy classes, as served by the v1 booking API.

use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, Player, null_as_default};
use crate::config::ClassFilter;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Class {
    #[serde(deserialize_with = "null_as_default")]
    pub academy_class_id: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub class_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sport_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tenant: Tenant,
    #[serde(deserialize_with = "null_as_default")]
    pub resource: Resource,
    #[serde(deserialize_with = "null_as_default")]
    pub coaches: Vec<Coach>,
    #[serde(deserialize_with = "null_as_default")]
    pub registration_info: RegistrationInfo,
    pub course_summary: Option<CourseSummary>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_canceled: bool,
    pub public_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Tenant {
    #[serde(deserialize_with = "null_as_default")]
    pub tenant_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tenant_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Resource {
    #[serde(deserialize_with = "null_as_default")]
    pub resource_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Coach {
    #[serde(deserialize_with = "null_as_default")]
    pub coach_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistrationInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub registrations: Vec<Registration>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Registration {
    #[serde(deserialize_with = "null_as_default")]
    pub registration_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub player: Player,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CourseSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub course_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(deserialize_with = "null_as_default")]
    pub visibility: String,
    #[serde(deserialize_with = "null_as_default")]
    pub min_players: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub max_players: i32,
}

impl Class {
    /// Course name, when the API included a course summary.
    pub fn course_name(&self) -> Option<&str> {
        self.course_summary.as_ref().map(|c| c.name.as_str())
    }

    pub fn registration_count(&self) -> usize {
        self.registration_info.registrations.len()
    }

    pub fn registrant_names(&self) -> impl Iterator<Item = &str> {
        self.registration_info
            .registrations
            .iter()
            .map(|r| r.player.name.as_str())
    }

    pub fn coach_names(&self) -> impl Iterator<Item = &str> {
        self.coaches.iter().map(|c| c.name.as_str())
    }
}

impl Entity for Class {
    type Rule = ClassFilter;

    const KIND: EntityKind = EntityKind::Class;

    fn id(&self) -> &str {
        &self.academy_class_id
    }

    /// Capacity left in the course; a class without a course summary has
    /// no known capacity and counts as full.
    fn available_slots(&self) -> u32 {
        let Some(course) = &self.course_summary else {
            return 0;
        };
        let registered = i64::try_from(self.registration_count()).unwrap_or(i64::MAX);
        (i64::from(course.max_players) - registered).clamp(0, i64::from(u32::MAX)) as u32
    }

    fn display_name(&self) -> &str {
        match self.course_name() {
            Some(name) if !name.is_empty() => name,
            _ => &self.resource.name,
        }
    }
}
