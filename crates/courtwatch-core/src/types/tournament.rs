//! Tournaments, as served by the v2 booking API.

use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, Player, null_as_default};
use crate::config::TournamentFilter;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Tournament {
    #[serde(deserialize_with = "null_as_default")]
    pub tournament_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub visibility: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub available_places: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Team {
    #[serde(deserialize_with = "null_as_default")]
    pub team_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub players: Vec<Player>,
}

impl Tournament {
    /// Names of every player registered in any team.
    pub fn participant_names(&self) -> impl Iterator<Item = &str> {
        self.teams
            .iter()
            .flat_map(|team| team.players.iter())
            .map(|p| p.name.as_str())
    }
}

impl Entity for Tournament {
    type Rule = TournamentFilter;

    const KIND: EntityKind = EntityKind::Tournament;

    fn id(&self) -> &str {
        &self.tournament_id
    }

    fn available_slots(&self) -> u32 {
        self.available_places.max(0) as u32
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}
