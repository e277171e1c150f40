//! The bookable-unit abstraction the watcher works against.

use serde::{Deserialize, Serialize};

/// Which kind of bookable unit an entity is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Tournament,
    Class,
}

impl EntityKind {
    /// Plural form used in CLI subcommands and user-facing messages.
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Tournament => "tournaments",
            EntityKind::Class => "classes",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Tournament => write!(f, "tournament"),
            EntityKind::Class => write!(f, "class"),
        }
    }
}

/// A configured rule scoped to one tenant (club).
pub trait TenantRule: Send + Sync {
    fn tenant_id(&self) -> &str;
}

/// A bookable unit with a stable identity and an availability count.
///
/// Display attributes are kind-specific and only reachable through the
/// concrete types; the change detector only ever sees `id` and
/// `available_slots`.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Per-tenant configuration entry used to fetch and filter this kind.
    type Rule: TenantRule;

    const KIND: EntityKind;

    /// Opaque identifier, unique within the kind and tenant.
    fn id(&self) -> &str;

    /// Open spots at observation time.
    fn available_slots(&self) -> u32;

    /// Primary name, used by blacklists and message headers.
    fn display_name(&self) -> &str;
}
