//! Municipality records and the fixed fallback seed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::RECOGNIZED_FEATURES;
use crate::user::RecordStatus;

/// Unique identifier for a municipality record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MunicipalityId(Uuid);

impl MunicipalityId {
    /// Creates a new random municipality identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a municipality identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Derives a stable identifier from a municipality name.
    ///
    /// Repeated fallback seeding must yield the same identifiers, so seed
    /// records use a v5 UUID over the name instead of a random one.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MunicipalityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MunicipalityId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A named administrative region users and grants are scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    /// Store-assigned identifier.
    pub id: MunicipalityId,
    /// Municipality name, unique within an active district mapping.
    pub name: String,
    /// Activation state; only active municipalities feed selection controls.
    pub status: RecordStatus,
    /// Ordered capability strings inherited by the municipality's users
    /// for display purposes.
    pub privileges: Vec<String>,
}

impl Municipality {
    /// Returns whether the municipality is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }
}

/// Canonical municipality names, in district order.
pub const FALLBACK_MUNICIPALITY_NAMES: [&str; 12] = [
    "ABUCAY",
    "HERMOSA",
    "ORANI",
    "SAMAL",
    "BALANGA",
    "LIMAY",
    "ORION",
    "PILAR",
    "BAGAC",
    "DINALUPIHAN",
    "MARIVELES",
    "MORONG",
];

/// Returns the fixed seed list substituted when the store has no
/// municipality records.
///
/// All twelve canonical municipalities, active, with the standard privilege
/// set and stable name-derived identifiers.
#[must_use]
pub fn fallback_municipalities() -> Vec<Municipality> {
    FALLBACK_MUNICIPALITY_NAMES
        .iter()
        .map(|name| Municipality {
            id: MunicipalityId::from_name(name),
            name: (*name).to_owned(),
            status: RecordStatus::Active,
            privileges: RECOGNIZED_FEATURES
                .iter()
                .map(|feature| (*feature).to_owned())
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{FALLBACK_MUNICIPALITY_NAMES, MunicipalityId, fallback_municipalities};

    #[test]
    fn fallback_seed_has_twelve_active_entries() {
        let seeded = fallback_municipalities();
        assert_eq!(seeded.len(), 12);
        assert!(seeded.iter().all(super::Municipality::is_active));
        assert_eq!(seeded[0].name, "ABUCAY");
        assert_eq!(seeded[11].name, "MORONG");
    }

    #[test]
    fn fallback_seed_names_are_unique() {
        let mut names: Vec<&str> = FALLBACK_MUNICIPALITY_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn seed_identifiers_are_stable_across_calls() {
        assert_eq!(
            MunicipalityId::from_name("ORANI"),
            MunicipalityId::from_name("ORANI")
        );
        assert_eq!(fallback_municipalities(), fallback_municipalities());
    }
}
