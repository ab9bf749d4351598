//! District mapping and presentation grouping of municipalities.

use bayan_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::municipality::Municipality;

/// A static partition of municipality names into named districts.
///
/// Supplied as configuration so alternate regional mappings can be
/// substituted without code changes. Lookups are case-insensitive on
/// trimmed names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictMap {
    districts: Vec<(String, Vec<String>)>,
}

impl DistrictMap {
    /// Creates a district map from ordered `(district, municipality names)`
    /// pairs.
    ///
    /// Rejects empty district names and municipality names that appear in
    /// more than one district.
    pub fn new(districts: Vec<(String, Vec<String>)>) -> AppResult<Self> {
        let mut seen: Vec<String> = Vec::new();

        for (district, municipalities) in &districts {
            if district.trim().is_empty() {
                return Err(AppError::Validation(
                    "district name must not be empty".to_owned(),
                ));
            }

            for name in municipalities {
                let normalized = normalize(name);
                if normalized.is_empty() {
                    return Err(AppError::Validation(format!(
                        "district '{district}' contains an empty municipality name"
                    )));
                }
                if seen.contains(&normalized) {
                    return Err(AppError::Validation(format!(
                        "municipality '{name}' is mapped to more than one district"
                    )));
                }
                seen.push(normalized);
            }
        }

        Ok(Self { districts })
    }

    /// Returns the standard three-district partition of the twelve canonical
    /// municipalities, four per district.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            districts: vec![
                (
                    "District I".to_owned(),
                    vec![
                        "ABUCAY".to_owned(),
                        "HERMOSA".to_owned(),
                        "ORANI".to_owned(),
                        "SAMAL".to_owned(),
                    ],
                ),
                (
                    "District II".to_owned(),
                    vec![
                        "BALANGA".to_owned(),
                        "LIMAY".to_owned(),
                        "ORION".to_owned(),
                        "PILAR".to_owned(),
                    ],
                ),
                (
                    "District III".to_owned(),
                    vec![
                        "BAGAC".to_owned(),
                        "DINALUPIHAN".to_owned(),
                        "MARIVELES".to_owned(),
                        "MORONG".to_owned(),
                    ],
                ),
            ],
        }
    }

    /// Returns the configured district names in order.
    pub fn district_names(&self) -> impl Iterator<Item = &str> {
        self.districts.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the district a municipality name belongs to, if any.
    #[must_use]
    pub fn district_of(&self, municipality_name: &str) -> Option<&str> {
        let normalized = normalize(municipality_name);
        self.districts
            .iter()
            .find(|(_, names)| names.iter().any(|name| normalize(name) == normalized))
            .map(|(district, _)| district.as_str())
    }

    /// Partitions municipalities into district buckets.
    ///
    /// Buckets follow the configured district order and preserve input order
    /// within each bucket. A municipality whose name is not in the map is
    /// dropped from the grouped result. Status is not consulted here: the
    /// caller filters the active subset after grouping when the result feeds
    /// a selection control.
    #[must_use]
    pub fn group(&self, municipalities: &[Municipality]) -> Vec<DistrictGroup> {
        let mut groups: Vec<DistrictGroup> = self
            .districts
            .iter()
            .map(|(district, _)| DistrictGroup {
                district: district.clone(),
                municipalities: Vec::new(),
            })
            .collect();

        for municipality in municipalities {
            let Some(district) = self.district_of(&municipality.name) else {
                continue;
            };

            if let Some(group) = groups.iter_mut().find(|group| group.district == district) {
                group.municipalities.push(municipality.clone());
            }
        }

        groups
    }
}

impl Default for DistrictMap {
    fn default() -> Self {
        Self::standard()
    }
}

/// One district bucket produced by [`DistrictMap::group`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictGroup {
    /// District name from the configured mapping.
    pub district: String,
    /// Municipalities in input order.
    pub municipalities: Vec<Municipality>,
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use crate::municipality::{
        FALLBACK_MUNICIPALITY_NAMES, Municipality, MunicipalityId, fallback_municipalities,
    };
    use crate::user::RecordStatus;

    use super::DistrictMap;

    fn named(name: &str) -> Municipality {
        Municipality {
            id: MunicipalityId::from_name(name),
            name: name.to_owned(),
            status: RecordStatus::Active,
            privileges: Vec::new(),
        }
    }

    #[test]
    fn canonical_seed_groups_into_three_districts_of_four() {
        let groups = DistrictMap::standard().group(&fallback_municipalities());

        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|group| group.municipalities.len() == 4));

        let mut covered: Vec<String> = groups
            .iter()
            .flat_map(|group| group.municipalities.iter().map(|m| m.name.clone()))
            .collect();
        covered.sort_unstable();
        let mut expected: Vec<String> = FALLBACK_MUNICIPALITY_NAMES
            .iter()
            .map(|name| (*name).to_owned())
            .collect();
        expected.sort_unstable();
        assert_eq!(covered, expected);
    }

    #[test]
    fn unmapped_municipality_is_dropped_from_grouping() {
        let groups = DistrictMap::standard().group(&[named("NOT_A_REAL_TOWN")]);

        assert!(
            groups
                .iter()
                .all(|group| group.municipalities.is_empty())
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let map = DistrictMap::standard();
        assert_eq!(map.district_of(" orani "), Some("District I"));
        assert_eq!(map.district_of("morong"), Some("District III"));
        assert_eq!(map.district_of("NOT_A_REAL_TOWN"), None);
    }

    #[test]
    fn grouping_preserves_input_order_within_buckets() {
        let groups = DistrictMap::standard().group(&[named("SAMAL"), named("ABUCAY")]);

        let first = &groups[0];
        assert_eq!(first.district, "District I");
        assert_eq!(first.municipalities[0].name, "SAMAL");
        assert_eq!(first.municipalities[1].name, "ABUCAY");
    }

    #[test]
    fn duplicate_mapping_is_rejected() {
        let map = DistrictMap::new(vec![
            ("Left".to_owned(), vec!["ORANI".to_owned()]),
            ("Right".to_owned(), vec!["orani".to_owned()]),
        ]);
        assert!(map.is_err());
    }

    #[test]
    fn grouping_ignores_status() {
        let mut inactive = named("PILAR");
        inactive.status = RecordStatus::Inactive;
        let groups = DistrictMap::standard().group(&[inactive]);

        assert_eq!(groups[1].district, "District II");
        assert_eq!(groups[1].municipalities.len(), 1);
    }
}
