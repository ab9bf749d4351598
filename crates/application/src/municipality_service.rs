//! Municipality ports and application service.
//!
//! Wraps the external store's municipality collection with the fixed
//! fallback seed and the district/selection projections the console views
//! consume.

use std::sync::Arc;

use async_trait::async_trait;

use bayan_core::{AppResult, OperatorIdentity};
use bayan_domain::{AccessPolicy, DistrictGroup, DistrictMap, Municipality, fallback_municipalities};

/// Repository port for the external municipality collection.
#[async_trait]
pub trait MunicipalityRepository: Send + Sync {
    /// Lists every municipality record, in stable store order.
    async fn list_municipalities(&self) -> AppResult<Vec<Municipality>>;
}

/// Application service for municipality lookups and grouping.
#[derive(Clone)]
pub struct MunicipalityService {
    repository: Arc<dyn MunicipalityRepository>,
    policy: AccessPolicy,
    district_map: DistrictMap,
}

impl MunicipalityService {
    /// Creates a municipality service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn MunicipalityRepository>,
        policy: AccessPolicy,
        district_map: DistrictMap,
    ) -> Self {
        Self {
            repository,
            policy,
            district_map,
        }
    }

    /// Lists municipalities, substituting the fixed fallback seed when the
    /// store has none.
    ///
    /// An empty store is a recovered condition, not an error.
    pub async fn list_municipalities(&self) -> AppResult<Vec<Municipality>> {
        let stored = self.repository.list_municipalities().await?;

        if stored.is_empty() {
            tracing::debug!("municipality store returned no records, substituting fallback seed");
            return Ok(fallback_municipalities());
        }

        Ok(stored)
    }

    /// Projects the municipality set the operator may see.
    pub async fn accessible_municipalities(
        &self,
        operator: &OperatorIdentity,
    ) -> AppResult<Vec<Municipality>> {
        let municipalities = self.list_municipalities().await?;
        Ok(self
            .policy
            .accessible_municipalities(operator, &municipalities))
    }

    /// Groups municipalities into district buckets for the selection
    /// control.
    ///
    /// The grouper keeps every mapped record; the active-subset filter is
    /// applied here, after grouping, because this projection feeds a UI
    /// selection control.
    pub async fn district_groups(&self) -> AppResult<Vec<DistrictGroup>> {
        let municipalities = self.list_municipalities().await?;
        let mut groups = self.district_map.group(&municipalities);

        for group in &mut groups {
            group.municipalities.retain(Municipality::is_active);
        }

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use bayan_core::{AppResult, OperatorIdentity, Role};
    use bayan_domain::{
        AccessPolicy, DistrictMap, FALLBACK_MUNICIPALITY_NAMES, FeatureGrants, Municipality,
        MunicipalityId, RecordStatus,
    };

    use super::{MunicipalityRepository, MunicipalityService};

    struct FakeMunicipalityRepository {
        municipalities: Vec<Municipality>,
    }

    #[async_trait]
    impl MunicipalityRepository for FakeMunicipalityRepository {
        async fn list_municipalities(&self) -> AppResult<Vec<Municipality>> {
            Ok(self.municipalities.clone())
        }
    }

    fn named(name: &str, status: RecordStatus) -> Municipality {
        Municipality {
            id: MunicipalityId::from_name(name),
            name: name.to_owned(),
            status,
            privileges: Vec::new(),
        }
    }

    fn service_over(municipalities: Vec<Municipality>) -> MunicipalityService {
        MunicipalityService::new(
            Arc::new(FakeMunicipalityRepository { municipalities }),
            AccessPolicy::new(FeatureGrants::new()),
            DistrictMap::standard(),
        )
    }

    #[tokio::test]
    async fn empty_store_yields_the_twelve_entry_fallback() {
        let listed = service_over(Vec::new()).list_municipalities().await;
        assert!(listed.is_ok());

        let municipalities = listed.unwrap_or_default();
        assert_eq!(municipalities.len(), 12);
        assert!(municipalities.iter().all(Municipality::is_active));

        let names: Vec<&str> = municipalities
            .iter()
            .map(|municipality| municipality.name.as_str())
            .collect();
        assert_eq!(names, FALLBACK_MUNICIPALITY_NAMES.to_vec());
    }

    #[tokio::test]
    async fn non_empty_store_passes_through_unchanged() {
        let stored = vec![named("ORANI", RecordStatus::Active)];
        let listed = service_over(stored.clone()).list_municipalities().await;
        assert!(listed.is_ok());
        assert_eq!(listed.unwrap_or_default(), stored);
    }

    #[tokio::test]
    async fn district_groups_keep_only_active_municipalities() {
        let service = service_over(vec![
            named("ORANI", RecordStatus::Active),
            named("ABUCAY", RecordStatus::Inactive),
            named("MORONG", RecordStatus::Active),
        ]);

        let groups = service.district_groups().await;
        assert!(groups.is_ok());

        let groups = groups.unwrap_or_default();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].district, "District I");
        assert_eq!(groups[0].municipalities.len(), 1);
        assert_eq!(groups[0].municipalities[0].name, "ORANI");
        assert!(groups[1].municipalities.is_empty());
        assert_eq!(groups[2].municipalities.len(), 1);
    }

    #[tokio::test]
    async fn accessible_set_is_scoped_by_the_policy() {
        let service = service_over(Vec::new());
        let scoped = OperatorIdentity::new(
            "op-1",
            "Operator One",
            None,
            Role::User,
            Some("ORANI".to_owned()),
        );

        let accessible = service.accessible_municipalities(&scoped).await;
        assert!(accessible.is_ok());

        let municipalities = accessible.unwrap_or_default();
        assert_eq!(municipalities.len(), 1);
        assert_eq!(municipalities[0].name, "ORANI");
    }
}
