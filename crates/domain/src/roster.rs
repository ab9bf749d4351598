//! Pure grouping and filtering of already-fetched user lists.

use std::collections::BTreeMap;

use crate::user::User;

/// Tabs of the user listing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterTab {
    /// Every user the caller can see.
    All,
    /// Users of one selected municipality.
    Municipality,
}

impl RosterTab {
    /// Returns the transport string for this tab.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Municipality => "municipality",
        }
    }

    /// Parses a transport value leniently.
    ///
    /// Anything other than `municipality` falls back to [`RosterTab::All`]
    /// so a garbled tab value never hides data.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("municipality") {
            Self::Municipality
        } else {
            Self::All
        }
    }
}

/// Partitions users by municipality, insertion order preserved within each
/// bucket.
///
/// Users with no assigned municipality appear in no bucket.
#[must_use]
pub fn group_users_by_municipality(users: &[User]) -> BTreeMap<String, Vec<User>> {
    let mut buckets: BTreeMap<String, Vec<User>> = BTreeMap::new();

    for user in users {
        let Some(name) = user.municipality_name() else {
            continue;
        };

        buckets.entry(name.to_owned()).or_default().push(user.clone());
    }

    buckets
}

/// Applies the listing view's tab filter.
///
/// Returns only users of `selected_municipality` when the municipality tab
/// is active and a municipality is selected; in every other case the input
/// is returned unchanged — a deliberate fallback so an unselected filter
/// never hides data. The input is never mutated.
#[must_use]
pub fn filter_users(
    users: &[User],
    tab: RosterTab,
    selected_municipality: Option<&str>,
) -> Vec<User> {
    let selected = selected_municipality.map(str::trim).filter(|name| !name.is_empty());

    match (tab, selected) {
        (RosterTab::Municipality, Some(selected)) => users
            .iter()
            .filter(|user| {
                user.municipality_name()
                    .is_some_and(|name| name.eq_ignore_ascii_case(selected))
            })
            .cloned()
            .collect(),
        _ => users.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use bayan_core::Role;
    use chrono::Utc;

    use crate::user::{RecordStatus, User, UserId};

    use super::{RosterTab, filter_users, group_users_by_municipality};

    fn user(first_name: &str, municipality: Option<&str>) -> User {
        User {
            id: UserId::new(),
            first_name: first_name.to_owned(),
            last_name: "Cruz".to_owned(),
            email: format!("{}@example.com", first_name.to_lowercase()),
            role: Role::User,
            municipality: municipality.map(ToOwned::to_owned),
            status: RecordStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn grouping_excludes_unassigned_users() {
        let users = [
            user("Ana", Some("ORANI")),
            user("Ben", Some("")),
            user("Carla", Some("ORANI")),
        ];

        let buckets = group_users_by_municipality(&users);

        assert_eq!(buckets.len(), 1);
        let orani = buckets.get("ORANI").map(Vec::as_slice).unwrap_or_default();
        assert_eq!(orani.len(), 2);
        assert_eq!(orani[0].first_name, "Ana");
        assert_eq!(orani[1].first_name, "Carla");
    }

    #[test]
    fn all_tab_returns_input_unchanged() {
        let users = [user("Ana", Some("ORANI")), user("Ben", None)];
        let filtered = filter_users(&users, RosterTab::All, Some("ORANI"));
        assert_eq!(filtered, users.to_vec());
    }

    #[test]
    fn municipality_tab_without_selection_falls_back_to_all() {
        let users = [user("Ana", Some("ORANI")), user("Ben", Some("PILAR"))];
        let filtered = filter_users(&users, RosterTab::Municipality, Some(""));
        assert_eq!(filtered, users.to_vec());

        let unselected = filter_users(&users, RosterTab::Municipality, None);
        assert_eq!(unselected, users.to_vec());
    }

    #[test]
    fn municipality_tab_with_selection_filters_exactly() {
        let users = [
            user("Ana", Some("ORANI")),
            user("Ben", Some("PILAR")),
            user("Carla", Some("ORANI")),
            user("Dan", None),
        ];

        let filtered = filter_users(&users, RosterTab::Municipality, Some("ORANI"));

        assert_eq!(filtered.len(), 2);
        assert!(
            filtered
                .iter()
                .all(|user| user.municipality.as_deref() == Some("ORANI"))
        );
    }

    #[test]
    fn unknown_tab_value_parses_as_all() {
        assert_eq!(RosterTab::parse("municipality"), RosterTab::Municipality);
        assert_eq!(RosterTab::parse("ALL"), RosterTab::All);
        assert_eq!(RosterTab::parse("sidebar"), RosterTab::All);
    }
}
