//! Role- and municipality-scoped access decisions.
//!
//! Every query here is a pure function of the caller's role and home
//! municipality plus an optional target record. A denial is an ordinary
//! `false` the view reacts to by not offering the control; it is never an
//! error path.

use std::collections::{BTreeMap, BTreeSet};

use bayan_core::{OperatorIdentity, Role};
use serde::{Deserialize, Serialize};

use crate::municipality::Municipality;
use crate::user::User;

/// Feature gate for the user listing view.
pub const FEATURE_VIEW_USERS: &str = "view-users";
/// Feature gate for creating users.
pub const FEATURE_ADD_USER: &str = "add-user";
/// Feature gate for editing users.
pub const FEATURE_EDIT_USER: &str = "edit-user";
/// Feature gate for deleting users.
pub const FEATURE_DELETE_USER: &str = "delete-user";

/// All feature names the console recognizes.
pub const RECOGNIZED_FEATURES: [&str; 4] = [
    FEATURE_VIEW_USERS,
    FEATURE_ADD_USER,
    FEATURE_EDIT_USER,
    FEATURE_DELETE_USER,
];

/// Mutating actions gated per target record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordAction {
    /// Replace a user record's fields.
    Update,
    /// Remove a user record.
    Delete,
}

impl RecordAction {
    /// Returns the feature grant this action requires.
    #[must_use]
    pub fn required_feature(&self) -> &'static str {
        match self {
            Self::Update => FEATURE_EDIT_USER,
            Self::Delete => FEATURE_DELETE_USER,
        }
    }
}

/// The record subset a fetch is allowed to cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordScope {
    /// Every record.
    All,
    /// Records of one municipality.
    Municipality(String),
    /// No records at all (caller has no municipality to be scoped to).
    None,
}

/// The role → feature-name grant table.
///
/// Supplied externally at policy construction; the policy consults the
/// table rather than embedding it. Administrators are granted every feature
/// regardless of the table's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureGrants {
    grants: BTreeMap<Role, BTreeSet<String>>,
}

impl FeatureGrants {
    /// Creates an empty grant table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a feature grant for a role.
    #[must_use]
    pub fn grant(mut self, role: Role, feature: impl Into<String>) -> Self {
        self.grants.entry(role).or_default().insert(feature.into());
        self
    }

    /// Returns whether the table grants a feature to a role.
    #[must_use]
    pub fn allows(&self, role: Role, feature: &str) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|features| features.contains(feature))
    }
}

/// Stateless access decisions for the signed-in operator.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    grants: FeatureGrants,
}

impl AccessPolicy {
    /// Creates a policy over an externally supplied grant table.
    #[must_use]
    pub fn new(grants: FeatureGrants) -> Self {
        Self { grants }
    }

    /// Returns whether the operator may use a console feature.
    ///
    /// An administrator is granted every feature; other roles consult the
    /// grant table.
    #[must_use]
    pub fn can_access_feature(&self, operator: &OperatorIdentity, feature: &str) -> bool {
        if operator.role().is_administrator() {
            return true;
        }

        self.grants.allows(operator.role(), feature)
    }

    /// Returns whether the operator may perform a mutating action on a
    /// specific user record.
    ///
    /// An administrator may act on any record. Any other caller needs the
    /// action's feature grant and a home municipality equal to the target's;
    /// a target with no municipality is out of every non-administrator's
    /// scope.
    #[must_use]
    pub fn can_perform_action(
        &self,
        operator: &OperatorIdentity,
        action: RecordAction,
        target: &User,
    ) -> bool {
        if operator.role().is_administrator() {
            return true;
        }

        if !self.grants.allows(operator.role(), action.required_feature()) {
            return false;
        }

        match (operator.municipality(), target.municipality_name()) {
            (Some(home), Some(target_municipality)) => {
                home.trim().eq_ignore_ascii_case(target_municipality)
            }
            _ => false,
        }
    }

    /// Projects the municipality set the operator may see.
    ///
    /// The full set for an administrator; a singleton holding the operator's
    /// home municipality otherwise; empty when no home is assigned.
    #[must_use]
    pub fn accessible_municipalities(
        &self,
        operator: &OperatorIdentity,
        municipalities: &[Municipality],
    ) -> Vec<Municipality> {
        if operator.role().is_administrator() {
            return municipalities.to_vec();
        }

        let Some(home) = operator.municipality() else {
            return Vec::new();
        };

        municipalities
            .iter()
            .filter(|municipality| municipality.name.trim().eq_ignore_ascii_case(home.trim()))
            .cloned()
            .collect()
    }

    /// Decides the scope user fetches are issued with.
    #[must_use]
    pub fn user_scope(&self, operator: &OperatorIdentity) -> RecordScope {
        if operator.role().is_administrator() {
            return RecordScope::All;
        }

        match operator.municipality() {
            Some(home) if !home.trim().is_empty() => {
                RecordScope::Municipality(home.trim().to_owned())
            }
            _ => RecordScope::None,
        }
    }
}
