//! Domain records, access decisions, and presentation grouping.

#![forbid(unsafe_code)]

mod access;
mod district;
mod municipality;
mod roster;
mod user;

pub use access::{
    AccessPolicy, FEATURE_ADD_USER, FEATURE_DELETE_USER, FEATURE_EDIT_USER, FEATURE_VIEW_USERS,
    FeatureGrants, RECOGNIZED_FEATURES, RecordAction, RecordScope,
};
pub use district::{DistrictGroup, DistrictMap};
pub use municipality::{
    FALLBACK_MUNICIPALITY_NAMES, Municipality, MunicipalityId, fallback_municipalities,
};
pub use roster::{RosterTab, filter_users, group_users_by_municipality};
pub use user::{EmailAddress, RecordStatus, User, UserId};
