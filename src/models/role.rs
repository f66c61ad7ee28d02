//! Access-control role grants.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role granted by the synthetic grant written on export.
pub const CONTRIBUTOR_ROLE: &str = "Contributor";

/// Well-known principal that stands for every user of a catalog.
pub const EVERYONE_OBJECT_ID: &str = "00000000-0000-0000-0000-000000000201";

/// A principal listed in a role grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMember {
    /// Directory object id of the principal.
    pub object_id: String,
}

/// An access-control entry: one role and the principals holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    /// Role name, e.g. `Contributor`.
    pub role: String,
    /// Principals holding the role.
    pub members: Vec<RoleMember>,
}

impl RoleGrant {
    /// Grant of `Contributor` to everyone.
    ///
    /// Member identities are not portable between environments, so exported
    /// assets carry this grant in place of their original role lists. This
    /// keeps imported assets editable by anyone in the target catalog.
    #[must_use]
    pub fn contributor() -> Self {
        Self {
            role: CONTRIBUTOR_ROLE.to_string(),
            members: vec![RoleMember {
                object_id: EVERYONE_OBJECT_ID.to_string(),
            }],
        }
    }

    /// The replacement value for any role-grant list.
    #[must_use]
    pub fn portable_grants() -> Value {
        serde_json::json!([{
            "role": CONTRIBUTOR_ROLE,
            "members": [{"objectId": EVERYONE_OBJECT_ID}],
        }])
    }
}
