//! Data models for catalog transfer.
//!
//! Assets stay raw JSON objects; role grants and search pages are typed.

mod asset;
mod role;
mod search;

pub use asset::{
    ANNOTATIONS_KEY, Asset, HEAVY_ANNOTATIONS, ID_KEY, PROPERTIES_KEY, view_type_of,
};
pub use role::{CONTRIBUTOR_ROLE, EVERYONE_OBJECT_ID, RoleGrant, RoleMember};
pub use search::{SearchHit, SearchPage};
