//! Portability transform applied to every exported asset.
//!
//! Walks the asset tree and removes what the service manages itself, so the
//! asset can be replayed into a different catalog:
//!
//! | Key | Treatment |
//! |-----|-----------|
//! | `permissions`, `effectiveRights`, `type`, `modifiedTime` | removed everywhere |
//! | `id` | kept at the root, removed in nested objects |
//! | `roles` | replaced by [`RoleGrant::portable_grants`] |
//! | `creatorId` | email addresses prefixed with `imported_` |
//!
//! Everything below a `properties` key is user metadata: only `roles` lists
//! are rewritten there, all other keys are kept as they are (schema columns
//! carry their own `type`, for instance).
//!
//! The service spells some of these keys with a `__` prefix (`__id`,
//! `__creatorId`); both spellings are matched. The transform is idempotent.

use crate::models::{PROPERTIES_KEY, RoleGrant};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Keys removed at every depth.
pub const SERVICE_MANAGED_KEYS: [&str; 4] = ["permissions", "effectiveRights", "type", "modifiedTime"];

/// Key whose value is a role-grant list.
pub const ROLES_KEY: &str = "roles";

/// Key holding the creator's identity.
pub const CREATOR_KEY: &str = "creatorId";

/// Marker prepended to creator emails.
///
/// Downstream consumers must not treat the marked value as a principal.
pub const IMPORTED_PREFIX: &str = "imported_";

/// Non-portable property removed from search results before export.
pub const CONTAINER_ID_KEY: &str = "containerId";

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Where an object sits in the asset tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    Root,
    Nested,
    /// Inside a `properties` value.
    Metadata,
}

/// Makes an asset object portable, in place.
pub fn make_portable(asset: &mut Map<String, Value>) {
    sanitize_object(asset, Depth::Root);
}

/// Removes the container reference from the asset's `properties`.
///
/// Returns whether anything was removed.
pub fn remove_container_id(asset: &mut Map<String, Value>) -> bool {
    asset
        .get_mut(PROPERTIES_KEY)
        .and_then(Value::as_object_mut)
        .and_then(|properties| properties.remove(CONTAINER_ID_KEY))
        .is_some()
}

/// Returns whether a string looks like an email address.
#[must_use]
pub fn looks_like_email(value: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value))
}

fn sanitize_object(object: &mut Map<String, Value>, depth: Depth) {
    let keys: Vec<String> = object.keys().cloned().collect();

    for key in keys {
        let name = canonical_key(&key);

        if name == ROLES_KEY {
            object.insert(key, RoleGrant::portable_grants());
            continue;
        }

        if depth != Depth::Metadata
            && (SERVICE_MANAGED_KEYS.contains(&name) || (name == "id" && depth == Depth::Nested))
        {
            object.remove(&key);
            continue;
        }

        let child_depth = if depth == Depth::Metadata || name == PROPERTIES_KEY {
            Depth::Metadata
        } else {
            Depth::Nested
        };

        match object.get_mut(&key) {
            Some(Value::String(creator)) if name == CREATOR_KEY && depth != Depth::Metadata => {
                mark_imported(creator);
            },
            Some(value) => sanitize_value(value, child_depth),
            None => {},
        }
    }
}

fn sanitize_value(value: &mut Value, depth: Depth) {
    match value {
        Value::Object(nested) => sanitize_object(nested, depth),
        Value::Array(items) => items.iter_mut().for_each(|item| sanitize_value(item, depth)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {},
    }
}

fn mark_imported(creator: &mut String) {
    if looks_like_email(creator) && !creator.starts_with(IMPORTED_PREFIX) {
        creator.insert_str(0, IMPORTED_PREFIX);
    }
}

/// Strips the service's `__` prefix from a key.
fn canonical_key(key: &str) -> &str {
    key.strip_prefix("__").unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn portable(value: Value) -> Value {
        let Value::Object(mut map) = value else {
            panic!("test input must be an object");
        };
        make_portable(&mut map);
        Value::Object(map)
    }

    #[test]
    fn test_strips_service_fields_at_root() {
        let out = portable(json!({
            "id": "https://host/catalogs/c/views/tables/1",
            "type": "Microsoft.DataCatalog.Tables",
            "permissions": [],
            "effectiveRights": ["read"],
            "__modifiedTime": "2016-01-01T00:00:00Z",
            "properties": {"name": "orders"}
        }));

        assert_eq!(
            out,
            json!({
                "id": "https://host/catalogs/c/views/tables/1",
                "properties": {"name": "orders"}
            })
        );
    }

    #[test]
    fn test_nested_ids_removed() {
        let out = portable(json!({
            "id": "root",
            "annotations": {
                "schema": {"__id": "s1", "properties": {"columns": []}},
                "descriptions": [{"id": "d1", "properties": {"description": "x"}}]
            }
        }));

        assert_eq!(out["id"], "root");
        assert!(out["annotations"]["schema"].get("__id").is_none());
        assert!(out["annotations"]["descriptions"][0].get("id").is_none());
        assert_eq!(
            out["annotations"]["descriptions"][0]["properties"]["description"],
            "x"
        );
    }

    #[test]
    fn test_roles_replaced_at_any_depth() {
        let out = portable(json!({
            "roles": [{"role": "Owner", "members": [{"objectId": "a"}, {"objectId": "b"}]}],
            "annotations": {
                "tags": [{"properties": {"tag": "pii"}, "__roles": []}],
                "schema": {"deep": {"deeper": {"roles": null}}}
            }
        }));

        let expected = RoleGrant::portable_grants();
        assert_eq!(out["roles"], expected);
        assert_eq!(out["annotations"]["tags"][0]["__roles"], expected);
        assert_eq!(out["annotations"]["schema"]["deep"]["deeper"]["roles"], expected);
    }

    #[test]
    fn test_creator_email_marked_once() {
        let once = portable(json!({
            "annotations": {"experts": [{"__creatorId": "alice@contoso.com"}]},
            "creatorId": "not-an-email"
        }));
        assert_eq!(
            once["annotations"]["experts"][0]["__creatorId"],
            "imported_alice@contoso.com"
        );
        assert_eq!(once["creatorId"], "not-an-email");

        let twice = portable(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_schema_columns_keep_their_type() {
        let out = portable(json!({
            "id": "root",
            "properties": {"name": "orders", "type": "table", "id": "user-key"},
            "annotations": {
                "schema": {
                    "__id": "s1",
                    "modifiedTime": "2016-01-01T00:00:00Z",
                    "properties": {"columns": [
                        {"name": "order_id", "type": "int", "isNullable": false, "maxLength": 4}
                    ]}
                }
            }
        }));

        assert_eq!(
            out["annotations"]["schema"],
            json!({"properties": {"columns": [
                {"name": "order_id", "type": "int", "isNullable": false, "maxLength": 4}
            ]}})
        );
        assert_eq!(
            out["properties"],
            json!({"name": "orders", "type": "table", "id": "user-key"})
        );
    }

    #[test]
    fn test_roles_replaced_inside_properties_and_creator_objects() {
        let out = portable(json!({
            "properties": {"owners": {"roles": [{"role": "Owner"}]}},
            "annotations": {"experts": [{"creatorId": {"roles": [], "type": "user"}}]}
        }));

        let expected = RoleGrant::portable_grants();
        assert_eq!(out["properties"]["owners"]["roles"], expected);

        let creator = &out["annotations"]["experts"][0]["creatorId"];
        assert_eq!(creator["roles"], expected);
        assert!(creator.get("type").is_none());
    }

    #[test]
    fn test_scalars_and_user_strings_untouched() {
        let input = json!({
            "properties": {"name": "type", "count": 3, "flag": true, "none": null}
        });
        assert_eq!(portable(input.clone()), input);
    }

    #[test]
    fn test_remove_container_id() {
        let Value::Object(mut map) = json!({"properties": {"containerId": "c", "name": "n"}}) else {
            unreachable!()
        };
        assert!(remove_container_id(&mut map));
        assert!(!remove_container_id(&mut map));
        assert_eq!(Value::Object(map), json!({"properties": {"name": "n"}}));
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("bob@example.org"));
        assert!(!looks_like_email("bob@localhost"));
        assert!(!looks_like_email("bob example.org"));
        assert!(!looks_like_email(""));
    }
}
