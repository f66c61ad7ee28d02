//! Catalog asset representation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Key holding the service-assigned identifier.
pub const ID_KEY: &str = "id";
/// Key holding user metadata.
pub const PROPERTIES_KEY: &str = "properties";
/// Key holding annotations (schema, previews, profiles, ...).
pub const ANNOTATIONS_KEY: &str = "annotations";

/// Annotation fields the search endpoint leaves incomplete.
///
/// Export re-attaches them from the full asset representation.
pub const HEAVY_ANNOTATIONS: [&str; 3] = ["previews", "columnsDataProfiles", "tableDataProfiles"];

/// One catalog entry as a JSON object.
///
/// The catalog schema is open-ended, so assets are kept as raw JSON and only
/// the handful of well-known keys get typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Asset(Map<String, Value>);

impl Asset {
    /// Creates an empty asset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the service-assigned identifier, if present and a string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_KEY).and_then(Value::as_str)
    }

    /// Removes and returns the identifier.
    pub fn take_id(&mut self) -> Option<Value> {
        self.0.remove(ID_KEY)
    }

    /// Returns the view type encoded in the identifier.
    ///
    /// Identifiers look like `.../views/{viewType}/{guid}`; the view type is
    /// the second-to-last path segment.
    #[must_use]
    pub fn view_type(&self) -> Option<&str> {
        self.id().and_then(view_type_of)
    }

    /// Mutable access to `properties`, if it is an object.
    pub fn properties_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0.get_mut(PROPERTIES_KEY).and_then(Value::as_object_mut)
    }

    /// Access to `annotations`, if it is an object.
    #[must_use]
    pub fn annotations(&self) -> Option<&Map<String, Value>> {
        self.0.get(ANNOTATIONS_KEY).and_then(Value::as_object)
    }

    /// Mutable access to `annotations`, if it is an object.
    pub fn annotations_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0.get_mut(ANNOTATIONS_KEY).and_then(Value::as_object_mut)
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns the underlying JSON object mutably.
    pub const fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    /// Consumes the asset, returning the JSON object.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Asset {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Asset {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(crate::Error::InvalidInput(format!(
                "expected asset object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id().unwrap_or("<no id>"))
    }
}

/// Extracts the view type (second-to-last `/` segment) from an asset id.
///
/// Returns `None` when the id has fewer than two segments or the segment is
/// empty.
#[must_use]
pub fn view_type_of(id: &str) -> Option<&str> {
    let mut segments = id.rsplit('/');
    segments.next()?;
    segments.next().filter(|segment| !segment.is_empty())
}

/// Short name of a JSON value's kind, for error messages.
pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
