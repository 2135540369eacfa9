//! OpenAPI 3.0 / 3.1 document model
//!
//! Only the parts the projections read are modeled; everything else in the
//! document is ignored during deserialization. Maps keep document order.
//! Schemas accept both the 3.0 single `type` and the 3.1 list of types.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{json, Value};

/// A `$ref` or an inline value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReferenceOr<T> {
    /// `{"$ref": "..."}`; sibling keys are ignored
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    /// Inline value
    Item(T),
}

impl<T> ReferenceOr<T> {
    /// Inline value, if this is not a reference
    #[must_use]
    pub fn as_item(&self) -> Option<&T> {
        match self {
            ReferenceOr::Item(item) => Some(item),
            ReferenceOr::Reference { .. } => None,
        }
    }

    /// Reference string, if this is a reference
    #[must_use]
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            ReferenceOr::Reference { reference } => Some(reference),
            ReferenceOr::Item(_) => None,
        }
    }
}

/// Root document
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OpenApiDocument {
    /// Version string, `3.0.x` or `3.1.x`
    pub openapi: String,
    pub info: Info,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: IndexMap<String, ReferenceOr<PathItem>>,
    pub components: Option<Components>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Info {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
    pub contact: Option<Contact>,
    pub license: Option<License>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct License {
    #[serde(default)]
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tag {
    pub name: String,
    pub description: Option<String>,
}

/// Operations available on one path template
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PathItem {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
    /// Parameters shared by every operation of the path
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,
    pub request_body: Option<ReferenceOr<RequestBody>>,
    /// Status code (or `default`) to response, in document order
    #[serde(default)]
    pub responses: IndexMap<String, ReferenceOr<Response>>,
    #[serde(default)]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

impl ParameterLocation {
    /// Name used in the `in` field
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Path => "path",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<ReferenceOr<Schema>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestBody {
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaType {
    pub schema: Option<ReferenceOr<Schema>>,
}

/// Reusable objects addressed by `#/components/...` references
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, ReferenceOr<Schema>>,
    #[serde(default)]
    pub parameters: IndexMap<String, ReferenceOr<Parameter>>,
    #[serde(default)]
    pub request_bodies: IndexMap<String, ReferenceOr<RequestBody>>,
    #[serde(default)]
    pub responses: IndexMap<String, ReferenceOr<Response>>,
}

/// Schema object, reduced to what the expansion prints
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: Option<TypeSet>,
    pub format: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(rename = "enum", default)]
    pub enumeration: Vec<Value>,
    #[serde(default)]
    pub properties: IndexMap<String, ReferenceOr<Schema>>,
    pub items: Option<Box<ReferenceOr<Schema>>>,
    #[serde(default)]
    pub one_of: Vec<ReferenceOr<Schema>>,
    #[serde(default)]
    pub all_of: Vec<ReferenceOr<Schema>>,
    #[serde(default)]
    pub any_of: Vec<ReferenceOr<Schema>>,
}

/// Declared `type`: one name (3.0 and 3.1) or a list of names (3.1)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(String),
    Multiple(Vec<String>),
}

impl TypeSet {
    /// Declared type names in document order
    #[must_use]
    pub fn names(&self) -> &[String] {
        match self {
            TypeSet::Single(name) => std::slice::from_ref(name),
            TypeSet::Multiple(names) => names,
        }
    }

    /// A string for one declared type, an array for several, nothing for none
    #[must_use]
    pub fn to_value(&self) -> Option<Value> {
        match self.names() {
            [] => None,
            [single] => Some(json!(single)),
            many => Some(json!(many)),
        }
    }
}
