//! Read-only projections over a loaded specification.

use super::category::{category_of, matches_category};
use super::schema::{
    expand_schema_ref, schema_format, schema_type, DETAILED_SCHEMA_MAX_DEPTH,
    INLINE_SCHEMA_MAX_DEPTH,
};
use crate::error::{Error, Result};
use crate::utils::sort_by_name;
use super::model::{
    Components, MediaType, OpenApiDocument, Operation, Parameter, PathItem, ReferenceOr,
    RequestBody, Response,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Prefix every `show_schema` reference must carry
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";
const REQUEST_BODY_REF_PREFIX: &str = "#/components/requestBodies/";
const RESPONSE_REF_PREFIX: &str = "#/components/responses/";

/// Upper bound on chained component references (`A -> B -> C`)
const MAX_REF_HOPS: usize = 8;

/// Output of a projection
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// Human-readable message, e.g. when nothing matched
    Message(String),
    /// Structured result
    Json(Value),
}

impl QueryOutput {
    /// Structured result, if any
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            QueryOutput::Json(value) => Some(value),
            QueryOutput::Message(_) => None,
        }
    }

    /// Message text, if any
    #[must_use]
    pub fn as_message(&self) -> Option<&str> {
        match self {
            QueryOutput::Message(text) => Some(text),
            QueryOutput::Json(_) => None,
        }
    }
}

/// Query interface over one parsed specification
#[derive(Debug, Clone)]
pub struct SpecExplorer {
    spec: OpenApiDocument,
}

impl SpecExplorer {
    /// Wrap a parsed specification
    #[must_use]
    pub fn new(spec: OpenApiDocument) -> Self {
        Self { spec }
    }

    /// The underlying specification
    #[must_use]
    pub fn spec(&self) -> &OpenApiDocument {
        &self.spec
    }

    /// Categories (first path segment) with the number of path templates in each.
    #[must_use]
    pub fn list_categories(&self) -> QueryOutput {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for path in self.spec.paths.keys() {
            let category = category_of(path);
            if !category.is_empty() {
                *counts.entry(category).or_default() += 1;
            }
        }

        if counts.is_empty() {
            return QueryOutput::Message(
                "No categories found in the OpenAPI specification".to_string(),
            );
        }

        let mut categories: Vec<Value> = counts
            .into_iter()
            .map(|(name, count)| json!({ "name": name, "endpoint_count": count }))
            .collect();
        sort_by_name(&mut categories);

        QueryOutput::Json(Value::Array(categories))
    }

    /// Operations, optionally restricted to one category (case-insensitive).
    ///
    /// Entries are ordered by path template, then by HTTP method.
    #[must_use]
    pub fn list_endpoints(&self, category: Option<&str>) -> QueryOutput {
        let filter = category.map(str::trim).filter(|c| !c.is_empty());

        let mut paths: Vec<(&String, &PathItem)> = self
            .spec
            .paths
            .iter()
            .filter_map(|(path, item)| item.as_item().map(|item| (path, item)))
            .filter(|(path, _)| filter.map_or(true, |c| matches_category(path, c)))
            .collect();
        paths.sort_by(|a, b| a.0.cmp(b.0));

        let mut endpoints = Vec::new();
        for (path, item) in paths {
            for (method, operation) in operations(item) {
                let mut entry = Map::new();
                entry.insert("path".to_string(), json!(path));
                entry.insert("method".to_string(), json!(method));
                entry.insert(
                    "summary".to_string(),
                    json!(operation.summary.as_deref().unwrap_or_default()),
                );
                if let Some(description) = non_empty(operation.description.as_deref()) {
                    entry.insert("description".to_string(), json!(description));
                }
                if let Some(operation_id) = non_empty(operation.operation_id.as_deref()) {
                    entry.insert("operationId".to_string(), json!(operation_id));
                }
                endpoints.push(Value::Object(entry));
            }
        }

        if endpoints.is_empty() {
            let message = match filter {
                Some(c) => format!("No endpoints found for category: {c}"),
                None => "No endpoints found in the OpenAPI specification".to_string(),
            };
            return QueryOutput::Message(message);
        }

        QueryOutput::Json(Value::Array(endpoints))
    }

    /// Full description of one operation.
    pub fn show_endpoint(&self, path: &str, method: &str) -> Result<QueryOutput> {
        let item = self
            .find_path_item(path)?
            .ok_or_else(|| Error::NotFound(format!("Path not found: {path}")))?;

        let method_upper = method.trim().to_uppercase();
        let operation = operations(item)
            .find(|(m, _)| *m == method_upper)
            .map(|(_, op)| op)
            .ok_or_else(|| Error::NotFound(format!("Method {method} not found for path: {path}")))?;

        let mut result = Map::new();
        result.insert("path".to_string(), json!(path));
        result.insert("method".to_string(), json!(method_upper));
        result.insert(
            "summary".to_string(),
            json!(operation.summary.as_deref().unwrap_or_default()),
        );
        result.insert(
            "description".to_string(),
            json!(operation.description.as_deref().unwrap_or_default()),
        );
        result.insert(
            "operationId".to_string(),
            json!(operation.operation_id.as_deref().unwrap_or_default()),
        );
        result.insert("tags".to_string(), json!(operation.tags));

        let parameters = self.describe_parameters(item, operation);
        if !parameters.is_empty() {
            result.insert("parameters".to_string(), Value::Array(parameters));
        }

        if let Some(body) = &operation.request_body {
            result.insert("requestBody".to_string(), self.describe_request_body(body));
        }

        result.insert("responses".to_string(), self.describe_responses(operation));

        Ok(QueryOutput::Json(Value::Object(result)))
    }

    /// Document metadata and size statistics.
    #[must_use]
    pub fn get_spec_info(&self) -> QueryOutput {
        let info = &self.spec.info;
        let mut result = Map::new();
        result.insert("title".to_string(), json!(info.title));
        result.insert("version".to_string(), json!(info.version));
        result.insert(
            "description".to_string(),
            json!(info.description.as_deref().unwrap_or_default()),
        );

        if let Some(contact) = &info.contact {
            result.insert(
                "contact".to_string(),
                json!({
                    "name": contact.name.as_deref().unwrap_or_default(),
                    "email": contact.email.as_deref().unwrap_or_default(),
                    "url": contact.url.as_deref().unwrap_or_default(),
                }),
            );
        }

        if let Some(license) = &info.license {
            result.insert(
                "license".to_string(),
                json!({
                    "name": license.name,
                    "url": license.url.as_deref().unwrap_or_default(),
                }),
            );
        }

        let path_count = self.spec.paths.len();
        let operation_count: usize = self
            .spec
            .paths
            .values()
            .filter_map(ReferenceOr::as_item)
            .map(|item| operations(item).count())
            .sum();
        let schema_count = self.spec.components.as_ref().map_or(0, |c| c.schemas.len());

        result.insert(
            "stats".to_string(),
            json!({
                "paths": path_count,
                "operations": operation_count,
                "tags": self.spec.tags.len(),
                "schemas": schema_count,
            }),
        );

        if !self.spec.servers.is_empty() {
            let servers: Vec<Value> = self
                .spec
                .servers
                .iter()
                .map(|server| {
                    json!({
                        "url": server.url,
                        "description": server.description.as_deref().unwrap_or_default(),
                    })
                })
                .collect();
            result.insert("servers".to_string(), Value::Array(servers));
        }

        QueryOutput::Json(Value::Object(result))
    }

    /// One named component schema, expanded to the detailed depth.
    pub fn show_schema(&self, reference: &str) -> Result<QueryOutput> {
        let name = reference.strip_prefix(SCHEMA_REF_PREFIX).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "Invalid schema reference format. Expected: {SCHEMA_REF_PREFIX}SchemaName, got: {reference}"
            ))
        })?;

        let schemas = self
            .spec
            .components
            .as_ref()
            .map(|c| &c.schemas)
            .filter(|schemas| !schemas.is_empty())
            .ok_or_else(|| {
                Error::NotFound("No schemas found in the OpenAPI specification".to_string())
            })?;

        let schema = schemas
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("Schema not found: {name}")))?;

        Ok(QueryOutput::Json(json!({
            "name": name,
            "ref": reference,
            "schema": expand_schema_ref(schema, DETAILED_SCHEMA_MAX_DEPTH),
        })))
    }

    /// Exact lookup first, then a template match that ignores parameter names.
    fn find_path_item(&self, path: &str) -> Result<Option<&PathItem>> {
        let paths = &self.spec.paths;
        let entry = paths.get(path).or_else(|| {
            let wanted = normalize_template(path);
            paths
                .iter()
                .find(|(declared, _)| normalize_template(declared) == wanted)
                .map(|(_, item)| item)
        });

        match entry {
            None => Ok(None),
            Some(ReferenceOr::Item(item)) => Ok(Some(item)),
            Some(ReferenceOr::Reference { reference }) => Err(Error::NotFound(format!(
                "Path {path} is declared by reference ({reference}) and cannot be inspected"
            ))),
        }
    }

    /// Path-level parameters merged with the operation's own; the operation
    /// wins when both declare the same name and location.
    fn describe_parameters(&self, item: &PathItem, operation: &Operation) -> Vec<Value> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut merged: Vec<Value> = Vec::new();

        for node in item.parameters.iter().chain(&operation.parameters) {
            let (key, described) = match self.resolve(node, PARAMETER_REF_PREFIX, |c, name| {
                c.parameters.get(name)
            }) {
                Ok(parameter) => (
                    format!("{}:{}", parameter.location.as_str(), parameter.name),
                    self.describe_parameter(parameter),
                ),
                Err(reference) => (reference.to_string(), json!({ "$ref": reference })),
            };

            match index.get(&key) {
                Some(&position) => merged[position] = described,
                None => {
                    index.insert(key, merged.len());
                    merged.push(described);
                }
            }
        }

        merged
    }

    fn describe_parameter(&self, parameter: &Parameter) -> Value {
        let mut out = Map::new();
        out.insert("name".to_string(), json!(parameter.name));
        out.insert("in".to_string(), json!(parameter.location.as_str()));
        out.insert("required".to_string(), json!(parameter.required));
        out.insert(
            "description".to_string(),
            json!(parameter.description.as_deref().unwrap_or_default()),
        );

        if let Some(node) = &parameter.schema {
            if let Ok(schema) =
                self.resolve(node, SCHEMA_REF_PREFIX, |c, name| c.schemas.get(name))
            {
                if let Some(type_value) = schema_type(schema) {
                    out.insert("type".to_string(), type_value);
                }
                if let Some(format) = schema_format(schema) {
                    out.insert("format".to_string(), json!(format));
                }
            }
        }

        Value::Object(out)
    }

    fn describe_request_body(&self, node: &ReferenceOr<RequestBody>) -> Value {
        match self.resolve(node, REQUEST_BODY_REF_PREFIX, |c, name| c.request_bodies.get(name)) {
            Ok(body) => json!({
                "description": body.description.as_deref().unwrap_or_default(),
                "required": body.required,
                "content": describe_content(body.content.iter()),
            }),
            Err(reference) => json!({ "$ref": reference }),
        }
    }

    /// Status codes in document order, `default` last.
    fn describe_responses(&self, operation: &Operation) -> Value {
        let mut out = Map::new();
        let declared = operation
            .responses
            .iter()
            .filter(|(status, _)| status.as_str() != "default");
        let default = operation.responses.get_key_value("default");

        for (status, node) in declared.chain(default) {
            out.insert(status.clone(), self.describe_response(node));
        }

        Value::Object(out)
    }

    fn describe_response(&self, node: &ReferenceOr<Response>) -> Value {
        match self.resolve(node, RESPONSE_REF_PREFIX, |c, name| c.responses.get(name)) {
            Ok(response) => {
                let mut out = Map::new();
                out.insert("description".to_string(), json!(response.description));
                if !response.content.is_empty() {
                    out.insert(
                        "content".to_string(),
                        describe_content(response.content.iter()),
                    );
                }
                Value::Object(out)
            }
            Err(reference) => json!({ "$ref": reference }),
        }
    }

    /// Follow local component references of one kind.
    ///
    /// Returns the unresolved reference string when the target is external,
    /// missing, or the chain is too long.
    fn resolve<'a, T>(
        &'a self,
        node: &'a ReferenceOr<T>,
        prefix: &str,
        lookup: impl Fn(&'a Components, &str) -> Option<&'a ReferenceOr<T>>,
    ) -> std::result::Result<&'a T, &'a str> {
        let mut current = node;
        for _ in 0..MAX_REF_HOPS {
            let reference = match current {
                ReferenceOr::Item(item) => return Ok(item),
                ReferenceOr::Reference { reference } => reference,
            };
            let target = reference.strip_prefix(prefix).and_then(|name| {
                self.spec
                    .components
                    .as_ref()
                    .and_then(|components| lookup(components, name))
            });
            match target {
                Some(next) => current = next,
                None => return Err(reference.as_str()),
            }
        }

        match current {
            ReferenceOr::Item(item) => Ok(item),
            ReferenceOr::Reference { reference } => Err(reference.as_str()),
        }
    }
}

/// Declared operations of a path item in canonical method order
fn operations(item: &PathItem) -> impl Iterator<Item = (&'static str, &Operation)> {
    [
        ("GET", &item.get),
        ("PUT", &item.put),
        ("POST", &item.post),
        ("DELETE", &item.delete),
        ("OPTIONS", &item.options),
        ("HEAD", &item.head),
        ("PATCH", &item.patch),
        ("TRACE", &item.trace),
    ]
    .into_iter()
    .filter_map(|(method, operation)| operation.as_ref().map(|op| (method, op)))
}

fn describe_content<'a>(media_types: impl Iterator<Item = (&'a String, &'a MediaType)>) -> Value {
    let content: Map<String, Value> = media_types
        .filter_map(|(media_type, media)| {
            media.schema.as_ref().map(|schema| {
                (
                    media_type.clone(),
                    expand_schema_ref(schema, INLINE_SCHEMA_MAX_DEPTH),
                )
            })
        })
        .collect();
    Value::Object(content)
}

/// `/users/{userId}` and `/users/{id}` normalize to the same template.
fn normalize_template(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut in_param = false;
    for c in path.chars() {
        match c {
            '{' => {
                in_param = true;
                out.push('{');
            }
            '}' if in_param => {
                in_param = false;
                out.push('}');
            }
            _ if in_param => {}
            _ => out.push(c),
        }
    }
    out
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
