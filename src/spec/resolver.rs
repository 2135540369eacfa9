//! `$ref` resolution at load time
//!
//! Parameters, request bodies, responses and path items may be declared by
//! reference, in the same document or in another file or URL. Before the
//! document is deserialized, every such reference is replaced by the value it
//! points to. References are resolved relative to the document that contains
//! them, so a fragment pulled in from `common.yaml` resolves its own refs
//! against `common.yaml`. Schema references are left as they are.
//!
//! Supported forms:
//! - local refs (`#/components/parameters/Page`)
//! - file refs (`common.yaml#/...`, `/abs/common.yaml#/...`, `file:///...#/...`)
//! - URL refs (`https://example.com/common.yaml#/...`)

use super::loader::{parse_value, read_source, SpecSource};
use crate::cache::ContentCache;
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// What a location in the document holds, which decides where to look for
/// nested references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    PathItem,
    Operation,
    Parameter,
    RequestBody,
    Response,
}

/// A location still to be resolved: JSON pointer into the root document,
/// what it holds, and the document its references are relative to.
type Pending = (String, Slot, SpecSource);

/// Resolves references against documents loaded on demand.
pub struct RefResolver<'a> {
    cache: &'a ContentCache,
    documents: HashMap<SpecSource, Arc<Value>>,
}

impl<'a> RefResolver<'a> {
    /// Create a resolver that fetches remote documents through `cache`
    #[must_use]
    pub fn new(cache: &'a ContentCache) -> Self {
        Self {
            cache,
            documents: HashMap::new(),
        }
    }

    /// Inline every parameter, request body, response and path item reference
    /// of `document`, which was loaded from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] when a reference points to a document that
    /// cannot be read or parsed, to a location that does not exist, or back
    /// to itself.
    pub async fn resolve(&mut self, source: &SpecSource, mut document: Value) -> Result<Value> {
        let root = source.canonical();
        self.documents.insert(root.clone(), Arc::new(document.clone()));

        let mut pending = seed(&document, &root);
        let mut inlined = 0usize;

        while let Some((pointer, slot, base)) = pending.pop() {
            let reference = document
                .pointer(&pointer)
                .and_then(|node| node.get("$ref"))
                .and_then(Value::as_str)
                .map(str::to_string);

            let base = match reference {
                Some(reference) => {
                    let (target, value) = self.follow(&base, &reference).await?;
                    if let Some(node) = document.pointer_mut(&pointer) {
                        *node = value;
                    }
                    inlined += 1;
                    target
                }
                None => base,
            };

            if let Some(node) = document.pointer(&pointer) {
                children(node, &pointer, slot, &base, &mut pending);
            }
        }

        if inlined > 0 {
            tracing::debug!(
                "Resolved {} references across {} documents",
                inlined,
                self.documents.len()
            );
        }

        Ok(document)
    }

    /// Follow a reference chain to its final value.
    async fn follow(&mut self, base: &SpecSource, reference: &str) -> Result<(SpecSource, Value)> {
        let mut seen: HashSet<(SpecSource, Option<String>)> = HashSet::new();
        let mut current = base.clone();
        let mut reference = reference.to_string();

        loop {
            let (target, pointer) = parse_ref(&current, &reference)?;
            if !seen.insert((target.clone(), pointer.clone())) {
                return Err(Error::Load(format!("cyclic $ref '{reference}' in {current}")));
            }

            let document = self.document(&target).await?;
            let value = match &pointer {
                Some(pointer) => document.pointer(pointer).cloned().ok_or_else(|| {
                    Error::Load(format!(
                        "unresolved $ref '{reference}' in {current}: {target} has nothing at {pointer}"
                    ))
                })?,
                None => (*document).clone(),
            };

            match value.get("$ref").and_then(Value::as_str) {
                Some(next) => {
                    reference = next.to_string();
                    current = target;
                }
                None => return Ok((target, value)),
            }
        }
    }

    /// A parsed document, loaded once per resolver.
    async fn document(&mut self, source: &SpecSource) -> Result<Arc<Value>> {
        if let Some(document) = self.documents.get(source) {
            return Ok(Arc::clone(document));
        }

        tracing::debug!("Loading referenced document {}", source);
        let data = read_source(source, self.cache).await.map_err(|e| match e {
            Error::Load(message) => Error::Load(message),
            other => Error::Load(format!("failed to load referenced document {source}: {other}")),
        })?;
        let document = parse_value(&data)
            .map_err(|e| Error::Load(format!("referenced document {source}: {e}")))?;
        let document = Arc::new(document);
        self.documents.insert(source.clone(), Arc::clone(&document));
        Ok(document)
    }
}

/// Split a reference into the target document and an optional JSON pointer.
fn parse_ref(base: &SpecSource, reference: &str) -> Result<(SpecSource, Option<String>)> {
    let (location, fragment) = match reference.split_once('#') {
        Some((location, fragment)) => (location, fragment),
        None => (reference, ""),
    };

    let pointer = match fragment {
        "" => None,
        f if f.starts_with('/') => Some(f.to_string()),
        _ => {
            return Err(Error::Load(format!(
                "unsupported $ref '{reference}' in {base}: fragment must be a JSON pointer"
            )));
        }
    };

    Ok((base.join(location)?, pointer))
}

/// Top-level locations that may hold references.
fn seed(document: &Value, root: &SpecSource) -> Vec<Pending> {
    let mut pending = Vec::new();
    let mut push_entries = |section: &str, slot: Slot| {
        let pointer = pointer_from_path(section);
        if let Some(entries) = document.pointer(&pointer).and_then(Value::as_object) {
            for key in entries.keys() {
                pending.push((child(&pointer, key), slot, root.clone()));
            }
        }
    };

    push_entries("paths", Slot::PathItem);
    push_entries("components/pathItems", Slot::PathItem);
    push_entries("components/parameters", Slot::Parameter);
    push_entries("components/requestBodies", Slot::RequestBody);
    push_entries("components/responses", Slot::Response);

    pending
}

/// Locations nested in an already resolved node.
fn children(
    node: &Value,
    pointer: &str,
    slot: Slot,
    base: &SpecSource,
    pending: &mut Vec<Pending>,
) {
    let mut push = |pointer: String, slot: Slot| pending.push((pointer, slot, base.clone()));

    match slot {
        Slot::PathItem => {
            for method in METHODS {
                if node.get(method).is_some_and(Value::is_object) {
                    push(child(pointer, method), Slot::Operation);
                }
            }
            push_parameters(node, pointer, &mut push);
        }
        Slot::Operation => {
            push_parameters(node, pointer, &mut push);
            if node.get("requestBody").is_some() {
                push(child(pointer, "requestBody"), Slot::RequestBody);
            }
            if let Some(responses) = node.get("responses").and_then(Value::as_object) {
                let responses_pointer = child(pointer, "responses");
                for status in responses.keys() {
                    push(child(&responses_pointer, status), Slot::Response);
                }
            }
        }
        Slot::Parameter | Slot::RequestBody | Slot::Response => {}
    }
}

fn push_parameters(node: &Value, pointer: &str, push: &mut impl FnMut(String, Slot)) {
    if let Some(parameters) = node.get("parameters").and_then(Value::as_array) {
        let parameters_pointer = child(pointer, "parameters");
        for index in 0..parameters.len() {
            push(child(&parameters_pointer, &index.to_string()), Slot::Parameter);
        }
    }
}

/// JSON pointer of a `/`-separated path of plain keys
fn pointer_from_path(path: &str) -> String {
    path.split('/').fold(String::new(), |pointer, key| child(&pointer, key))
}

/// Append one escaped token to a JSON pointer.
fn child(pointer: &str, token: &str) -> String {
    format!("{pointer}/{}", token.replace('~', "~0").replace('/', "~1"))
}
