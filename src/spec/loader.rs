//! Specification loader
//!
//! Resolves the configured source to bytes, parses them, inlines the
//! references the projections need (see [`RefResolver`]) and deserializes
//! the result into an [`OpenApiDocument`]. Remote sources go through the
//! [`ContentCache`]; local files are read directly.

use super::model::OpenApiDocument;
use super::resolver::RefResolver;
use crate::cache::ContentCache;
use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Where a document comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpecSource {
    /// Remote document (`http://` or `https://`)
    Url(Url),
    /// Local file
    Path(PathBuf),
}

impl SpecSource {
    /// Classify a configured source string.
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Err(Error::Config(
                "OPENAPI_SPEC_URL is not specified. Set it to a file path or http/https url"
                    .to_string(),
            ));
        }

        if source.starts_with("http://") || source.starts_with("https://") {
            let url = Url::parse(source)
                .map_err(|e| Error::Config(format!("Invalid OpenAPI spec URL '{source}': {e}")))?;
            Ok(SpecSource::Url(url))
        } else {
            Ok(SpecSource::Path(PathBuf::from(source)))
        }
    }

    /// Whether the source is fetched over the network
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, SpecSource::Url(_))
    }

    /// Identity used to tell documents apart: URLs without a fragment,
    /// files canonicalized when they exist.
    #[must_use]
    pub fn canonical(&self) -> Self {
        match self {
            SpecSource::Url(url) => {
                let mut url = url.clone();
                url.set_fragment(None);
                SpecSource::Url(url)
            }
            SpecSource::Path(path) => {
                SpecSource::Path(std::fs::canonicalize(path).unwrap_or_else(|_| path.clone()))
            }
        }
    }

    /// Locate a document named by a `$ref`, relative to this one.
    ///
    /// Absolute URLs and `file://` URLs stand on their own; anything else is
    /// joined to this document's URL or directory.
    pub fn join(&self, location: &str) -> Result<Self> {
        if location.is_empty() {
            return Ok(self.clone());
        }

        let invalid = |e: &dyn fmt::Display| {
            Error::Load(format!("invalid $ref location '{location}' in {self}: {e}"))
        };

        let joined = if location.starts_with("http://") || location.starts_with("https://") {
            SpecSource::Url(Url::parse(location).map_err(|e| invalid(&e))?)
        } else if location.starts_with("file://") {
            let url = Url::parse(location).map_err(|e| invalid(&e))?;
            let path = url
                .to_file_path()
                .map_err(|()| invalid(&"not a local file path"))?;
            SpecSource::Path(path)
        } else {
            match self {
                SpecSource::Url(base) => {
                    SpecSource::Url(base.join(location).map_err(|e| invalid(&e))?)
                }
                SpecSource::Path(_) if Path::new(location).is_absolute() => {
                    SpecSource::Path(PathBuf::from(location))
                }
                SpecSource::Path(base) => SpecSource::Path(
                    base.parent()
                        .unwrap_or_else(|| Path::new("."))
                        .join(location),
                ),
            }
        };

        Ok(joined.canonical())
    }
}

impl fmt::Display for SpecSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecSource::Url(url) => write!(f, "{url}"),
            SpecSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load the specification, resolving references to other documents.
pub async fn load_spec(source: &SpecSource, cache: &ContentCache) -> Result<OpenApiDocument> {
    let data = read_source(source, cache).await?;
    let document = parse_value(&data)?;
    let document = RefResolver::new(cache).resolve(source, document).await?;

    let spec = into_document(document)?;
    tracing::info!(
        "Loaded OpenAPI {} spec '{}' v{} from {} ({} paths)",
        spec.openapi,
        spec.info.title,
        spec.info.version,
        source,
        spec.paths.len()
    );
    Ok(spec)
}

/// Parse a YAML or JSON document without resolving references to other
/// documents.
pub fn parse_spec(data: &[u8]) -> Result<OpenApiDocument> {
    into_document(parse_value(data)?)
}

/// Raw bytes of a document.
pub(crate) async fn read_source(source: &SpecSource, cache: &ContentCache) -> Result<Vec<u8>> {
    match source {
        SpecSource::Url(url) => cache.fetch(url.as_str()).await,
        SpecSource::Path(path) => tokio::fs::read(path)
            .await
            .map_err(|e| Error::Load(format!("failed to read {}: {e}", path.display()))),
    }
}

/// Parse YAML or JSON into a JSON value.
pub(crate) fn parse_value(data: &[u8]) -> Result<Value> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    // JSON is a subset of YAML, so one parser covers both encodings.
    serde_yaml::from_slice(data)
        .map_err(|e| Error::Load(format!("failed to parse OpenAPI spec: {e}")))
}

fn into_document(document: Value) -> Result<OpenApiDocument> {
    let spec: OpenApiDocument = serde_json::from_value(document)
        .map_err(|e| Error::Load(format!("failed to parse OpenAPI spec: {e}")))?;

    if !spec.openapi.starts_with("3.") {
        return Err(Error::Load(format!(
            "unsupported OpenAPI version '{}', expected 3.x",
            spec.openapi
        )));
    }

    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_YAML: &str = r"
openapi: 3.0.3
info:
  title: Minimal
  version: '1.0'
paths:
  /ping:
    get:
      responses:
        '200':
          description: pong
";

    #[test]
    fn test_source_classification() {
        assert!(matches!(
            SpecSource::parse("https://example.com/openapi.json").unwrap(),
            SpecSource::Url(_)
        ));
        assert!(SpecSource::parse("http://localhost:8080/spec.yaml").unwrap().is_remote());
        assert_eq!(
            SpecSource::parse("./specs/petstore.yaml").unwrap(),
            SpecSource::Path(PathBuf::from("./specs/petstore.yaml"))
        );
        assert_eq!(
            SpecSource::parse("ftp://example.com/spec.yaml").unwrap(),
            SpecSource::Path(PathBuf::from("ftp://example.com/spec.yaml"))
        );
    }

    #[test]
    fn test_empty_source_is_a_configuration_error() {
        assert!(matches!(SpecSource::parse(""), Err(Error::Config(_))));
        assert!(matches!(SpecSource::parse("   "), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_url_is_a_configuration_error() {
        assert!(matches!(SpecSource::parse("http://"), Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_yaml_and_json() {
        let spec = parse_spec(MINIMAL_YAML.as_bytes()).unwrap();
        assert_eq!(spec.info.title, "Minimal");

        let json = r#"{"openapi":"3.0.0","info":{"title":"J","version":"2"},"paths":{}}"#;
        let spec = parse_spec(json.as_bytes()).unwrap();
        assert_eq!(spec.info.version, "2");
        assert!(spec.paths.is_empty());
    }

    #[test]
    fn test_parse_openapi_31_document() {
        let yaml = r"
openapi: 3.1.0
info:
  title: Modern
  version: '1'
  license:
    name: Apache-2.0
    identifier: Apache-2.0
paths:
  /pets:
    get:
      responses:
        200:
          description: ok
components:
  schemas:
    Pet:
      type: object
      properties:
        nickname:
          type: [string, 'null']
        age:
          type: integer
          exclusiveMinimum: 0
";
        let spec = parse_spec(yaml.as_bytes()).unwrap();
        assert_eq!(spec.openapi, "3.1.0");
        let operation = spec.paths["/pets"].as_item().unwrap().get.as_ref().unwrap();
        assert!(operation.responses.contains_key("200"));
        assert_eq!(spec.components.unwrap().schemas.len(), 1);
    }

    #[test]
    fn test_swagger_2_is_rejected() {
        let yaml = "swagger: '2.0'\nopenapi: '2.0'\ninfo: { title: Old, version: '1' }\npaths: {}\n";
        match parse_spec(yaml.as_bytes()) {
            Err(Error::Load(message)) => assert!(message.contains("unsupported OpenAPI version")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_join_relative_locations() {
        let remote = SpecSource::parse("https://example.com/api/v1/openapi.yaml").unwrap();
        assert_eq!(
            remote.join("common.yaml").unwrap(),
            SpecSource::parse("https://example.com/api/v1/common.yaml").unwrap()
        );
        assert_eq!(
            remote.join("../shared/params.json").unwrap(),
            SpecSource::parse("https://example.com/api/shared/params.json").unwrap()
        );
        assert_eq!(
            remote.join("https://other.example.com/x.yaml").unwrap(),
            SpecSource::parse("https://other.example.com/x.yaml").unwrap()
        );
        assert_eq!(remote.join("").unwrap(), remote);

        let local = SpecSource::Path(PathBuf::from("/no/such/dir/openapi.yaml"));
        assert_eq!(
            local.join("common.yaml").unwrap(),
            SpecSource::Path(PathBuf::from("/no/such/dir/common.yaml"))
        );
        assert_eq!(
            local.join("/elsewhere/common.yaml").unwrap(),
            SpecSource::Path(PathBuf::from("/elsewhere/common.yaml"))
        );
    }

    #[test]
    fn test_parse_garbage_is_a_load_error() {
        assert!(matches!(parse_spec(b"not: [an, openapi"), Err(Error::Load(_))));
        assert!(matches!(parse_spec(b"just a string"), Err(Error::Load(_))));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.yaml");
        std::fs::write(&path, MINIMAL_YAML).unwrap();

        let cache = ContentCache::new(&crate::cache::CacheConfig {
            directory: Some(dir.path().join("cache").display().to_string()),
            ..Default::default()
        })
        .unwrap();

        let spec = load_spec(&SpecSource::Path(path), &cache).await.unwrap();
        assert_eq!(spec.info.title, "Minimal");
        assert!(!dir.path().join("cache").exists());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_a_load_error() {
        let cache = ContentCache::new(&crate::cache::CacheConfig::default()).unwrap();
        let result = load_spec(&SpecSource::Path(PathBuf::from("/no/such/spec.yaml")), &cache).await;
        assert!(matches!(result, Err(Error::Load(_))));
    }
}
