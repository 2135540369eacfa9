//! OpenAPI document loading and read-only queries

pub mod category;
pub mod loader;
pub mod model;
pub mod query;
pub mod resolver;
pub mod schema;

pub use loader::{load_spec, parse_spec, SpecSource};
pub use model::OpenApiDocument;
pub use query::{QueryOutput, SpecExplorer, SCHEMA_REF_PREFIX};
pub use resolver::RefResolver;
