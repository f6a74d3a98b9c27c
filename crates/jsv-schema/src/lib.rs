//! # jsv-schema: Schema Loading & Validation
//!
//! Everything between the configured `schema` property and a validation
//! report.
//!
//! ## Modules
//!
//! - [`bundle`]: bundled resources under the `/resources` namespace,
//!   served from a directory or from memory.
//! - [`loader`]: resolves the `schema` property and loads either a bundled
//!   resource or inline schema text.
//! - [`engine`]: a shareable, caching wrapper around the `jsonschema`
//!   crate that produces structured [`ValidationReport`]s.
//!
//! ## Crate Policy
//!
//! - Depends only on `jsv-core` internally.
//! - Schema validation semantics belong to `jsonschema`; this crate only
//!   loads, compiles, and reports.
//! - `$ref` resolution never touches the network.

pub mod bundle;
pub mod engine;
pub mod loader;

pub use bundle::{normalize_resource_name, DirectoryBundle, MemoryBundle, ResourceBundle};
pub use engine::{EngineConfig, EngineError, SchemaEngine, ValidationReport, Violation};
pub use loader::{LoadedSchema, SchemaLoader, SchemaSource};
