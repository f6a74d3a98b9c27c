//! # Validation Engine
//!
//! Compiles JSON Schema documents with the `jsonschema` crate and validates
//! instances against them, producing a [`ValidationReport`].
//!
//! ## Schema Resolution
//!
//! Cross-schema `$ref`s are resolved against the engine's
//! [`ResourceBundle`], never the network. A schema loaded from
//! `order.json` may say `{"$ref": "address.json"}` and the engine reads
//! `/resources/address.json`.
//!
//! Schemas read from the bundle are compiled with their own location as
//! base ([`SchemaEngine::validate_at`]), so relative references resolve
//! against the referring file's directory: `nested/holder.json` saying
//! `{"$ref": "word.json"}` reads `/resources/nested/word.json`.
//!
//! ## Caching
//!
//! Compiled validators are keyed by base and schema text. A cached
//! validator keeps the `$ref`'d resources it was compiled with; call
//! [`SchemaEngine::clear_cache`] after changing bundle contents, or set
//! `cache_capacity` to `0` to read them on every request.
//!
//! ## Thread Safety
//!
//! `SchemaEngine` is `Send + Sync`. One engine is built by the host and
//! shared (behind an `Arc`) by every callout instance and every request.
//! Compiled validators are cached behind a `parking_lot::RwLock`; readers
//! never block each other and the lock is never held while compiling.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsonschema::{Draft, Retrieve, Uri, ValidationOptions, Validator};
use jsv_core::{CalloutError, ConfigError};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::bundle::{normalize_resource_name, ResourceBundle, RESOURCE_ROOT};

/// Default number of compiled schemas kept by an engine.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// URI scheme the engine uses for schemas without an absolute `$id`.
const BUNDLE_SCHEME: &str = "json-schema";

/// Environment variable forcing the draft used for every schema.
pub const ENV_DEFAULT_DRAFT: &str = "JSV_DEFAULT_DRAFT";
/// Environment variable bounding the compiled-schema cache.
pub const ENV_CACHE_CAPACITY: &str = "JSV_SCHEMA_CACHE_CAPACITY";

/// Errors raised by the engine itself.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The schema is not a valid JSON Schema, or a `$ref` could not be resolved.
    #[error("schema compilation failed: {reason}")]
    Compile {
        /// Engine-provided description.
        reason: String,
    },
}

impl From<EngineError> for CalloutError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Compile { reason } => CalloutError::Engine { reason },
        }
    }
}

/// Engine settings, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Draft applied to every schema, taking precedence over `$schema`;
    /// `None` detects it from `$schema`.
    pub default_draft: Option<Draft>,
    /// Maximum cached compiled schemas; `0` disables caching.
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_draft: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Load settings from the environment.
    ///
    /// Variables:
    /// - `JSV_DEFAULT_DRAFT`: `4`, `6`, `7`, `2019-09` or `2020-12` (default: unset)
    /// - `JSV_SCHEMA_CACHE_CAPACITY`: non-negative integer (default: 64)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] for unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_DEFAULT_DRAFT) {
            config.default_draft = Some(parse_draft(&raw).ok_or_else(|| {
                ConfigError::InvalidSetting {
                    name: ENV_DEFAULT_DRAFT.to_string(),
                    value: raw.clone(),
                }
            })?);
        }
        if let Some(raw) = lookup(ENV_CACHE_CAPACITY) {
            config.cache_capacity =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidSetting {
                        name: ENV_CACHE_CAPACITY.to_string(),
                        value: raw.clone(),
                    })?;
        }
        Ok(config)
    }
}

/// Parse a draft name as accepted by `JSV_DEFAULT_DRAFT`.
pub fn parse_draft(raw: &str) -> Option<Draft> {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("draft")
        .or_else(|| raw.strip_prefix("Draft"))
        .unwrap_or(raw)
        .trim_start_matches(['-', ' ']);
    match raw {
        "4" | "04" => Some(Draft::Draft4),
        "6" | "06" => Some(Draft::Draft6),
        "7" | "07" => Some(Draft::Draft7),
        "2019-09" | "201909" => Some(Draft::Draft201909),
        "2020-12" | "202012" => Some(Draft::Draft202012),
        _ => None,
    }
}

/// Resolves `$ref` URIs against the bundle.
///
/// Only the path part of the URI is used, so `address.json`,
/// `json-schema:///address.json` and `https://example.com/address.json`
/// all read `/resources/address.json` when there is no base directory.
///
/// With a base directory, `json-schema:` paths outside `/resources` are
/// taken relative to it. That covers draft 4-7 roots whose `$ref` makes
/// the engine ignore the `$id` that carries the base.
struct BundleRetriever {
    bundle: Arc<dyn ResourceBundle>,
    base_dir: Option<String>,
}

impl BundleRetriever {
    fn resource_name(&self, uri: &str) -> String {
        let path = uri_path(uri);
        match &self.base_dir {
            Some(dir) if is_bundle_uri(uri) && !is_under_root(path) => {
                format!("{dir}{}", path.trim_start_matches('/'))
            }
            _ => normalize_resource_name(path),
        }
    }
}

impl Retrieve for BundleRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let name = self.resource_name(uri.as_str());
        let bytes = self.bundle.read(&name)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn is_bundle_uri(uri: &str) -> bool {
    uri.strip_prefix(BUNDLE_SCHEME)
        .is_some_and(|rest| rest.starts_with(':'))
}

fn is_under_root(path: &str) -> bool {
    path.strip_prefix(RESOURCE_ROOT)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// `json-schema:` URI of a normalized resource name.
pub fn resource_uri(path: &str) -> String {
    format!("{BUNDLE_SCHEME}:///{}", path.trim_start_matches('/'))
}

/// Directory part of a normalized resource name, with trailing `/`.
fn resource_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(i) => path[..=i].to_string(),
        None => format!("{RESOURCE_ROOT}/"),
    }
}

/// `schema` with `uri` as its root identifier, unless it already has one.
fn with_base_id<'a>(schema: &'a Value, uri: &str, draft: Draft) -> Cow<'a, Value> {
    let key = if draft == Draft::Draft4 { "id" } else { "$id" };
    match schema {
        Value::Object(map) if !map.contains_key(key) => {
            let mut map = map.clone();
            map.insert(key.to_string(), Value::String(uri.to_string()));
            Cow::Owned(Value::Object(map))
        }
        _ => Cow::Borrowed(schema),
    }
}

/// Path component of a URI string: everything after the scheme and
/// authority, without query or fragment.
fn uri_path(uri: &str) -> &str {
    let rest = match uri.find(':') {
        Some(i) if uri[..i].chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) => {
            &uri[i + 1..]
        }
        _ => uri,
    };
    let rest = match rest.strip_prefix("//") {
        Some(after) => after.find('/').map_or("", |i| &after[i..]),
        None => rest,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer path to the violating value in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Outcome of validating one document against one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    success: bool,
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// Build a report from a violation list; empty means success.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            success: violations.is_empty(),
            violations,
        }
    }

    /// Whether the document conforms.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// All violations, in engine order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            return f.write_str("success");
        }
        write!(f, "failure: {} violation(s)", self.violations.len())?;
        for v in &self.violations {
            write!(f, "\n{v}")?;
        }
        Ok(())
    }
}

/// Base resource path (if any) and serialized schema.
type CacheKey = (Option<String>, String);

/// Shareable JSON Schema engine.
pub struct SchemaEngine {
    bundle: Arc<dyn ResourceBundle>,
    config: EngineConfig,
    cache: RwLock<HashMap<CacheKey, Arc<Validator>>>,
}

impl fmt::Debug for SchemaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEngine")
            .field("bundle", &self.bundle)
            .field("config", &self.config)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

impl SchemaEngine {
    /// Engine resolving resources and `$ref`s against `bundle`.
    pub fn new(bundle: Arc<dyn ResourceBundle>, config: EngineConfig) -> Self {
        Self {
            bundle,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The bundle this engine resolves against.
    pub fn bundle(&self) -> &Arc<dyn ResourceBundle> {
        &self.bundle
    }

    /// Engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of compiled schemas currently cached.
    pub fn cached_schemas(&self) -> usize {
        self.cache.read().len()
    }

    /// Drop every cached validator.
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    fn options(&self, base: Option<&str>) -> ValidationOptions {
        let mut opts = jsonschema::options();
        if let Some(draft) = self.config.default_draft {
            opts.with_draft(draft);
        }
        opts.with_retriever(BundleRetriever {
            bundle: Arc::clone(&self.bundle),
            base_dir: base.map(resource_dir),
        });
        opts
    }

    /// Draft the engine will apply to `schema`.
    fn draft_for(&self, schema: &Value) -> Draft {
        self.config
            .default_draft
            .unwrap_or_else(|| Draft::default().detect(schema).unwrap_or_default())
    }

    /// Compile `schema`, reusing a cached validator when one exists.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Compile`] if the schema is invalid or a
    /// `$ref` cannot be resolved.
    pub fn compile(&self, schema: &Value) -> Result<Arc<Validator>, EngineError> {
        self.compile_at(schema, None)
    }

    /// Compile `schema` as if read from the bundle resource `base`
    /// (a normalized name such as `/resources/nested/holder.json`).
    ///
    /// # Errors
    ///
    /// Same as [`SchemaEngine::compile`].
    pub fn compile_at(
        &self,
        schema: &Value,
        base: Option<&str>,
    ) -> Result<Arc<Validator>, EngineError> {
        if self.config.cache_capacity == 0 {
            return self.build(schema, base).map(Arc::new);
        }

        let key: CacheKey = (base.map(str::to_string), schema.to_string());
        if let Some(validator) = self.cache.read().get(&key) {
            return Ok(Arc::clone(validator));
        }

        let validator = Arc::new(self.build(schema, base)?);
        let mut cache = self.cache.write();
        if cache.len() >= self.config.cache_capacity {
            tracing::debug!(evicted = cache.len(), "schema cache full, clearing");
            cache.clear();
        }
        Ok(Arc::clone(cache.entry(key).or_insert(validator)))
    }

    fn build(&self, schema: &Value, base: Option<&str>) -> Result<Validator, EngineError> {
        let document = match base {
            Some(path) => with_base_id(schema, &resource_uri(path), self.draft_for(schema)),
            None => Cow::Borrowed(schema),
        };
        self.options(base)
            .build(&document)
            .map_err(|e| EngineError::Compile {
                reason: e.to_string(),
            })
    }

    /// Validate `instance` against `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Compile`] if the schema cannot be compiled.
    /// A non-conforming instance is not an error; it yields a report with
    /// `is_success() == false`.
    pub fn validate(
        &self,
        schema: &Value,
        instance: &Value,
    ) -> Result<ValidationReport, EngineError> {
        self.validate_at(schema, None, instance)
    }

    /// Validate `instance` against `schema` read from the bundle resource
    /// `base`; relative `$ref`s resolve against that resource's directory.
    ///
    /// # Errors
    ///
    /// Same as [`SchemaEngine::validate`].
    pub fn validate_at(
        &self,
        schema: &Value,
        base: Option<&str>,
        instance: &Value,
    ) -> Result<ValidationReport, EngineError> {
        let validator = self.compile_at(schema, base)?;
        let violations = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        Ok(ValidationReport::from_violations(violations))
    }
}
