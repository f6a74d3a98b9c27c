//! # Schema Loader
//!
//! Turns the configured `schema` property into a parsed schema document.
//!
//! 1. The raw property must be present and non-blank.
//! 2. It is resolved through the `{name}` convention; the result must be
//!    present and non-blank.
//! 3. A trimmed value ending in `.json` names a bundled resource; the name
//!    is recorded in `jsv_schemaName` before the resource is read.
//! 4. Anything else is parsed directly as inline schema text.

use std::sync::Arc;

use jsv_core::vars::{self, var_name};
use jsv_core::{
    resolve_property_value, variable_reference, CalloutError, ConfigError, MessageContext,
    ParseTarget,
};
use serde_json::Value;

use crate::bundle::{normalize_resource_name, ResourceBundle, RESOURCE_SUFFIX};

/// Where a loaded schema came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Parsed from configuration text.
    Inline,
    /// Read from the bundle.
    Resource {
        /// The resolved name as configured, e.g. `order.json`.
        name: String,
        /// The normalized name that was read, e.g. `/resources/order.json`.
        path: String,
    },
}

impl SchemaSource {
    /// Short tag for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Resource { .. } => "resource",
        }
    }

    /// Normalized bundle name for resource schemas.
    pub fn resource_path(&self) -> Option<&str> {
        match self {
            Self::Inline => None,
            Self::Resource { path, .. } => Some(path),
        }
    }
}

/// A parsed schema and its origin.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    /// The schema document.
    pub document: Value,
    /// Where it came from.
    pub source: SchemaSource,
}

/// Loads schemas from configuration text or the bundle.
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    bundle: Arc<dyn ResourceBundle>,
}

impl SchemaLoader {
    /// Loader reading resources from `bundle`.
    pub fn new(bundle: Arc<dyn ResourceBundle>) -> Self {
        Self { bundle }
    }

    /// Load the schema named by the raw `schema` property.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingSchema`] / [`ConfigError::EmptySchema`] for an
    ///   absent or blank property.
    /// - [`ConfigError::UnresolvedSchema`] when a `{name}` reference resolves
    ///   to nothing or to blank text.
    /// - [`jsv_core::ResourceError`] when the named resource does not exist.
    /// - A parse error when the schema text is not well-formed JSON.
    pub fn load(
        &self,
        schema_property: Option<&str>,
        ctx: &mut dyn MessageContext,
    ) -> Result<LoadedSchema, CalloutError> {
        let raw = schema_property.ok_or(ConfigError::MissingSchema)?.trim();
        if raw.is_empty() {
            return Err(ConfigError::EmptySchema.into());
        }

        let unresolved = || ConfigError::UnresolvedSchema {
            reference: raw.to_string(),
        };
        let resolved = resolve_property_value(raw, &*ctx).ok_or_else(unresolved)?;
        let resolved = resolved.trim();
        if resolved.is_empty() {
            return Err(unresolved().into());
        }

        if resolved.ends_with(RESOURCE_SUFFIX) {
            ctx.set_variable(&var_name(vars::SCHEMA_NAME), resolved.into());
            let path = normalize_resource_name(resolved);
            let bytes = self.bundle.read(&path)?;
            let document = serde_json::from_slice(&bytes)
                .map_err(|e| CalloutError::parse(ParseTarget::ResourceSchema, e))?;
            tracing::debug!(schema.name = %resolved, schema.path = %path, "loaded schema resource");
            return Ok(LoadedSchema {
                document,
                source: SchemaSource::Resource {
                    name: resolved.to_string(),
                    path,
                },
            });
        }

        let document = serde_json::from_str(resolved)
            .map_err(|e| CalloutError::parse(ParseTarget::InlineSchema, e))?;
        if variable_reference(raw).is_some() {
            tracing::debug!(schema.reference = %raw, "loaded inline schema from variable");
        }
        Ok(LoadedSchema {
            document,
            source: SchemaSource::Inline,
        })
    }
}
