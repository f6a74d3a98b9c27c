//! # Callout Configuration
//!
//! Typed view over the string properties the host supplies once per
//! deployed callout. Built once, shared read-only by every invocation.
//!
//! | property         | meaning                                               |
//! |------------------|-------------------------------------------------------|
//! | `schema`         | inline schema, `*.json` resource, or `{var}` to either |
//! | `debug`          | `"true"` to record reports and log traces             |
//! | `suppress-fault` | `"true"` (after resolution) turns abort into proceed  |
//!
//! Unknown property names are rejected at construction. A missing or blank
//! `schema` is not: it is reported per request as a configuration error so
//! the pipeline sees it through the usual output variables.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::context::MessageContext;
use crate::error::ConfigError;
use crate::resolve::{parse_exact_flag, parse_flag, resolve_property_value};

/// Property naming the schema.
pub const PROP_SCHEMA: &str = "schema";
/// Property enabling debug output.
pub const PROP_DEBUG: &str = "debug";
/// Property enabling fault suppression.
pub const PROP_SUPPRESS_FAULT: &str = "suppress-fault";

const KNOWN_PROPERTIES: [&str; 3] = [PROP_SCHEMA, PROP_DEBUG, PROP_SUPPRESS_FAULT];

/// Immutable callout configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>")]
pub struct CalloutConfig {
    schema: Option<String>,
    debug: bool,
    suppress_fault: Option<String>,
}

impl CalloutConfig {
    /// Build from name/value pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProperty`] for any unrecognized name.
    pub fn from_properties<I, K, V>(properties: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();
        for (name, value) in properties {
            let name = name.as_ref();
            let value = value.into();
            match name {
                PROP_SCHEMA => config.schema = Some(value),
                PROP_DEBUG => config.debug = parse_flag(Some(&value)),
                PROP_SUPPRESS_FAULT => config.suppress_fault = Some(value),
                other => {
                    return Err(ConfigError::UnknownProperty {
                        name: other.to_string(),
                    })
                }
            }
        }
        Ok(config)
    }

    /// Build from a JSON object whose values are all strings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotAnObject`] or
    /// [`ConfigError::NonStringProperty`] for malformed input, and
    /// [`ConfigError::UnknownProperty`] for unrecognized names.
    pub fn from_json(properties: &Value) -> Result<Self, ConfigError> {
        let map = properties.as_object().ok_or(ConfigError::NotAnObject)?;
        let mut pairs = Vec::with_capacity(map.len());
        for (name, value) in map {
            let value = value.as_str().ok_or_else(|| ConfigError::NonStringProperty {
                name: name.clone(),
            })?;
            pairs.push((name.as_str(), value));
        }
        Self::from_properties(pairs)
    }

    /// Builder: set the `schema` property.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Builder: set the `debug` flag.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builder: set the `suppress-fault` property (literal or `{var}`).
    pub fn with_suppress_fault(mut self, value: impl Into<String>) -> Self {
        self.suppress_fault = Some(value.into());
        self
    }

    /// The raw `schema` property, before resolution.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Whether debug output is enabled.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// The raw `suppress-fault` property, before resolution.
    pub fn suppress_fault_property(&self) -> Option<&str> {
        self.suppress_fault.as_deref()
    }

    /// Resolve `suppress-fault` against the current request.
    ///
    /// Absent, blank, unresolved, or anything other than `"true"` is false.
    /// Case is ignored; surrounding whitespace is not.
    pub fn suppress_fault(&self, ctx: &dyn MessageContext) -> bool {
        let Some(raw) = self.suppress_fault.as_deref() else {
            return false;
        };
        if raw.is_empty() {
            return false;
        }
        parse_exact_flag(resolve_property_value(raw, ctx).as_deref())
    }

    /// Names this configuration accepts.
    pub fn known_properties() -> &'static [&'static str] {
        &KNOWN_PROPERTIES
    }
}

impl TryFrom<BTreeMap<String, String>> for CalloutConfig {
    type Error = ConfigError;

    fn try_from(properties: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        Self::from_properties(properties)
    }
}
