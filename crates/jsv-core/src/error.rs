//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout the callout. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every failure carries an [`ErrorKind`] tag so pipeline steps can
//!   branch on the category instead of parsing message text.
//! - Every variant knows its own short, operator-facing message
//!   ([`CalloutError::short_message`]); the full `Display` form is kept
//!   for diagnostics.
//! - A schema-non-conformant body is not an error. It is a normal negative
//!   outcome, tagged [`ErrorKind::ValidationFailure`] when reported.

use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Category of a callout failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// A required property is missing, blank, unknown, or malformed.
    Configuration,
    /// A named bundled resource could not be found or read.
    Resource,
    /// The message body or the schema text is not well-formed JSON.
    Parse,
    /// The validation engine rejected the schema or failed internally.
    Engine,
    /// The body is well-formed but does not conform to the schema.
    ValidationFailure,
}

impl ErrorKind {
    /// Stable string tag written to the `errorKind` context variable.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Resource => "resource",
            Self::Parse => "parse",
            Self::Engine => "engine",
            Self::ValidationFailure => "validation-failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for a single callout invocation.
#[derive(Error, Debug)]
pub enum CalloutError {
    /// Configuration is missing, blank, or malformed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A bundled resource could not be resolved.
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    /// JSON parsing failed for the body or the schema.
    #[error("parse error: {target} is not well-formed JSON: {source}")]
    Parse {
        /// What was being parsed.
        target: ParseTarget,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The validation engine could not compile the schema or failed.
    #[error("validation engine error: {reason}")]
    Engine {
        /// Engine-provided description of the failure.
        reason: String,
    },
}

impl CalloutError {
    /// Build a parse error for the given target.
    pub fn parse(target: ParseTarget, source: serde_json::Error) -> Self {
        Self::Parse { target, source }
    }

    /// The error's category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Resource(_) => ErrorKind::Resource,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Engine { .. } => ErrorKind::Engine,
        }
    }

    /// Short message suitable for the `error` context variable.
    ///
    /// Derived from the variant rather than from the `Display` text, so it
    /// never carries the category prefix or parser positions.
    pub fn short_message(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::Resource(e) => e.to_string(),
            Self::Parse { target, .. } => format!("{target} is not well-formed JSON"),
            Self::Engine { reason } => reason.clone(),
        }
    }

    /// Full diagnostic trace: the error followed by its `source()` chain,
    /// one cause per line.
    pub fn trace(&self) -> String {
        let mut out = self.to_string();
        let mut cause: Option<&(dyn StdError + 'static)> = self.source();
        while let Some(err) = cause {
            out.push_str("\n  caused by: ");
            out.push_str(&err.to_string());
            cause = err.source();
        }
        out
    }
}

/// What a parse error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseTarget {
    /// The inbound message body.
    Body,
    /// Inline schema text from configuration.
    InlineSchema,
    /// A schema loaded from a bundled resource.
    ResourceSchema,
}

impl fmt::Display for ParseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Body => "message body",
            Self::InlineSchema => "schema",
            Self::ResourceSchema => "schema resource",
        })
    }
}

/// Configuration errors, raised at construction or at request time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The `schema` property is absent.
    #[error("schema is not specified")]
    MissingSchema,

    /// The `schema` property is present but blank.
    #[error("schema is empty")]
    EmptySchema,

    /// The `schema` property is a `{name}` reference that resolved to
    /// nothing or to a blank value.
    #[error("schema resolves to an empty string")]
    UnresolvedSchema {
        /// The reference as written in configuration.
        reference: String,
    },

    /// A property name the callout does not recognize.
    #[error("unknown property '{name}'")]
    UnknownProperty {
        /// The offending property name.
        name: String,
    },

    /// A property whose value is not a string.
    #[error("property '{name}' must be a string")]
    NonStringProperty {
        /// The offending property name.
        name: String,
    },

    /// Properties were supplied as something other than a JSON object.
    #[error("properties must be a JSON object")]
    NotAnObject,

    /// An engine setting (usually from the environment) could not be parsed.
    #[error("invalid value '{value}' for {name}")]
    InvalidSetting {
        /// Setting or environment variable name.
        name: String,
        /// The rejected value.
        value: String,
    },
}

/// Errors resolving a bundled resource.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// No resource exists under the normalized name.
    #[error("resource \"{name}\" not found")]
    NotFound {
        /// Normalized resource name, e.g. `/resources/order.json`.
        name: String,
    },

    /// The name escapes the resource namespace or is otherwise unusable.
    #[error("resource name \"{name}\" is not valid")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// The resource exists but could not be read.
    #[error("resource \"{name}\" could not be read")]
    Io {
        /// Normalized resource name.
        name: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{").unwrap_err()
    }

    #[test]
    fn kind_tags_are_stable() {
        assert_eq!(ErrorKind::Configuration.as_str(), "configuration");
        assert_eq!(ErrorKind::ValidationFailure.to_string(), "validation-failure");
        assert_eq!(
            serde_json::to_value(ErrorKind::Resource).unwrap(),
            serde_json::json!("resource")
        );
    }

    #[test]
    fn config_error_short_message_drops_prefix() {
        let err = CalloutError::from(ConfigError::EmptySchema);
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.to_string(), "configuration error: schema is empty");
        assert_eq!(err.short_message(), "schema is empty");
    }

    #[test]
    fn resource_error_short_message_names_resource() {
        let err = CalloutError::from(ResourceError::NotFound {
            name: "/resources/missing.json".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Resource);
        assert_eq!(err.short_message(), "resource \"/resources/missing.json\" not found");
    }

    #[test]
    fn parse_error_short_message_omits_position() {
        let err = CalloutError::parse(ParseTarget::Body, json_error());
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.short_message(), "message body is not well-formed JSON");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn trace_includes_source_chain() {
        let err = CalloutError::parse(ParseTarget::InlineSchema, json_error());
        let trace = err.trace();
        assert!(trace.starts_with("parse error: schema is not well-formed JSON"));
        assert!(trace.contains("caused by: EOF while parsing"));
    }

    #[test]
    fn trace_without_source_is_display() {
        let err = CalloutError::Engine {
            reason: "bad keyword".to_string(),
        };
        assert_eq!(err.trace(), err.to_string());
        assert_eq!(err.short_message(), "bad keyword");
    }
}
