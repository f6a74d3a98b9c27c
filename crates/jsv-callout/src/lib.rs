//! # jsv-callout: JSON Schema Validation Callout
//!
//! A gateway request step that validates the message body against a
//! configured JSON Schema and reports the result through `jsv_*` context
//! variables plus a proceed/abort signal.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use jsv_callout::{init_tracing, ExecutionResult, LogFormat, ValidatorCallout};
//! use jsv_core::InMemoryContext;
//! use jsv_schema::{DirectoryBundle, EngineConfig, SchemaEngine};
//!
//! init_tracing(LogFormat::from_env())?;
//! let engine = Arc::new(SchemaEngine::new(
//!     Arc::new(DirectoryBundle::new("schemas")),
//!     EngineConfig::from_env()?,
//! ));
//! let callout = ValidatorCallout::from_properties([("schema", "order.json")], engine)?;
//!
//! let mut ctx = InMemoryContext::with_content(r#"{"id": 7}"#);
//! if callout.execute(&mut ctx) == ExecutionResult::Abort {
//!     // short-circuit the pipeline
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Policy
//!
//! - Sits at the top of the dependency DAG.
//! - Nothing escapes `execute` as a panic or an `Err`; every failure becomes
//!   output variables.

pub mod callout;
pub mod outcome;
pub mod telemetry;

pub use callout::ValidatorCallout;
pub use outcome::{ExecutionResult, INVALID_MESSAGE};
pub use telemetry::{init_tracing, LogFormat};
