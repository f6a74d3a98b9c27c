//! # jsv-core: Foundational Types for the Validation Callout
//!
//! Defines the pieces every other crate in the workspace shares: the error
//! hierarchy, the host message-context contract, the `{name}` property
//! resolution rule, the typed callout configuration, and the output
//! variable names.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod context;
pub mod error;
pub mod resolve;
pub mod vars;

// Re-export primary types for ergonomic imports.
pub use config::CalloutConfig;
pub use context::{ContextValue, InMemoryContext, MessageContext};
pub use error::{CalloutError, ConfigError, ErrorKind, ParseTarget, ResourceError};
pub use resolve::{parse_exact_flag, parse_flag, resolve_property_value, variable_reference};
