//! # Validator Callout
//!
//! The request-time state machine:
//!
//! ```text
//! START → BODY_PARSED → SCHEMA_LOADED → VALIDATED → { PROCEED, ABORT }
//!   └──────────── any error ─────────────────────→ { PROCEED, ABORT }
//! ```
//!
//! One `ValidatorCallout` is built per deployed policy and serves every
//! request concurrently; it holds only immutable configuration and a shared
//! [`SchemaEngine`].

use std::sync::Arc;

use jsv_core::{CalloutConfig, CalloutError, ConfigError, MessageContext, ParseTarget};
use jsv_schema::{SchemaEngine, SchemaLoader, ValidationReport};
use serde_json::Value;

use crate::outcome::{self, ExecutionResult};

/// JSON Schema validation callout.
#[derive(Debug, Clone)]
pub struct ValidatorCallout {
    config: CalloutConfig,
    loader: SchemaLoader,
    engine: Arc<SchemaEngine>,
}

impl ValidatorCallout {
    /// Callout using `engine` for resources and validation.
    pub fn new(config: CalloutConfig, engine: Arc<SchemaEngine>) -> Self {
        let loader = SchemaLoader::new(Arc::clone(engine.bundle()));
        Self {
            config,
            loader,
            engine,
        }
    }

    /// Callout configured from host-supplied properties.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProperty`] for unrecognized names.
    pub fn from_properties<I, K, V>(
        properties: I,
        engine: Arc<SchemaEngine>,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Ok(Self::new(CalloutConfig::from_properties(properties)?, engine))
    }

    /// The callout's configuration.
    pub fn config(&self) -> &CalloutConfig {
        &self.config
    }

    /// The shared engine.
    pub fn engine(&self) -> &Arc<SchemaEngine> {
        &self.engine
    }

    /// Validate the request body and record the outcome in `ctx`.
    ///
    /// Never panics on bad input: every failure is reported through the
    /// output variables and the returned signal.
    pub fn execute(&self, ctx: &mut dyn MessageContext) -> ExecutionResult {
        let span = tracing::debug_span!("jsv.execute", debug = self.config.debug());
        let _guard = span.enter();

        outcome::clear_stale(ctx);
        match self.validate(ctx) {
            Ok(report) => outcome::record_report(&self.config, ctx, &report),
            Err(err) => outcome::record_error(&self.config, ctx, &err),
        }
    }

    fn validate(&self, ctx: &mut dyn MessageContext) -> Result<ValidationReport, CalloutError> {
        let body: Value = serde_json::from_reader(ctx.content())
            .map_err(|e| CalloutError::parse(ParseTarget::Body, e))?;

        let schema = self.loader.load(self.config.schema(), ctx)?;
        tracing::debug!(schema.source = schema.source.as_str(), "schema loaded");

        let base = schema.source.resource_path();
        Ok(self.engine.validate_at(&schema.document, base, &body)?)
    }
}
