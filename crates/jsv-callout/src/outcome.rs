//! # Outcome Translation
//!
//! Maps a validation report, or an error from anywhere in the pipeline,
//! onto the `jsv_*` context variables and a control signal.
//!
//! | outcome          | variables written                                           | signal          |
//! |------------------|-------------------------------------------------------------|-----------------|
//! | valid            | `valid=true` (+ `report` in debug mode)                     | proceed         |
//! | invalid          | `valid=false`, `error`, `errorKind` (+ `report`)            | abort*          |
//! | error            | `exception`, `error`, `errorKind`, `stacktrace`, `success=false` | abort*     |
//!
//! \* proceed instead when `suppress-fault` resolves to true.

use jsv_core::vars::{self, var_name};
use jsv_core::{CalloutConfig, CalloutError, ContextValue, ErrorKind, MessageContext};
use jsv_schema::ValidationReport;

/// Fixed `error` text for a well-formed but non-conforming body.
pub const INVALID_MESSAGE: &str = "invalid message";

/// Control signal returned to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionResult {
    /// Continue the pipeline.
    Proceed,
    /// Halt the pipeline.
    Abort,
}

impl ExecutionResult {
    /// Whether the pipeline should continue.
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

fn set(ctx: &mut dyn MessageContext, name: &str, value: impl Into<ContextValue>) {
    ctx.set_variable(&var_name(name), value.into());
}

/// Remove outputs left over from a previous invocation.
pub fn clear_stale(ctx: &mut dyn MessageContext) {
    for name in vars::RESET_ON_ENTRY {
        ctx.remove_variable(&var_name(name));
    }
}

/// Record a completed validation attempt.
pub fn record_report(
    config: &CalloutConfig,
    ctx: &mut dyn MessageContext,
    report: &ValidationReport,
) -> ExecutionResult {
    if config.debug() {
        set(ctx, vars::REPORT, report.to_string());
    }
    set(ctx, vars::VALID, report.is_success());

    if report.is_success() {
        tracing::debug!(valid = true, "message conforms to schema");
        return ExecutionResult::Proceed;
    }

    set(ctx, vars::ERROR, INVALID_MESSAGE);
    set(ctx, vars::ERROR_KIND, ErrorKind::ValidationFailure.as_str());
    tracing::debug!(
        valid = false,
        violations = report.violations().len(),
        "message does not conform to schema"
    );
    fault_or_proceed(config, ctx)
}

/// Record an error raised before or during validation.
pub fn record_error(
    config: &CalloutConfig,
    ctx: &mut dyn MessageContext,
    err: &CalloutError,
) -> ExecutionResult {
    let trace = err.trace();
    if config.debug() {
        tracing::warn!(error.kind = %err.kind(), trace = %trace, "schema validation callout failed");
    } else {
        tracing::debug!(error.kind = %err.kind(), error = %err, "schema validation callout failed");
    }

    set(ctx, vars::EXCEPTION, err.to_string());
    set(ctx, vars::ERROR, err.short_message());
    set(ctx, vars::ERROR_KIND, err.kind().as_str());
    set(ctx, vars::STACKTRACE, trace);
    set(ctx, vars::SUCCESS, false);
    fault_or_proceed(config, ctx)
}

fn fault_or_proceed(config: &CalloutConfig, ctx: &dyn MessageContext) -> ExecutionResult {
    if config.suppress_fault(ctx) {
        tracing::debug!("fault suppressed");
        ExecutionResult::Proceed
    } else {
        ExecutionResult::Abort
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsv_core::{ConfigError, InMemoryContext};
    use jsv_schema::Violation;

    fn failing_report() -> ValidationReport {
        ValidationReport::from_violations(vec![Violation {
            instance_path: String::new(),
            schema_path: "/type".to_string(),
            message: "123 is not of type \"object\"".to_string(),
        }])
    }

    fn var<'a>(ctx: &'a InMemoryContext, name: &str) -> Option<&'a ContextValue> {
        ctx.variable(&var_name(name))
    }

    #[test]
    fn clears_only_stale_outputs() {
        let mut ctx = InMemoryContext::new()
            .with_variable("jsv_error", "old")
            .with_variable("jsv_errorKind", "parse")
            .with_variable("jsv_valid", false)
            .with_variable("jsv_exception", "kept");
        clear_stale(&mut ctx);
        assert_eq!(var(&ctx, vars::ERROR), None);
        assert_eq!(var(&ctx, vars::ERROR_KIND), None);
        assert_eq!(var(&ctx, vars::VALID), None);
        assert!(var(&ctx, vars::EXCEPTION).is_some());
    }

    #[test]
    fn success_sets_valid_only() {
        let mut ctx = InMemoryContext::new();
        let config = CalloutConfig::default();
        let result = record_report(&config, &mut ctx, &ValidationReport::from_violations(vec![]));
        assert_eq!(result, ExecutionResult::Proceed);
        assert_eq!(var(&ctx, vars::VALID), Some(&ContextValue::Bool(true)));
        assert_eq!(var(&ctx, vars::ERROR), None);
        assert_eq!(var(&ctx, vars::REPORT), None);
    }

    #[test]
    fn failure_aborts_and_records_error() {
        let mut ctx = InMemoryContext::new();
        let config = CalloutConfig::default().with_debug(true);
        let result = record_report(&config, &mut ctx, &failing_report());
        assert_eq!(result, ExecutionResult::Abort);
        assert_eq!(var(&ctx, vars::VALID), Some(&ContextValue::Bool(false)));
        assert_eq!(var(&ctx, vars::ERROR), Some(&ContextValue::from(INVALID_MESSAGE)));
        assert_eq!(
            var(&ctx, vars::ERROR_KIND),
            Some(&ContextValue::from("validation-failure"))
        );
        let report = var(&ctx, vars::REPORT).and_then(ContextValue::as_str).unwrap();
        assert!(report.contains("is not of type"));
    }

    #[test]
    fn failure_suppressed_proceeds() {
        let mut ctx = InMemoryContext::new();
        let config = CalloutConfig::default().with_suppress_fault("true");
        let result = record_report(&config, &mut ctx, &failing_report());
        assert_eq!(result, ExecutionResult::Proceed);
        assert_eq!(var(&ctx, vars::ERROR), Some(&ContextValue::from(INVALID_MESSAGE)));
    }

    #[test]
    fn error_sets_exception_variables() {
        let mut ctx = InMemoryContext::new();
        let config = CalloutConfig::default();
        let err = CalloutError::from(ConfigError::MissingSchema);
        let result = record_error(&config, &mut ctx, &err);
        assert_eq!(result, ExecutionResult::Abort);
        assert_eq!(
            var(&ctx, vars::EXCEPTION),
            Some(&ContextValue::from("configuration error: schema is not specified"))
        );
        assert_eq!(
            var(&ctx, vars::ERROR),
            Some(&ContextValue::from("schema is not specified"))
        );
        assert_eq!(
            var(&ctx, vars::ERROR_KIND),
            Some(&ContextValue::from("configuration"))
        );
        assert!(var(&ctx, vars::STACKTRACE).is_some());
        assert_eq!(var(&ctx, vars::SUCCESS), Some(&ContextValue::Bool(false)));
        assert_eq!(var(&ctx, vars::VALID), None);
    }

    #[test]
    fn error_suppressed_through_variable() {
        let mut ctx = InMemoryContext::new().with_variable("flow.lenient", "TRUE");
        let config = CalloutConfig::default().with_suppress_fault("{flow.lenient}");
        let err = CalloutError::Engine {
            reason: "boom".to_string(),
        };
        assert_eq!(record_error(&config, &mut ctx, &err), ExecutionResult::Proceed);
        assert_eq!(var(&ctx, vars::ERROR), Some(&ContextValue::from("boom")));
    }
}
