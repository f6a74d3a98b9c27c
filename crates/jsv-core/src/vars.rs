//! Output variable names.
//!
//! Every variable the callout writes shares the [`VAR_PREFIX`] prefix.

/// Prefix applied to every output variable.
pub const VAR_PREFIX: &str = "jsv_";

/// Boolean outcome of the validation attempt.
pub const VALID: &str = "valid";
/// Short error message, for failures and errors alike.
pub const ERROR: &str = "error";
/// Tag naming the category of `error`.
pub const ERROR_KIND: &str = "errorKind";
/// Full report text, in debug mode.
pub const REPORT: &str = "report";
/// Resolved schema resource name.
pub const SCHEMA_NAME: &str = "schemaName";
/// Full error text.
pub const EXCEPTION: &str = "exception";
/// Error with its cause chain.
pub const STACKTRACE: &str = "stacktrace";
/// Set to `false` whenever an error occurs.
pub const SUCCESS: &str = "success";

/// Variables cleared at the start of every invocation.
pub const RESET_ON_ENTRY: [&str; 3] = [ERROR, ERROR_KIND, VALID];

/// Prefixed variable name, e.g. `var_name(VALID) == "jsv_valid"`.
pub fn var_name(name: &str) -> String {
    format!("{VAR_PREFIX}{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_prefixed() {
        assert_eq!(var_name(VALID), "jsv_valid");
        assert_eq!(var_name(SCHEMA_NAME), "jsv_schemaName");
    }
}
