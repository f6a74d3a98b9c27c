//! # Property Value Resolution
//!
//! A configured property value of the form `{name}` stands for the current
//! value of the context variable `name`. Anything else is a literal.
//!
//! ## Rules
//!
//! A value is a reference when all of the following hold:
//!
//! 1. it starts with `{` and ends with `}`;
//! 2. it contains no space character;
//! 3. the text between the braces is non-empty and contains none of the
//!    JSON structural characters `{ } [ ] " : ,`.
//!
//! Rule 3 keeps compact inline schema text such as `{"type":"object"}`
//! literal; no context variable name can contain those characters.
//!
//! Resolving a reference to an unbound variable yields `None`. Deciding
//! whether that is an error is left to the caller.

use std::borrow::Cow;

use crate::context::MessageContext;

const STRUCTURAL: [char; 7] = ['{', '}', '[', ']', '"', ':', ','];

/// If `spec` is a `{name}` reference, the variable name it points to.
pub fn variable_reference(spec: &str) -> Option<&str> {
    if spec.contains(' ') {
        return None;
    }
    let name = spec.strip_prefix('{')?.strip_suffix('}')?;
    if name.is_empty() || name.contains(STRUCTURAL) {
        return None;
    }
    Some(name)
}

/// Resolve a property value against the context.
///
/// Literals are borrowed unchanged; references are replaced by the
/// variable's string form, or `None` when the variable is unbound.
pub fn resolve_property_value<'a>(
    spec: &'a str,
    ctx: &dyn MessageContext,
) -> Option<Cow<'a, str>> {
    match variable_reference(spec) {
        Some(name) => ctx
            .get_variable(name)
            .map(|value| Cow::Owned(value.to_string())),
        None => Some(Cow::Borrowed(spec)),
    }
}

/// `"true"` (case-insensitive, surrounding whitespace ignored) is true;
/// anything else, including absence, is false.
pub fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Like [`parse_flag`] but without trimming: `" true "` is false.
pub fn parse_exact_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}
