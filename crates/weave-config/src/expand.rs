//! `${VAR}` and `${VAR:-default}` expansion in configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// `${VAR}` fails if `VAR` is unset; `${VAR:-default}` falls back to
/// `default`. Bare `$VAR` is left alone, so values without `${` are
/// returned unchanged.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| match std::env::var(name) {
        Ok(found) => Ok(Some(found)),
        Err(_) => Err(Unset(name.to_owned())),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|err| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", err.cause.0),
    })
}

/// Lookup failure carrying the variable name.
struct Unset(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expands_set_variable() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::set_var("WEAVE_EXPAND_BOOK", "/books/go");
        }
        let result = expand_env("${WEAVE_EXPAND_BOOK}/ch1/hype.md", "document.context").unwrap();
        assert_eq!(result, "/books/go/ch1/hype.md");
        unsafe {
            std::env::remove_var("WEAVE_EXPAND_BOOK");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("WEAVE_EXPAND_UNSET");
        }
        let result = expand_env("${WEAVE_EXPAND_UNSET:-.}", "document.origin").unwrap();
        assert_eq!(result, ".");
    }

    #[test]
    fn test_value_wins_over_default() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::set_var("WEAVE_EXPAND_ORIGIN", "/work");
        }
        let result = expand_env("${WEAVE_EXPAND_ORIGIN:-.}", "document.origin").unwrap();
        assert_eq!(result, "/work");
        unsafe {
            std::env::remove_var("WEAVE_EXPAND_ORIGIN");
        }
    }

    #[test]
    fn test_missing_variable_names_field() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("WEAVE_EXPAND_MISSING");
        }
        let err = expand_env("${WEAVE_EXPAND_MISSING}", "document.file").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("WEAVE_EXPAND_MISSING"));
        assert!(message.contains("document.file"));
    }

    #[test]
    fn test_bare_dollar_untouched() {
        assert_eq!(expand_env("$HOME/notes.md", "document.file").unwrap(), "$HOME/notes.md");
    }
}
