//! Branch and ref name validation following git-style conventions.
//!
//! Valid branch names:
//! - Must be non-empty
//! - Must not contain whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\`
//! - Must not contain `..` (double dot) or `@{`
//! - Must not start or end with `/`, must not end with `.`
//! - Must not end with `.lock`
//! - Components between slashes must be non-empty and not start with `.`

use crate::error::{RefError, Result};

/// Characters that are forbidden anywhere in a ref name.
const FORBIDDEN_CHARS: &[char] = &[
    ' ', '\t', '\n', '\r', '\0', '~', '^', ':', '?', '*', '[', '\\',
];

/// Prefix of every branch ref.
pub const HEADS_PREFIX: &str = "refs/heads/";

/// The canonical ref name for a branch (`main` → `refs/heads/main`).
pub fn branch_ref(branch: &str) -> String {
    format!("{HEADS_PREFIX}{branch}")
}

fn invalid(name: &str, reason: impl Into<String>) -> RefError {
    RefError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate a branch name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use grit_refs::names::validate_branch_name;
///
/// assert!(validate_branch_name("main").is_ok());
/// assert!(validate_branch_name("feature/auth").is_ok());
/// assert!(validate_branch_name("").is_err());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "name must not be empty"));
    }

    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(name, format!("contains forbidden character: {ch:?}")));
    }

    if name.contains("..") {
        return Err(invalid(name, "must not contain '..'"));
    }

    if name.contains("@{") {
        return Err(invalid(name, "must not contain '@{'"));
    }

    if name.ends_with('.') {
        return Err(invalid(name, "must not end with '.'"));
    }

    if name.starts_with('/') || name.ends_with('/') {
        return Err(invalid(name, "must not start or end with '/'"));
    }

    if name.ends_with(".lock") {
        return Err(invalid(name, "must not end with '.lock'"));
    }

    for component in name.split('/') {
        if component.is_empty() {
            return Err(invalid(name, "path components must not be empty"));
        }
        if component.starts_with('.') {
            return Err(invalid(
                name,
                format!("component must not start with '.': {component:?}"),
            ));
        }
    }

    Ok(())
}

/// Validate a full ref name such as `refs/heads/main`.
pub fn validate_ref_name(name: &str) -> Result<()> {
    let rest = name
        .strip_prefix("refs/")
        .ok_or_else(|| invalid(name, "must start with 'refs/'"))?;
    validate_branch_name(rest).map_err(|e| match e {
        RefError::InvalidName { reason, .. } => invalid(name, reason),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_simple_names() {
        assert!(validate_branch_name("main").is_ok());
        assert!(validate_branch_name("my-branch").is_ok());
        assert!(validate_branch_name("v1.0").is_ok());
    }

    #[test]
    fn valid_nested_names() {
        assert!(validate_branch_name("feature/auth").is_ok());
        assert!(validate_branch_name("user/alice/fix-123").is_ok());
    }

    #[test]
    fn reject_empty_name() {
        assert!(validate_branch_name("").is_err());
    }

    #[test]
    fn reject_double_dot() {
        assert!(validate_branch_name("bad..name").is_err());
    }

    #[test]
    fn reject_whitespace_and_forbidden_chars() {
        for bad in ["has space", "has\ttab", "a~b", "a^b", "a:b", "a?b", "a*b", "a[b", "a\\b"] {
            assert!(validate_branch_name(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn reject_boundaries() {
        assert!(validate_branch_name(".hidden").is_err());
        assert!(validate_branch_name("trailing.").is_err());
        assert!(validate_branch_name("/leading").is_err());
        assert!(validate_branch_name("trailing/").is_err());
        assert!(validate_branch_name("a//b").is_err());
        assert!(validate_branch_name("main.lock").is_err());
        assert!(validate_branch_name("ref@{0}").is_err());
        assert!(validate_branch_name("feature/.hidden").is_err());
    }

    #[test]
    fn ref_names_need_refs_prefix() {
        assert!(validate_ref_name("refs/heads/main").is_ok());
        assert!(validate_ref_name("heads/main").is_err());
        assert!(validate_ref_name("refs/heads/bad..x").is_err());
    }

    #[test]
    fn branch_ref_formatting() {
        assert_eq!(branch_ref("main"), "refs/heads/main");
        assert_eq!(branch_ref("feature/x"), "refs/heads/feature/x");
    }
}
