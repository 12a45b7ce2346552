//! Shared string utilities.

/// Convert a camelCase name to kebab-case (e.g., "readStoresPos" -> "read-stores-pos")
pub fn to_kebab_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('-');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result.replace('_', "-")
}

/// Derive a checkout directory name from a git URL.
///
/// Takes the last path component and strips a trailing `.git`
/// (e.g., "https://example.com/fmt.git" -> "fmt").
pub fn strip_git_suffix(url: &str) -> &str {
    let base = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    match base.strip_suffix(".git") {
        Some(stem) if !stem.is_empty() => stem,
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_kebab_case() {
        assert_eq!(to_kebab_case("readStoresPos"), "read-stores-pos");
        assert_eq!(to_kebab_case("verbose"), "verbose");
        assert_eq!(to_kebab_case("opaque_types"), "opaque-types");
        assert_eq!(to_kebab_case(""), "");
    }

    #[test]
    fn test_strip_git_suffix() {
        assert_eq!(strip_git_suffix("https://example.com/fmt.git"), "fmt");
        assert_eq!(
            strip_git_suffix("https://github.com/kaitai-io/kaitai_struct_formats"),
            "kaitai_struct_formats"
        );
        assert_eq!(strip_git_suffix("git@host:org/repo.git/"), "repo");
        assert_eq!(strip_git_suffix(".git"), ".git");
    }
}
