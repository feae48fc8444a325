//! Syntactic validation of game source locations.
//!
//! A source location is where a game type's backing code can be fetched
//! from: an http(s) URL pointing at an archive repository. Validation
//! here is purely syntactic — it exists so that obviously malformed
//! locations fail fast at proposal time, long before the registry ever
//! attempts a network fetch. Whether the repository actually exists is
//! the fetch's problem, surfaced separately as a load failure.

/// Archive-repository suffixes we recognize as fetchable code bundles.
const RECOGNIZED_SUFFIXES: &[&str] = &[".git", ".zip", ".tar.gz"];

/// Checks that `url` is a well-formed http(s) URL ending in a
/// recognized archive-repository suffix.
///
/// Returns the offending detail on failure so callers can surface a
/// useful `invalid_input` message.
pub fn validate_source_url(url: &str) -> Result<(), String> {
    let rest = if let Some(rest) = url.strip_prefix("https://") {
        rest
    } else if let Some(rest) = url.strip_prefix("http://") {
        rest
    } else {
        return Err(format!("source URL must be http(s): {url:?}"));
    };

    // Host is everything up to the first '/'. It must be non-empty and
    // contain no whitespace.
    let (host, path) = match rest.split_once('/') {
        Some((host, path)) => (host, path),
        None => (rest, ""),
    };
    if host.is_empty() {
        return Err(format!("source URL has no host: {url:?}"));
    }
    if url.chars().any(char::is_whitespace) {
        return Err(format!("source URL contains whitespace: {url:?}"));
    }
    if path.is_empty() {
        return Err(format!("source URL has no repository path: {url:?}"));
    }

    if !RECOGNIZED_SUFFIXES.iter().any(|s| url.ends_with(s)) {
        return Err(format!(
            "source URL must end in one of {RECOGNIZED_SUFFIXES:?}: {url:?}"
        ));
    }

    Ok(())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_git_https_url() {
        assert!(validate_source_url("https://example.com/repo.git").is_ok());
    }

    #[test]
    fn test_validate_accepts_archive_suffixes() {
        assert!(validate_source_url("https://example.com/g.zip").is_ok());
        assert!(validate_source_url("http://example.com/g.tar.gz").is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_scheme() {
        assert!(validate_source_url("ftp://example.com/repo.git").is_err());
        assert!(validate_source_url("example.com/repo.git").is_err());
    }

    #[test]
    fn test_validate_rejects_missing_host_or_path() {
        assert!(validate_source_url("https:///repo.git").is_err());
        assert!(validate_source_url("https://example.com").is_err());
        assert!(validate_source_url("https://example.com/").is_err());
    }

    #[test]
    fn test_validate_rejects_unrecognized_suffix() {
        assert!(validate_source_url("https://example.com/repo").is_err());
        assert!(validate_source_url("https://example.com/repo.exe").is_err());
    }

    #[test]
    fn test_validate_rejects_whitespace() {
        assert!(validate_source_url("https://exa mple.com/repo.git").is_err());
    }
}
