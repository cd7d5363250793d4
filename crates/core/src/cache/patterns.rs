//! Glob matching for cache key namespaces.
//!
//! Only `*` is special: it matches any run of characters, including none.
//! This is the subset of Redis `MATCH` syntax used by namespace flushes.

/// Checks if a cache key matches a glob pattern.
///
/// # Examples
///
/// ```
/// use repocache_core::cache::pattern_matches;
///
/// assert!(pattern_matches("user:*", "user:email:a@x.com"));
/// assert!(pattern_matches("user:*:a@x.com", "user:email:a@x.com"));
/// assert!(!pattern_matches("user:*", "tenant:1"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let pattern = pattern.as_bytes();
    let key = key.as_bytes();

    let (mut p, mut k) = (0, 0);
    // Position of the last `*` seen and the key offset it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            backtrack = Some((p, k));
            p += 1;
        } else if p < pattern.len() && pattern[p] == key[k] {
            p += 1;
            k += 1;
        } else if let Some((star, tried)) = backtrack {
            p = star + 1;
            k = tried + 1;
            backtrack = Some((star, k));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&b| b == b'*')
}
