//! Glob matching for cache keys.

/// Checks if a cache key matches a glob pattern.
///
/// `*` matches any run of characters, including an empty one. Every other
/// character matches itself.
///
/// ```
/// use bookshelf_core::cache::pattern_matches;
///
/// assert!(pattern_matches("bookshelf:v1:book:7", "bookshelf:v1:book:7"));
/// assert!(pattern_matches("bookshelf:v1:books:list:*", "bookshelf:v1:books:list:page=1:size=10"));
/// assert!(!pattern_matches("bookshelf:v1:books:list:*", "bookshelf:v1:book:7"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let pattern = pattern.as_bytes();
    let key = key.as_bytes();

    let (mut p, mut k) = (0, 0);
    // Position of the last `*` seen, and the key position it was matched at.
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p) {
            Some(b'*') => {
                backtrack = Some((p, k));
                p += 1;
            }
            Some(&c) if c == key[k] => {
                p += 1;
                k += 1;
            }
            _ => match backtrack {
                // Let the last star swallow one more byte and retry
                Some((star, matched)) => {
                    p = star + 1;
                    k = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}
