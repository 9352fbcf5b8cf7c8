use chrono::{DateTime, Duration, Utc};

use super::TokenClaims;

/// Calculate token expiry from issue time and TTL.
pub fn calculate_expiry(issued_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    issued_at + ttl
}

/// Check if a token has expired.
pub fn is_token_expired(claims: &TokenClaims, now: DateTime<Utc>) -> bool {
    claims.exp <= now.timestamp()
}
