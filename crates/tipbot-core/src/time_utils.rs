use std::time::Duration;

/// Returns the current Unix timestamp in milliseconds.
pub fn current_unix_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Millisecond Unix timestamp `ttl` from now, saturating on overflow.
pub fn unix_deadline_ms(ttl: Duration) -> u64 {
    let ttl_ms: u64 = ttl.as_millis().try_into().unwrap_or(u64::MAX);
    current_unix_timestamp_ms().saturating_add(ttl_ms)
}

/// Returns true when `expires_unix_ms` is present and no longer in the future.
pub fn is_expired_unix_ms(expires_unix_ms: Option<u64>, now_unix_ms: u64) -> bool {
    matches!(expires_unix_ms, Some(value) if value <= now_unix_ms)
}
