use std::env;
use std::time::Duration;

// Runtime/server constants (not gameplay tuning, see `domain::tuning`).

pub fn http_port() -> u16 {
    env::var("SNAKE_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

/// Session idle timeout (§4.1): default 5 minutes since `lastActivity`.
pub fn session_idle_timeout() -> Duration {
    let secs = env::var("SESSION_IDLE_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(300);
    Duration::from_secs(secs)
}

/// Idle sweep / empty-lobby sweep period (§4.1): default 30 s.
pub fn sweep_interval() -> Duration {
    let secs = env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(30);
    Duration::from_secs(secs)
}
